// Delimited-text reader.
//
// Comma-separated, `\n` or `\r\n` line endings, RFC 4180 quoting
// (`""` escapes, delimiters and newlines inside quotes). Unbalanced
// quotes are tolerated: the field runs to end of input.

use super::Grid;

const DELIMITER: char = ',';
const QUOTE: char = '"';

pub(crate) fn read(payload: &str) -> Grid {
    let text = payload.trim_start_matches('\u{feff}');
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            QUOTE if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            DELIMITER => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    for record in &mut records {
        for cell in record.iter_mut() {
            let trimmed = cell.trim();
            if trimmed.len() != cell.len() {
                *cell = trimmed.to_owned();
            }
        }
    }

    Grid {
        header: None,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(payload: &str) -> Vec<Vec<String>> {
        read(payload).records
    }

    #[test]
    fn splits_lines_and_fields() {
        assert_eq!(
            records("a,b,c\n1,2,3"),
            vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]
        );
    }

    #[test]
    fn strips_carriage_returns() {
        assert_eq!(
            records("4502,45,2BR,1200,P12,Booked\r\n"),
            vec![vec!["4502", "45", "2BR", "1200", "P12", "Booked"]]
        );
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        assert_eq!(
            records("unit,notes\n101,\"corner, sea view\"\n102,\"two\nlines\"\n"),
            vec![
                vec!["unit", "notes"],
                vec!["101", "corner, sea view"],
                vec!["102", "two\nlines"],
            ]
        );
    }

    #[test]
    fn doubled_quotes_are_escapes() {
        assert_eq!(
            records("\"say \"\"hi\"\"\",x"),
            vec![vec!["say \"hi\"", "x"]]
        );
    }

    #[test]
    fn cells_are_trimmed() {
        assert_eq!(records("  a , b\t\n"), vec![vec!["a", "b"]]);
    }

    #[test]
    fn leading_bom_is_ignored() {
        assert_eq!(records("\u{feff}unit,status\n"), vec![vec!["unit", "status"]]);
    }

    #[test]
    fn trailing_empty_field_is_kept() {
        assert_eq!(records("101,sold,\n"), vec![vec!["101", "sold", ""]]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(records("101,\"oops\n102"), vec![vec!["101", "oops\n102"]]);
    }
}

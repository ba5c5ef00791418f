// Table-query JSON reader.
//
// The spreadsheet endpoint answers `tqx=out:json` with a JavaScript call
// wrapping the JSON document:
//
//   /*O_o*/
//   google.visualization.Query.setResponse({...});
//
// Prefix and suffix have fixed lengths and are cut off by byte count.

use serde::Deserialize;
use serde_json::Value;

use super::{Grid, ParseError};

pub(crate) const WRAPPER_MARKER: &str = "/*O_o*/";
pub(crate) const WRAPPER_CALL: &str = "google.visualization.Query.setResponse(";
/// `/*O_o*/\n` + `google.visualization.Query.setResponse(`
pub(crate) const WRAPPER_PREFIX_LEN: usize = 47;
/// `);`
pub(crate) const WRAPPER_SUFFIX_LEN: usize = 2;

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ResponseError>,
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detailed_message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(default)]
    cols: Vec<Col>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Col {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    c: Option<Vec<Option<Cell>>>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Value,
    #[serde(default)]
    f: Option<String>,
}

// ── Reading ─────────────────────────────────────────────────────────

pub(crate) fn read(payload: &str) -> Result<Grid, ParseError> {
    let body = unwrap_body(payload)?;
    let response: Response =
        serde_json::from_str(body).map_err(|e| ParseError::Json(e.to_string()))?;

    if response.status.as_deref() == Some("error") {
        let message = response
            .errors
            .iter()
            .map(ResponseError::describe)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ParseError::Source {
            message: if message.is_empty() {
                "unspecified error".to_owned()
            } else {
                message
            },
        });
    }

    let table = response.table.ok_or(ParseError::MissingTable)?;

    let labels: Vec<String> = table
        .cols
        .iter()
        .map(|c| c.label.as_deref().unwrap_or_default().trim().to_owned())
        .collect();
    let header = labels.iter().any(|l| !l.is_empty()).then_some(labels);

    let records = table
        .rows
        .into_iter()
        .map(|row| {
            row.c
                .unwrap_or_default()
                .iter()
                .map(|cell| cell.as_ref().map(Cell::text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Grid { header, records })
}

/// `payload` without a byte-order mark or leading whitespace. Format
/// sniffing and wrapper slicing both start from here.
pub(crate) fn head(payload: &str) -> &str {
    payload.trim_start_matches('\u{feff}').trim_start()
}

/// Strip the JavaScript wrapper, or pass a bare JSON document through.
fn unwrap_body(payload: &str) -> Result<&str, ParseError> {
    let text = head(payload).trim_end();
    if text.starts_with('{') {
        return Ok(text);
    }
    let len = text.len();
    if len < WRAPPER_PREFIX_LEN + WRAPPER_SUFFIX_LEN {
        return Err(ParseError::WrapperTooShort { len });
    }
    text.get(WRAPPER_PREFIX_LEN..len - WRAPPER_SUFFIX_LEN)
        .ok_or_else(|| ParseError::Json("wrapper does not end on a character boundary".into()))
}

impl ResponseError {
    fn describe(&self) -> String {
        self.detailed_message
            .as_deref()
            .or(self.message.as_deref())
            .or(self.reason.as_deref())
            .unwrap_or_default()
            .to_owned()
    }
}

impl Cell {
    /// Cell text: the raw value when present, else the formatted one.
    fn text(&self) -> String {
        match &self.v {
            Value::String(s) => s.clone(),
            Value::Number(n) => render_number(n),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                self.f.clone().unwrap_or_default()
            }
        }
    }
}

/// Spreadsheets export every number as a double; `45.0` should read `45`.
fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract().abs() < f64::EPSILON && f.abs() < 1e15 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parse::SourceFormat;
    use pretty_assertions::assert_eq;

    fn wrap(json: &str) -> String {
        format!("/*O_o*/\ngoogle.visualization.Query.setResponse({json});")
    }

    #[test]
    fn wrapper_prefix_is_forty_seven_bytes() {
        assert_eq!(
            format!("{WRAPPER_MARKER}\n{WRAPPER_CALL}").len(),
            WRAPPER_PREFIX_LEN
        );
    }

    #[test]
    fn reads_labels_and_cells() {
        let payload = wrap(
            r#"{"version":"0.6","status":"ok","table":{
                "cols":[{"id":"A","label":"Unit","type":"number"},
                        {"id":"B","label":"Floor","type":"number"},
                        {"id":"C","label":"Status","type":"string"}],
                "rows":[{"c":[{"v":4502.0,"f":"4502"},{"v":45.0},{"v":"Booked"}]},
                        {"c":[{"v":4501},null,{"v":null,"f":"Sold"}]}]}}"#,
        );
        let grid = read(&payload).unwrap();
        assert_eq!(
            grid.header,
            Some(vec!["Unit".into(), "Floor".into(), "Status".into()])
        );
        assert_eq!(
            grid.records,
            vec![
                vec!["4502", "45", "Booked"],
                vec!["4501", "", "Sold"],
            ]
        );
    }

    #[test]
    fn empty_labels_leave_header_to_first_row() {
        let payload = wrap(
            r#"{"table":{"cols":[{"label":""},{"label":""}],
                "rows":[{"c":[{"v":"unit"},{"v":"status"}]},{"c":[{"v":"101"},{"v":"sold"}]}]}}"#,
        );
        let grid = read(&payload).unwrap();
        assert_eq!(grid.header, None);
        assert_eq!(grid.records.len(), 2);
    }

    #[test]
    fn leading_whitespace_before_wrapper_is_skipped() {
        let json = r#"{"table":{"cols":[{"label":"unit"}],"rows":[{"c":[{"v":"101"}]}]}}"#;
        let payload = format!("\u{feff}\n  {}\n", wrap(json));

        assert_eq!(SourceFormat::detect(&payload), SourceFormat::JsonTable);
        let grid = read(&payload).unwrap();
        assert_eq!(grid.records, vec![vec!["101"]]);
    }

    #[test]
    fn bare_json_is_accepted() {
        let grid = read(r#"{"table":{"cols":[{"label":"unit"}],"rows":[{"c":[{"v":true}]}]}}"#)
            .unwrap();
        assert_eq!(grid.records, vec![vec!["true"]]);
    }

    #[test]
    fn fractional_numbers_are_kept() {
        let grid = read(r#"{"table":{"cols":[{"label":"area"}],"rows":[{"c":[{"v":812.5}]}]}}"#)
            .unwrap();
        assert_eq!(grid.records, vec![vec!["812.5"]]);
    }

    #[test]
    fn error_status_carries_source_message() {
        let payload = wrap(
            r#"{"status":"error","errors":[{"reason":"invalid_query","detailed_message":"Invalid sheet"}]}"#,
        );
        assert_eq!(
            read(&payload).unwrap_err(),
            ParseError::Source {
                message: "Invalid sheet".into()
            }
        );
    }

    #[test]
    fn short_payload_is_rejected() {
        assert_eq!(
            read("/*O_o*/").unwrap_err(),
            ParseError::WrapperTooShort { len: 7 }
        );
    }

    #[test]
    fn missing_table_is_an_error() {
        assert_eq!(read(&wrap(r#"{"status":"ok"}"#)).unwrap_err(), ParseError::MissingTable);
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            read(&wrap("not json at all")).unwrap_err(),
            ParseError::Json(_)
        ));
    }
}

// Source endpoint construction.
//
// A source is either a URL given verbatim (published CSV link, internal
// mirror) or a Google spreadsheet id that gets expanded into the
// table-query endpoint. The optional API key rides along as a query
// parameter and is only materialized when the request URL is built.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Export flavour requested from the table-query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated text.
    #[default]
    Csv,
    /// Wrapped JSON table (`google.visualization.Query.setResponse(...)`).
    Json,
}

impl ExportFormat {
    fn tqx(self) -> &'static str {
        match self {
            Self::Csv => "out:csv",
            Self::Json => "out:json",
        }
    }
}

/// Where the fetcher pulls the sheet from.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    url: Url,
    api_key: Option<SecretString>,
    api_key_param: String,
}

impl SourceLocation {
    /// Use a fully-formed URL as-is.
    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            api_key: None,
            api_key_param: "key".into(),
        }
    }

    /// Parse a URL string.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Ok(Self::from_url(Url::parse(raw.trim())?))
    }

    /// Build the table-query endpoint for a spreadsheet id.
    ///
    /// `sheet` selects a tab by name; `None` means the first tab.
    pub fn google_sheet(
        spreadsheet_id: &str,
        sheet: Option<&str>,
        format: ExportFormat,
    ) -> Result<Self, Error> {
        let mut url = Url::parse(SHEETS_BASE)?.join(&format!("{}/gviz/tq", spreadsheet_id.trim()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tqx", format.tqx());
            if let Some(name) = sheet.filter(|s| !s.trim().is_empty()) {
                query.append_pair("sheet", name.trim());
            }
        }
        Ok(Self::from_url(url))
    }

    /// Attach an API key, sent as `?{param}={key}`.
    pub fn with_api_key(mut self, key: SecretString, param: impl Into<String>) -> Self {
        self.api_key = Some(key);
        self.api_key_param = param.into();
        self
    }

    /// The URL without credentials; safe to log or display.
    pub fn display_url(&self) -> &Url {
        &self.url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The URL actually requested, with the API key appended if present.
    pub(crate) fn request_url(&self) -> Url {
        let mut url = self.url.clone();
        if let Some(ref key) = self.api_key {
            url.query_pairs_mut()
                .append_pair(&self.api_key_param, key.expose_secret());
        }
        url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn google_sheet_csv_url() {
        let src = SourceLocation::google_sheet("abc123", None, ExportFormat::Csv).unwrap();
        assert_eq!(
            src.display_url().as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out%3Acsv"
        );
    }

    #[test]
    fn google_sheet_json_url_with_tab() {
        let src =
            SourceLocation::google_sheet("abc123", Some("Tower A"), ExportFormat::Json).unwrap();
        let url = src.display_url();
        assert_eq!(url.path(), "/spreadsheets/d/abc123/gviz/tq");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("tqx".into(), "out:json".into()),
                ("sheet".into(), "Tower A".into())
            ]
        );
    }

    #[test]
    fn api_key_only_in_request_url() {
        let src = SourceLocation::parse("https://sheets.example.com/export?format=csv")
            .unwrap()
            .with_api_key(SecretString::from("s3cret".to_string()), "key");

        assert!(!src.display_url().as_str().contains("s3cret"));
        assert_eq!(
            src.request_url().as_str(),
            "https://sheets.example.com/export?format=csv&key=s3cret"
        );
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(matches!(
            SourceLocation::parse("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}

// unitboard-api: raw fetcher for published spreadsheet exports (CSV + table-query JSON)

pub mod error;
pub mod sheet;
pub mod source;
pub mod transport;

pub use error::Error;
pub use sheet::SheetClient;
pub use source::{ExportFormat, SourceLocation};
pub use transport::{TlsMode, TransportConfig};

// ── Fetch seam ──
//
// The synchronizer only needs "give me the current payload". Keeping it
// behind a trait lets the scheduler run against an in-memory source.

use std::future::Future;

use unitboard_api::SheetClient;

/// Anything that can produce the raw sheet payload on demand.
///
/// One call is one outbound request; implementations must not retry.
pub trait SheetFetcher: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<String, unitboard_api::Error>> + Send;

    /// Where the payload comes from, for logs. Must not contain secrets.
    fn describe(&self) -> String {
        String::from("<sheet>")
    }
}

impl SheetFetcher for SheetClient {
    fn fetch(&self) -> impl Future<Output = Result<String, unitboard_api::Error>> + Send {
        self.fetch_text()
    }

    fn describe(&self) -> String {
        self.source().display_url().to_string()
    }
}

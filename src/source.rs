pub mod json_file;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::SourceError;
use crate::model::PriceSeries;

/// Provider of daily price history.
///
/// Returns `BoxFuture` rather than using `async fn` so the trait stays
/// object-safe (`dyn PriceSource`).
pub trait PriceSource: Send + Sync {
    /// Load the full validated history for `ticker`.
    fn load<'a>(
        &'a self,
        ticker: &'a str,
    ) -> BoxFuture<'a, Result<PriceSeries, Report<SourceError>>>;
}

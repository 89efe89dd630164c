pub mod terminal;

use crate::analysis::Analysis;
use crate::batch::BatchFailure;
use crate::screener::{ScreenResults, ScreenSummary};

/// Sink for finished analyses and screen results.
pub trait Reporter: Send + Sync {
    fn analysis(&self, analysis: &Analysis);

    fn failure(&self, failure: &BatchFailure);

    fn screen(&self, results: &ScreenResults, summary: Option<&ScreenSummary>);
}

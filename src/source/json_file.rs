use std::io;
use std::path::PathBuf;

use error_stack::{Report, ResultExt, bail};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::error::SourceError;
use crate::model::{PriceBar, PriceSeries};
use crate::source::PriceSource;

/// Reads `<dir>/<TICKER>.json`, a JSON array of [`PriceBar`]s.
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.json", ticker.to_uppercase()))
    }

    async fn read(&self, ticker: &str) -> Result<PriceSeries, Report<SourceError>> {
        let path = self.path_for(ticker);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                bail!(SourceError::NotFound {
                    ticker: ticker.to_string(),
                });
            }
            Err(e) => {
                return Err(Report::new(e)
                    .change_context(SourceError::Read {
                        ticker: ticker.to_string(),
                    })
                    .attach(format!("path: {}", path.display())));
            }
        };

        let bars: Vec<PriceBar> =
            serde_json::from_str(&content).change_context(SourceError::Parse {
                ticker: ticker.to_string(),
            })?;

        debug!(ticker, bars = bars.len(), path = %path.display(), "price file loaded");

        PriceSeries::new(ticker, bars).change_context(SourceError::Integrity {
            ticker: ticker.to_string(),
        })
    }
}

impl PriceSource for JsonFileSource {
    fn load<'a>(
        &'a self,
        ticker: &'a str,
    ) -> BoxFuture<'a, Result<PriceSeries, Report<SourceError>>> {
        self.read(ticker).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::model::fixtures::bars_from_closes;

    fn write_bars(dir: &Path, name: &str, bars: &[PriceBar]) {
        let json = serde_json::to_string(bars).unwrap();
        std::fs::write(dir.join(name), json).unwrap();
    }

    #[tokio::test]
    async fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        write_bars(dir.path(), "ACME.json", &bars_from_closes(&[1.0, 2.0, 3.0]));

        let source = JsonFileSource::new(dir.path());
        let series = source.load("acme").await.unwrap();
        assert_eq!(series.ticker(), "acme");
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[2].close, 3.0);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path());
        let err = source.load("NOPE").await.unwrap_err();
        assert!(matches!(err.current_context(), SourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unreadable_entry_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("DIR.json")).unwrap();
        let source = JsonFileSource::new(dir.path());
        let err = source.load("DIR").await.unwrap_err();
        assert!(matches!(err.current_context(), SourceError::Read { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BAD.json"), "{not json").unwrap();
        let source = JsonFileSource::new(dir.path());
        let err = source.load("BAD").await.unwrap_err();
        assert!(matches!(err.current_context(), SourceError::Parse { .. }));
    }

    #[tokio::test]
    async fn unordered_bars_fail_integrity() {
        let dir = tempfile::tempdir().unwrap();
        let mut bars = bars_from_closes(&[1.0, 2.0]);
        bars.reverse();
        write_bars(dir.path(), "REV.json", &bars);
        let source = JsonFileSource::new(dir.path());
        let err = source.load("REV").await.unwrap_err();
        assert!(matches!(err.current_context(), SourceError::Integrity { .. }));
    }

    #[tokio::test]
    async fn accepts_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"[
            {"date": "2024-03-01", "open": 10.0, "high": 10.5, "low": 9.8, "close": 10.2, "volume": 12000},
            {"date": "2024-03-04", "open": 10.2, "high": 10.9, "low": 10.1, "close": 10.8, "volume": 15000}
        ]"#;
        std::fs::write(dir.path().join("XYZ.json"), json).unwrap();
        let series = JsonFileSource::new(dir.path()).load("XYZ").await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[1].volume, 15_000);
    }
}

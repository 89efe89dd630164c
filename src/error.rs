use chrono::NaiveDate;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

/// Data-integrity violations in a price series.
#[derive(Debug, Display, Error)]
pub enum SeriesError {
    #[display("bar dated {date} is not after the previous bar ({previous})")]
    OutOfOrder { date: NaiveDate, previous: NaiveDate },
    #[display("duplicate bar date {date}")]
    DuplicateDate { date: NaiveDate },
    #[display("invalid bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum SourceError {
    #[display("no price data for {ticker}")]
    NotFound { ticker: String },
    #[display("failed to read price data for {ticker}")]
    Read { ticker: String },
    #[display("failed to parse price data for {ticker}")]
    Parse { ticker: String },
    #[display("price data for {ticker} failed integrity checks")]
    Integrity { ticker: String },
}

#[derive(Debug, Display, Error)]
pub enum AnalysisError {
    #[display("indicator computation failed for {ticker}")]
    Indicators { ticker: String },
    #[display("failed to load {ticker}")]
    Load { ticker: String },
    #[display("analysis worker for {ticker} did not complete")]
    Worker { ticker: String },
}

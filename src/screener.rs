use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::config::ScreenerConfig;

/// Fundamentals for one listed company, as read from a fundamentals file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Profitability {
    #[display("profitable")]
    Profitable,
    #[display("unprofitable")]
    Unprofitable,
    /// Net income is not reported.
    #[display("unknown")]
    Unknown,
}

impl Fundamentals {
    pub fn profitability(&self) -> Profitability {
        match self.net_income {
            Some(income) if income > 0.0 => Profitability::Profitable,
            Some(_) => Profitability::Unprofitable,
            None => Profitability::Unknown,
        }
    }

    /// Net income as a percentage of revenue.
    pub fn net_margin(&self) -> Option<f64> {
        let income = self.net_income?;
        let revenue = self.revenue?;
        (revenue != 0.0).then(|| income / revenue * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum RejectReason {
    #[display("not a common stock ticker")]
    InvalidTicker,
    #[display("not AI related")]
    NotAiRelated,
    #[display("no market cap")]
    NoMarketCap,
    #[display("market cap {market_cap:.0} out of range")]
    MarketCapOutOfRange { market_cap: f64 },
    #[display("no financial data")]
    UnknownProfitability,
    #[display("not profitable (net income {net_income:.0})")]
    Unprofitable { net_income: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
    Passed,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub ticker: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenResults {
    /// Ordered by market cap, largest first.
    pub passed: Vec<Fundamentals>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSummary {
    pub count: usize,
    pub mean_market_cap: f64,
    pub median_market_cap: f64,
    pub mean_net_margin: Option<f64>,
    pub mean_pe_ratio: Option<f64>,
    pub sectors: BTreeMap<String, usize>,
    pub industries: BTreeMap<String, usize>,
}

/// False for warrants, units, preferred shares and dotted class shares.
pub fn is_valid_ticker(ticker: &str) -> bool {
    let ticker = ticker.to_uppercase();

    if ticker.contains(".W") || ticker.ends_with('W') {
        return false;
    }
    if ticker.contains(".U") {
        return false;
    }
    let chars: Vec<char> = ticker.chars().collect();
    if let [.., 'P', last] = chars.as_slice()
        && chars.len() > 4
        && last.is_alphabetic()
    {
        return false;
    }
    if ticker.contains('.') {
        return false;
    }
    if let Some((_, suffix)) = ticker.split_once('-')
        && suffix.starts_with('P')
    {
        return false;
    }
    true
}

/// True when any keyword appears as a whole word or phrase in the company's
/// name, description or industry. An empty keyword list matches everything.
pub fn is_ai_related(company: &Fundamentals, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let text = [
        Some(company.name.as_str()),
        company.description.as_deref(),
        company.industry.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    keywords
        .iter()
        .any(|keyword| contains_word(&text, &keyword.to_lowercase()))
}

fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Market-cap and profitability checks, first failure wins.
pub fn screen(company: &Fundamentals, config: &ScreenerConfig) -> ScreenOutcome {
    let market_cap = match company.market_cap {
        Some(cap) if cap > 0.0 => cap,
        _ => return ScreenOutcome::Rejected(RejectReason::NoMarketCap),
    };
    if market_cap < config.min_market_cap || market_cap > config.max_market_cap {
        return ScreenOutcome::Rejected(RejectReason::MarketCapOutOfRange { market_cap });
    }
    match (company.profitability(), company.net_income) {
        (Profitability::Profitable, _) => ScreenOutcome::Passed,
        (Profitability::Unprofitable, Some(net_income)) => {
            ScreenOutcome::Rejected(RejectReason::Unprofitable { net_income })
        }
        _ => ScreenOutcome::Rejected(RejectReason::UnknownProfitability),
    }
}

/// Run every company through ticker, keyword and fundamental filters.
pub fn screen_all(companies: Vec<Fundamentals>, config: &ScreenerConfig) -> ScreenResults {
    let mut results = ScreenResults::default();
    for company in companies {
        let outcome = if !is_valid_ticker(&company.ticker) {
            ScreenOutcome::Rejected(RejectReason::InvalidTicker)
        } else if !is_ai_related(&company, &config.ai_keywords) {
            ScreenOutcome::Rejected(RejectReason::NotAiRelated)
        } else {
            screen(&company, config)
        };

        match outcome {
            ScreenOutcome::Passed => results.passed.push(company),
            ScreenOutcome::Rejected(reason) => results.rejected.push(Rejection {
                ticker: company.ticker,
                reason,
            }),
        }
    }
    results.passed.sort_by(|a, b| {
        let cap = |f: &Fundamentals| f.market_cap.unwrap_or(0.0);
        cap(b).total_cmp(&cap(a))
    });
    results
}

/// Aggregate statistics over companies that passed; `None` when empty.
pub fn summarize(passed: &[Fundamentals]) -> Option<ScreenSummary> {
    if passed.is_empty() {
        return None;
    }
    let mut caps: Vec<f64> = passed.iter().map(|f| f.market_cap.unwrap_or(0.0)).collect();
    caps.sort_by(f64::total_cmp);
    let mid = caps.len() / 2;
    let median_market_cap = if caps.len() % 2 == 0 {
        (caps[mid - 1] + caps[mid]) / 2.0
    } else {
        caps[mid]
    };

    Some(ScreenSummary {
        count: passed.len(),
        mean_market_cap: mean_of(caps.iter().copied()).unwrap_or(0.0),
        median_market_cap,
        mean_net_margin: mean_of(passed.iter().filter_map(Fundamentals::net_margin)),
        mean_pe_ratio: mean_of(passed.iter().filter_map(|f| f.pe_ratio)),
        sectors: count_by(passed.iter().map(|f| f.sector.as_deref())),
        industries: count_by(passed.iter().map(|f| f.industry.as_deref())),
    })
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn count_by<'a>(labels: impl Iterator<Item = Option<&'a str>>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.unwrap_or("N/A").to_string()).or_insert(0) += 1;
    }
    counts
}

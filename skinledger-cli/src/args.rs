//! Command-line arguments

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use skinledger_core::Platform;
use skinledger_services::{Period, PeriodFilter};

#[derive(Parser, Debug)]
#[command(name = "skinledger", version, about = "Cross-platform skin trading reconciliation")]
pub struct Cli {
    /// SQLite database written by the ingestion layer
    #[arg(long, env = "SKINLEDGER_DB_PATH", default_value = "data/skinledger.db", global = true)]
    pub db: String,

    /// Reporting period
    #[arg(long, default_value = "month", global = true)]
    pub period: Period,

    /// Window start (RFC 3339 or YYYY-MM-DD), overrides --period
    #[arg(long, value_parser = parse_date, global = true)]
    pub from: Option<DateTime<Utc>>,

    /// Window end, exclusive (RFC 3339 or YYYY-MM-DD), overrides --period
    #[arg(long, value_parser = parse_date, global = true)]
    pub to: Option<DateTime<Utc>>,

    /// csfloat, market_csgo, manual or all
    #[arg(long, value_parser = parse_platform, default_value = "all", global = true)]
    pub platform: PlatformFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Financial summary for the window
    Summary,
    /// Matched purchase/sale pairs with realized profit
    Profit,
    /// Deduplicated inventory
    Inventory,
    /// Unsold purchases by ownership state
    Holds,
    /// Purchase and sale totals per day
    Daily,
    /// Summary and daily series together
    Dashboard,
    /// Match statistics per pass
    Matches,
}

/// Parsed `--platform`; `None` means all platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformFilter(pub Option<Platform>);

impl Cli {
    /// Reporting window: explicit bounds win over the preset period
    pub fn filter(&self, now: DateTime<Utc>) -> anyhow::Result<PeriodFilter> {
        let (preset_from, preset_to) = self.period.range(now);
        let from = self.from.unwrap_or(preset_from);
        let to = self.to.unwrap_or(preset_to);

        if from >= to {
            anyhow::bail!("Empty window: --from {} is not before --to {}", from, to);
        }

        Ok(PeriodFilter::new(from, to).with_platform(self.platform.0))
    }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid date: {} (expected RFC 3339 or YYYY-MM-DD)", s))
}

fn parse_platform(s: &str) -> Result<PlatformFilter, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(PlatformFilter(None));
    }
    s.parse::<Platform>().map(|p| PlatformFilter(Some(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_explicit_window_overrides_period() {
        let cli = Cli::parse_from([
            "skinledger",
            "--from",
            "2025-01-01",
            "--to",
            "2025-01-15T00:00:00Z",
            "--platform",
            "market_csgo",
            "summary",
        ]);
        let filter = cli.filter(Utc::now()).unwrap();

        assert_eq!(filter.from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(filter.to, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(filter.platform, Some(Platform::MarketCsgo));
        assert_eq!(cli.command, Command::Summary);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["skinledger", "dashboard"]);
        assert_eq!(cli.period, Period::Month);
        assert_eq!(cli.platform, PlatformFilter(None));
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let cli = Cli::parse_from(["skinledger", "--from", "2025-02-01", "--to", "2025-01-01", "daily"]);
        assert!(cli.filter(Utc::now()).is_err());
    }
}

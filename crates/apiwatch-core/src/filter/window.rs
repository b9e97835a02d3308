use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Time window over `createdAt`.
///
/// Lookback windows are anchored at the newest record of the snapshot,
/// not at the wall clock, so the same snapshot always yields the same
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    AllTime,
    Last24Hours,
    Last7Days,
    Last30Days,
    /// Arbitrary lookback from the newest record
    Lookback(Duration),
    /// Calendar days, inclusive on both ends
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    /// Parse a window expression
    ///
    /// Supports:
    /// - "all"
    /// - "24h", "7d", "30d" and any other "<N>h" / "<N>d" lookback
    /// - "2024-05-01..2024-05-07" (inclusive date range)
    pub fn parse(spec: &str) -> crate::Result<Self> {
        let spec = spec.trim();
        let lower = spec.to_lowercase();

        match lower.as_str() {
            "all" | "all-time" => return Ok(TimeWindow::AllTime),
            "24h" => return Ok(TimeWindow::Last24Hours),
            "7d" => return Ok(TimeWindow::Last7Days),
            "30d" => return Ok(TimeWindow::Last30Days),
            _ => {}
        }

        if let Some((start_str, end_str)) = spec.split_once("..") {
            let start = parse_date(start_str)?;
            let end = parse_date(end_str)?;
            if start > end {
                return Err(crate::Error::InvalidWindow(format!(
                    "Range start {} is after end {}",
                    start, end
                )));
            }
            return Ok(TimeWindow::DateRange { start, end });
        }

        let invalid = || crate::Error::InvalidWindow(format!("Unrecognized window: {}", spec));

        let unit_at = lower.char_indices().last().map(|(i, _)| i).unwrap_or(0);
        let (amount, unit) = lower.split_at(unit_at);
        let amount: i64 = amount.parse().map_err(|_| invalid())?;
        if amount <= 0 {
            return Err(crate::Error::InvalidWindow(format!(
                "Lookback must be positive: {}",
                spec
            )));
        }
        let duration = match unit {
            "h" => Duration::try_hours(amount),
            "d" => Duration::try_days(amount),
            _ => None,
        }
        .ok_or_else(invalid)?;

        Ok(TimeWindow::Lookback(duration))
    }

    /// Lookback duration, if this is a lookback window
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            TimeWindow::Last24Hours => Duration::try_hours(24),
            TimeWindow::Last7Days => Duration::try_days(7),
            TimeWindow::Last30Days => Duration::try_days(30),
            TimeWindow::Lookback(duration) => Some(*duration),
            TimeWindow::AllTime | TimeWindow::DateRange { .. } => None,
        }
    }

    /// Check whether a timestamp falls inside the window
    ///
    /// `latest` is the newest `createdAt` in the snapshot.
    pub fn contains(&self, created_at: NaiveDateTime, latest: NaiveDateTime) -> bool {
        match self {
            TimeWindow::AllTime => true,
            TimeWindow::DateRange { start, end } => {
                let day = created_at.date();
                day >= *start && day <= *end
            }
            _ => match self
                .lookback()
                .and_then(|d| latest.checked_sub_signed(d))
            {
                Some(cutoff) => created_at >= cutoff,
                None => true,
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            TimeWindow::AllTime => "All Time".to_string(),
            TimeWindow::Last24Hours => "Last 24 Hours".to_string(),
            TimeWindow::Last7Days => "Last 7 Days".to_string(),
            TimeWindow::Last30Days => "Last 30 Days".to_string(),
            TimeWindow::Lookback(duration) => {
                let hours = duration.num_hours();
                if hours % 24 == 0 {
                    format!("Last {} Days", hours / 24)
                } else {
                    format!("Last {} Hours", hours)
                }
            }
            TimeWindow::DateRange { start, end } => format!("{} to {}", start, end),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn parse_date(value: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| crate::Error::InvalidWindow(format!("Invalid date '{}': {}", value, e)))
}

//! Raw marketing observations
//!
//! One row per account-day-channel, as delivered by the persistence layer.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Spend and outcome for one channel on one calendar day
///
/// Revenue is the amount recorded against this date and channel; no causal
/// attribution happens at storage time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: Date,
    pub channel: String,
    pub spend: f64,
    pub revenue: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
}

impl Observation {
    /// Create an observation with zero engagement counters
    #[must_use]
    pub fn new(date: Date, channel: impl Into<String>, spend: f64, revenue: f64) -> Self {
        Self {
            date,
            channel: channel.into(),
            spend,
            revenue,
            impressions: 0,
            clicks: 0,
            conversions: 0,
        }
    }
}

/// Number of distinct calendar days present in a set of observations
#[must_use]
pub fn distinct_dates(observations: &[Observation]) -> usize {
    let mut dates: Vec<Date> = observations.iter().map(|o| o.date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_dates_counts_days_not_rows() {
        let d1 = jiff::civil::date(2024, 3, 1);
        let d2 = jiff::civil::date(2024, 3, 2);
        let observations = vec![
            Observation::new(d1, "search", 10.0, 50.0),
            Observation::new(d1, "social", 5.0, 20.0),
            Observation::new(d2, "search", 12.0, 55.0),
        ];

        assert_eq!(distinct_dates(&observations), 2);
        assert_eq!(distinct_dates(&[]), 0);
    }

    #[test]
    fn test_engagement_counters_default_when_missing() {
        let json = r#"{"date":"2024-03-01","channel":"search","spend":10.0,"revenue":40.0}"#;
        let obs: Observation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.impressions, 0);
        assert_eq!(obs.date, jiff::civil::date(2024, 3, 1));
    }
}

//! Calendar-day arithmetic on `jiff` civil dates

use jiff::ToSpan;
use jiff::civil::Date;

/// Shift a date by `n` calendar days, saturating at the supported range
#[inline]
#[must_use]
pub fn add_days(date: Date, n: i64) -> Date {
    date.saturating_add(n.days())
}

/// The `count` consecutive days strictly after `last`
#[must_use]
pub fn following_days(last: Date, count: usize) -> Vec<Date> {
    (1..=count as i64).map(|n| add_days(last, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_add_days_crosses_month_and_leap_day() {
        assert_eq!(add_days(date(2024, 1, 31), 1), date(2024, 2, 1));
        assert_eq!(add_days(date(2024, 2, 28), 1), date(2024, 2, 29));
        assert_eq!(add_days(date(2025, 2, 28), 1), date(2025, 3, 1));
        assert_eq!(add_days(date(2025, 1, 1), -1), date(2024, 12, 31));
    }

    #[test]
    fn test_following_days_excludes_start() {
        let days = following_days(date(2024, 12, 30), 3);
        assert_eq!(
            days,
            vec![date(2024, 12, 31), date(2025, 1, 1), date(2025, 1, 2)]
        );
    }
}

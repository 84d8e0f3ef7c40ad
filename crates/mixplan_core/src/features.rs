//! Design matrix construction
//!
//! Turns a per-channel daily series into the regression inputs: current spend,
//! lagged spend blocks, and one-hot day-of-week and month indicators. Every
//! function here is pure; the same observations always yield the same matrix.
//!
//! Column layout, left to right:
//! - one column per channel at lag 0
//! - for each configured lag, one column per channel
//! - `dow_0` (Monday) through `dow_6` (Sunday)
//! - `month_1` through `month_12`
//!
//! Lags are positional: the lagged value at row `i` is the lag-0 value at row
//! `i - lag`, or zero for the first `lag` rows.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;

use crate::model::Observation;

/// Default lag offsets, in rows (days)
pub const DEFAULT_LAGS: [usize; 3] = [7, 14, 30];

const DAYS_PER_WEEK: usize = 7;
const MONTHS_PER_YEAR: usize = 12;

/// Date x channel spend table
///
/// Missing (date, channel) cells are zero, never absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendFrame {
    pub dates: Vec<Date>,
    pub channels: Vec<String>,
    /// Row-major: `spend[row][channel]`
    pub spend: Vec<Vec<f64>>,
}

impl SpendFrame {
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    /// Keep only the rows whose date appears in `dates`
    fn retain_dates(&mut self, dates: &BTreeSet<Date>) {
        let mut kept_dates = Vec::with_capacity(dates.len());
        let mut kept_spend = Vec::with_capacity(dates.len());
        for (date, row) in self.dates.drain(..).zip(self.spend.drain(..)) {
            if dates.contains(&date) {
                kept_dates.push(date);
                kept_spend.push(row);
            }
        }
        self.dates = kept_dates;
        self.spend = kept_spend;
    }

    /// Append rows after the current last date
    pub fn extend(&mut self, dates: &[Date], rows: Vec<Vec<f64>>) {
        self.dates.extend_from_slice(dates);
        self.spend.extend(rows);
    }
}

/// Regression inputs with matching row order
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub dates: Vec<Date>,
    pub channels: Vec<String>,
    pub columns: Vec<String>,
    pub features: DMatrix<f64>,
    pub target: DVector<f64>,
}

impl DesignMatrix {
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Column index of each channel's lag-0 spend
    #[must_use]
    pub fn channel_columns(&self) -> BTreeMap<String, usize> {
        self.channels
            .iter()
            .enumerate()
            .map(|(idx, channel)| (channel.clone(), idx))
            .collect()
    }
}

/// Builds design matrices for a fixed lag configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBuilder {
    lags: Vec<usize>,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LAGS.to_vec())
    }
}

impl FeatureBuilder {
    #[must_use]
    pub fn new(lags: Vec<usize>) -> Self {
        Self { lags }
    }

    #[must_use]
    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    /// Total column count for a given number of channels
    #[must_use]
    pub fn num_columns(&self, num_channels: usize) -> usize {
        num_channels * (1 + self.lags.len()) + DAYS_PER_WEEK + MONTHS_PER_YEAR
    }

    /// Build features and target from raw observations
    ///
    /// Channels are discovered from the data and ordered by name.
    #[must_use]
    pub fn build(&self, observations: &[Observation]) -> DesignMatrix {
        let spend = pivot_spend(observations, None);
        let revenue = aggregate_revenue(observations);
        self.build_from_parts(spend, &revenue)
    }

    /// Build features for a fixed channel list, e.g. to predict with a fitted model
    #[must_use]
    pub fn build_for_channels(
        &self,
        observations: &[Observation],
        channels: &[String],
    ) -> DesignMatrix {
        let spend = pivot_spend(observations, Some(channels));
        let revenue = aggregate_revenue(observations);
        self.build_from_parts(spend, &revenue)
    }

    /// Align a spend table with a revenue series and build the design matrix
    ///
    /// Dates missing from either side are dropped from both.
    #[must_use]
    pub fn build_from_parts(
        &self,
        mut spend: SpendFrame,
        revenue: &BTreeMap<Date, f64>,
    ) -> DesignMatrix {
        let common: BTreeSet<Date> = spend
            .dates
            .iter()
            .filter(|d| revenue.contains_key(d))
            .copied()
            .collect();
        spend.retain_dates(&common);

        let features = self.design(&spend);
        let target = DVector::from_iterator(
            spend.dates.len(),
            spend.dates.iter().map(|d| revenue.get(d).copied().unwrap_or(0.0)),
        );

        DesignMatrix {
            columns: self.column_names(&spend.channels),
            dates: spend.dates,
            channels: spend.channels,
            features,
            target,
        }
    }

    /// Feature matrix for a spend table, without a target
    #[must_use]
    pub fn design(&self, spend: &SpendFrame) -> DMatrix<f64> {
        let rows = spend.num_rows();
        let num_channels = spend.channels.len();
        let mut features = DMatrix::zeros(rows, self.num_columns(num_channels));

        for (row, values) in spend.spend.iter().enumerate() {
            for (ch, value) in values.iter().enumerate() {
                features[(row, ch)] = *value;
            }
        }

        for (block, &lag) in self.lags.iter().enumerate() {
            let offset = num_channels * (block + 1);
            for row in lag..rows {
                for ch in 0..num_channels {
                    features[(row, offset + ch)] = spend.spend[row - lag][ch];
                }
            }
        }

        let dow_offset = num_channels * (1 + self.lags.len());
        let month_offset = dow_offset + DAYS_PER_WEEK;
        for (row, date) in spend.dates.iter().enumerate() {
            features[(row, dow_offset + day_of_week(*date))] = 1.0;
            features[(row, month_offset + month_index(*date))] = 1.0;
        }

        features
    }

    #[must_use]
    pub fn column_names(&self, channels: &[String]) -> Vec<String> {
        let mut names: Vec<String> = channels.to_vec();
        for lag in &self.lags {
            names.extend(channels.iter().map(|c| format!("{c}_lag{lag}")));
        }
        names.extend((0..DAYS_PER_WEEK).map(|d| format!("dow_{d}")));
        names.extend((1..=MONTHS_PER_YEAR).map(|m| format!("month_{m}")));
        names
    }
}

/// Pivot observations into a date x channel spend table
///
/// Non-finite spend counts as missing: such a row contributes no date to the
/// spend side. Duplicate (date, channel) rows are averaged. When `channels`
/// is given, the table uses exactly those columns and ignores other channels.
#[must_use]
pub fn pivot_spend(observations: &[Observation], channels: Option<&[String]>) -> SpendFrame {
    let channels: Vec<String> = match channels {
        Some(list) => list.to_vec(),
        None => observations
            .iter()
            .filter(|o| o.spend.is_finite())
            .map(|o| o.channel.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };
    let column_of: FxHashMap<&str, usize> = channels
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.as_str(), idx))
        .collect();

    // (sum, count) per cell
    let mut cells: BTreeMap<Date, Vec<(f64, u32)>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.spend.is_finite()) {
        let row = cells
            .entry(obs.date)
            .or_insert_with(|| vec![(0.0, 0); channels.len()]);
        if let Some(&col) = column_of.get(obs.channel.as_str()) {
            row[col].0 += obs.spend;
            row[col].1 += 1;
        }
    }

    let mut dates = Vec::with_capacity(cells.len());
    let mut spend = Vec::with_capacity(cells.len());
    for (date, row) in cells {
        dates.push(date);
        spend.push(
            row.into_iter()
                .map(|(sum, count)| if count == 0 { 0.0 } else { sum / f64::from(count) })
                .collect(),
        );
    }

    SpendFrame {
        dates,
        channels,
        spend,
    }
}

/// Total revenue per date across all channels
///
/// Non-finite revenue counts as missing.
#[must_use]
pub fn aggregate_revenue(observations: &[Observation]) -> BTreeMap<Date, f64> {
    let mut revenue = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.revenue.is_finite()) {
        *revenue.entry(obs.date).or_insert(0.0) += obs.revenue;
    }
    revenue
}

/// Total raw spend per channel over all observations
#[must_use]
pub fn channel_spend_totals(observations: &[Observation]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.spend.is_finite()) {
        *totals.entry(obs.channel.clone()).or_insert(0.0) += obs.spend;
    }
    totals
}

/// Monday = 0 ... Sunday = 6
fn day_of_week(date: Date) -> usize {
    date.weekday().to_monday_zero_offset() as usize
}

/// January = 0 ... December = 11
fn month_index(date: Date) -> usize {
    (date.month() - 1) as usize
}

//! Subcommand handlers
//!
//! Each handler reads its JSON inputs, runs one library operation and returns
//! a serializable report. Nothing here does any modeling of its own.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use color_eyre::eyre::WrapErr;
use mixplan_core::attribution;
use mixplan_core::{
    AttributionResult, BudgetOptimizer, Forecast, ForecastRequest, Forecaster, Observation,
    OptimizationResult, RidgeForecaster, ScenarioResult, SpendBounds,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::settings::Settings;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fit channel attribution on daily observations
    Attribute {
        /// JSON array of observations
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Allocate a budget across channels
    Optimize {
        /// JSON object mapping channel to marginal ROAS
        #[arg(short, long)]
        roas: PathBuf,

        /// Total budget to allocate
        #[arg(short, long)]
        budget: f64,

        /// Minimum spend for a channel, as channel=amount
        #[arg(long = "min", value_parser = parse_channel_amount)]
        min_spend: Vec<(String, f64)>,

        /// Maximum spend for a channel, as channel=amount
        #[arg(long = "max", value_parser = parse_channel_amount)]
        max_spend: Vec<(String, f64)>,
    },

    /// Score hand-written allocations against a budget
    Compare {
        /// JSON object mapping channel to marginal ROAS
        #[arg(short, long)]
        roas: PathBuf,

        /// JSON array of allocations (channel to spend)
        #[arg(short, long)]
        scenarios: PathBuf,

        /// Budget used as the ROI denominator
        #[arg(short, long)]
        budget: f64,
    },

    /// Project daily revenue forward
    Forecast {
        /// JSON array of observations
        #[arg(short, long)]
        data: PathBuf,

        /// Days to forecast
        #[arg(long, default_value_t = mixplan_core::forecast::DEFAULT_HORIZON)]
        horizon: usize,

        /// JSON object mapping channel to planned daily spend
        #[arg(long)]
        future_spend: Option<PathBuf>,
    },
}

/// Report produced by a subcommand
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Attribution(AttributionResult),
    Optimization(OptimizationResult),
    Scenarios(Vec<ScenarioResult>),
    Forecast(Forecast),
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse `channel=amount`
pub fn parse_channel_amount(s: &str) -> Result<(String, f64), String> {
    let (channel, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected channel=amount, got '{s}'"))?;
    let channel = channel.trim();
    if channel.is_empty() {
        return Err(format!("missing channel name in '{s}'"));
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in '{s}': {e}"))?;
    Ok((channel.to_string(), amount))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> color_eyre::Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}

pub fn execute(command: &Command, settings: &Settings) -> color_eyre::Result<Report> {
    match command {
        Command::Attribute { data } => {
            let observations: Vec<Observation> = read_json(data)?;
            tracing::info!(rows = observations.len(), "Fitting attribution");
            let fit = attribution::fit(&observations, &settings.attribution)?;
            Ok(Report::Attribution(fit.result))
        }

        Command::Optimize {
            roas,
            budget,
            min_spend,
            max_spend,
        } => {
            let marginal_roas: BTreeMap<String, f64> = read_json(roas)?;
            let bounds = SpendBounds {
                min_spend: min_spend.iter().cloned().collect(),
                max_spend: max_spend.iter().cloned().collect(),
            };
            let result = BudgetOptimizer::new(marginal_roas)
                .with_config(settings.optimization.clone())
                .optimize(*budget, &bounds)?;
            Ok(Report::Optimization(result))
        }

        Command::Compare {
            roas,
            scenarios,
            budget,
        } => {
            let marginal_roas: BTreeMap<String, f64> = read_json(roas)?;
            let scenarios: Vec<BTreeMap<String, f64>> = read_json(scenarios)?;
            let results = BudgetOptimizer::new(marginal_roas)
                .with_config(settings.optimization.clone())
                .compare_scenarios(&scenarios, *budget);
            Ok(Report::Scenarios(results))
        }

        Command::Forecast {
            data,
            horizon,
            future_spend,
        } => {
            let observations: Vec<Observation> = read_json(data)?;
            let future_spend = future_spend
                .as_deref()
                .map(read_json::<BTreeMap<String, Vec<f64>>>)
                .transpose()?;
            let request = ForecastRequest {
                horizon: *horizon,
                future_spend,
            };
            let forecast = RidgeForecaster::new(settings.forecast.clone())
                .forecast(&observations, &request)?;
            Ok(Report::Forecast(forecast))
        }
    }
}

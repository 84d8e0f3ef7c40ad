//! Spectral projected gradient ascent
//!
//! Each iteration tries a Barzilai-Borwein step along the gradient, projects
//! the result onto the budget polytope and backtracks until the Armijo
//! sufficient-increase test passes. Every iterate is feasible, so bounds and
//! the budget equality hold even when the solver stops at its iteration cap.
//! The objective is smooth but not necessarily concave; the result is a local
//! optimum reachable from the starting point.

use super::projection::BudgetPolytope;
use super::result::{ConvergenceHistory, TerminationReason};

/// Sufficient-increase constant for the Armijo test
const ARMIJO_COEF: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;
const STEP_GROWTH: f64 = 2.0;
/// Spectral steps are clamped to `[MIN_STEP_RATIO, MAX_STEP_RATIO] * reference_step`
const MIN_STEP_RATIO: f64 = 1e-10;
const MAX_STEP_RATIO: f64 = 1e3;

/// A smooth objective to maximize, with its gradient
pub trait Objective {
    fn value(&self, x: &[f64]) -> f64;
    fn gradient(&self, x: &[f64]) -> Vec<f64>;
}

/// Final iterate and how the solver got there
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub termination_reason: TerminationReason,
    pub history: ConvergenceHistory,
}

impl SolverOutcome {
    #[must_use]
    pub fn converged(&self) -> bool {
        matches!(
            self.termination_reason,
            TerminationReason::Converged | TerminationReason::Stalled
        )
    }
}

/// Maximize `objective` over `polytope` starting from `x0`
///
/// `tolerance` is relative to the budget scale: the solver stops once the
/// projected-gradient step at the reference step size moves no coordinate by
/// more than `tolerance * max(1, budget)`.
pub fn maximize(
    objective: &dyn Objective,
    polytope: &BudgetPolytope,
    x0: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> SolverOutcome {
    let scale = polytope.budget.abs().max(1.0);
    let stop_distance = tolerance * scale;

    let mut x = polytope.project(x0);
    let mut value = objective.value(&x);
    let mut history = ConvergenceHistory::new();
    history.record(value);

    let mut gradient = objective.gradient(&x);
    let gradient_scale = inf_norm(&gradient).max(f64::MIN_POSITIVE);
    // A step of this size can move the whole budget in one iteration
    let reference_step = scale / gradient_scale;
    let mut step = reference_step;

    for iteration in 1..=max_iterations {
        let stationarity = {
            let stepped = polytope.project(&axpy(&x, reference_step, &gradient));
            max_abs_diff(&stepped, &x)
        };
        if stationarity <= stop_distance {
            return SolverOutcome {
                x,
                objective: value,
                iterations: iteration - 1,
                termination_reason: TerminationReason::Converged,
                history,
            };
        }

        let mut trial = step;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = polytope.project(&axpy(&x, trial, &gradient));
            let ascent: f64 = gradient
                .iter()
                .zip(candidate.iter().zip(x.iter()))
                .map(|(g, (c, xi))| g * (c - xi))
                .sum();
            let candidate_value = objective.value(&candidate);
            if candidate_value >= value + ARMIJO_COEF * ascent {
                accepted = Some((candidate, candidate_value));
                break;
            }
            trial *= 0.5;
        }

        // No step size helps, or the gain is below floating-point resolution
        let Some((candidate, candidate_value)) = accepted.filter(|(_, v)| *v > value) else {
            return SolverOutcome {
                x,
                objective: value,
                iterations: iteration,
                termination_reason: TerminationReason::Stalled,
                history,
            };
        };

        let next_gradient = objective.gradient(&candidate);
        step = spectral_step(&x, &candidate, &gradient, &next_gradient)
            .map_or(trial * STEP_GROWTH, |s| s.max(reference_step * MIN_STEP_RATIO))
            .min(reference_step * MAX_STEP_RATIO);

        x = candidate;
        value = candidate_value;
        gradient = next_gradient;
        history.record(value);
    }

    SolverOutcome {
        x,
        objective: value,
        iterations: max_iterations,
        termination_reason: TerminationReason::MaxIterationsReached,
        history,
    }
}

/// Barzilai-Borwein step `s·s / s·y` with `y` the gradient decrease
///
/// `None` when the curvature along the step is not negative, as happens on
/// convex stretches of the objective.
fn spectral_step(x: &[f64], next: &[f64], gradient: &[f64], next_gradient: &[f64]) -> Option<f64> {
    let (ss, sy) = x
        .iter()
        .zip(next)
        .zip(gradient.iter().zip(next_gradient))
        .fold((0.0, 0.0), |(ss, sy), ((xi, ni), (gi, gn))| {
            let s = ni - xi;
            (ss + s * s, sy + s * (gi - gn))
        });
    (sy > 0.0).then(|| ss / sy)
}

fn axpy(x: &[f64], a: f64, direction: &[f64]) -> Vec<f64> {
    x.iter().zip(direction.iter()).map(|(xi, d)| xi + a * d).collect()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0_f64, |acc, (x, y)| acc.max((x - y).abs()))
}

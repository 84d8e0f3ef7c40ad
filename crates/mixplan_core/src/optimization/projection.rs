//! Euclidean projection onto the budget polytope
//!
//! The feasible set is `{x : Σx = budget, lower ≤ x ≤ upper}`. Its projection
//! has the form `x_i = clamp(y_i - λ, lower_i, upper_i)` for a scalar shift λ,
//! and the clamped sum is non-increasing in λ, so λ is found by bisection.

const MAX_BISECTIONS: usize = 200;

/// Box constraints plus the budget equality
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPolytope {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub budget: f64,
    /// Absolute tolerance on `|Σx - budget|`
    pub tolerance: f64,
}

impl BudgetPolytope {
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Whether `x` satisfies bounds and budget within tolerance
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        let within_bounds = x
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi);
        within_bounds && (x.iter().sum::<f64>() - self.budget).abs() <= self.tolerance
    }

    /// Closest feasible point to `y`
    #[must_use]
    pub fn project(&self, y: &[f64]) -> Vec<f64> {
        let clamped = |shift: f64| -> Vec<f64> {
            y.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(v, (lo, hi))| (v - shift).clamp(*lo, *hi))
                .collect()
        };

        // At shift_lo every coordinate sits at its upper bound, at shift_hi at its lower.
        let mut shift_lo = y
            .iter()
            .zip(self.upper.iter())
            .map(|(v, hi)| v - hi)
            .fold(f64::INFINITY, f64::min);
        let mut shift_hi = y
            .iter()
            .zip(self.lower.iter())
            .map(|(v, lo)| v - lo)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut x = clamped(shift_lo);
        for _ in 0..MAX_BISECTIONS {
            let mid = 0.5 * (shift_lo + shift_hi);
            if mid <= shift_lo || mid >= shift_hi {
                break;
            }
            x = clamped(mid);
            let excess = x.iter().sum::<f64>() - self.budget;
            if excess.abs() <= self.tolerance * 1e-3 {
                break;
            }
            if excess > 0.0 {
                shift_lo = mid;
            } else {
                shift_hi = mid;
            }
        }

        self.absorb_residual(&mut x);
        x
    }

    /// Spread the remaining budget gap over coordinates that still have room
    fn absorb_residual(&self, x: &mut [f64]) {
        let residual = self.budget - x.iter().sum::<f64>();
        if residual == 0.0 {
            return;
        }
        let free: Vec<usize> = (0..x.len())
            .filter(|&i| {
                if residual > 0.0 {
                    x[i] < self.upper[i]
                } else {
                    x[i] > self.lower[i]
                }
            })
            .collect();
        if free.is_empty() {
            return;
        }
        let share = residual / free.len() as f64;
        for i in free {
            x[i] = (x[i] + share).clamp(self.lower[i], self.upper[i]);
        }
    }
}

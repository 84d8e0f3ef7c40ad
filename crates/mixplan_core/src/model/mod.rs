mod observation;
mod results;

pub use observation::{Observation, distinct_dates};
pub use results::{AttributionResult, ConfidenceInterval, MODEL_VERSION};

mod distribution;
mod stats;

pub use distribution::{CategoryCounts, EMPTY_CHART_NOTE, StripPlot};
pub use stats::{HitSummary, distinct, summarize};

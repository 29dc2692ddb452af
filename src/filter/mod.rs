mod network;
mod table;

pub use network::{CategoryFilter, NetworkFilter, SignFilter, filter_correlations};
pub use table::{HitFilter, column_options};

mod chrom;
mod columns;
mod correlation;
mod hits;

pub use chrom::{canonical_present, natural_cmp, natural_sort};
pub use correlation::{CorrelationRecord, ExpressionDirection, load_correlations};
pub use hits::{
    HitField, HitRecord, HitSchema, HitTable, LoadedHits, Upload, export_hits, load_genomic_hits,
    load_hits,
};

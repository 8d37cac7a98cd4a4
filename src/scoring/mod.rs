pub mod normalize;
pub mod quality;
pub mod rank;
pub mod rating;

pub use normalize::{normalize_series, MIDPOINT_SCORE};
pub use quality::{effective_weights, gather_scores, quality_score};
pub use rank::{min_ranks, percentiles, rank_cohort};
pub use rating::{classify, performance_category, star_rating};

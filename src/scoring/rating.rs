use crate::core::PerformanceCategory;

// Quality-score breakpoints, inclusive on the lower bound
pub const EXCELLENT_MIN: f64 = 80.0;
pub const ABOVE_AVERAGE_MIN: f64 = 65.0;
pub const AVERAGE_MIN: f64 = 50.0;
pub const BELOW_AVERAGE_MIN: f64 = 35.0;

/// Discretize a composite quality score into the 1-5 star scale.
pub fn star_rating(quality_score: f64) -> u8 {
    if quality_score >= EXCELLENT_MIN {
        5
    } else if quality_score >= ABOVE_AVERAGE_MIN {
        4
    } else if quality_score >= AVERAGE_MIN {
        3
    } else if quality_score >= BELOW_AVERAGE_MIN {
        2
    } else {
        1
    }
}

/// Ordered performance band for a composite quality score. Shares the
/// star-rating breakpoints, so band and stars never disagree.
pub fn performance_category(quality_score: f64) -> PerformanceCategory {
    if quality_score >= EXCELLENT_MIN {
        PerformanceCategory::Excellent
    } else if quality_score >= ABOVE_AVERAGE_MIN {
        PerformanceCategory::AboveAverage
    } else if quality_score >= AVERAGE_MIN {
        PerformanceCategory::Average
    } else if quality_score >= BELOW_AVERAGE_MIN {
        PerformanceCategory::BelowAverage
    } else {
        PerformanceCategory::Poor
    }
}

/// Star rating and performance band as the pair every output row carries.
pub fn classify(quality_score: f64) -> (u8, PerformanceCategory) {
    (star_rating(quality_score), performance_category(quality_score))
}

use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// User-adjustable settings (in-memory only)
// ---------------------------------------------------------------------------

pub const MAX_UNIQUE_RANGE: RangeInclusive<usize> = 20..=1000;
pub const RANDOM_COUNT_RANGE: RangeInclusive<usize> = 1..=50;

/// Columns with at most this many distinct values land in the `few` bucket.
pub const FEW_VALUES_LIMIT: usize = 20;

/// Knobs exposed in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    /// Ceiling between the `many` and `too_many` buckets; also the number of
    /// options offered for a `too_many` column.
    pub max_unique: usize,
    /// When false only `few`-bucket columns get a filter control.
    pub filter_all_columns: bool,
    /// Rows drawn by "Select random rows".
    pub random_count: usize,
    /// Numeric columns get a range control before cardinality is considered.
    pub numeric_ranges: bool,
    pub show_stats: bool,
    pub dark_mode: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            max_unique: 100,
            filter_all_columns: true,
            random_count: 10,
            numeric_ranges: true,
            show_stats: true,
            dark_mode: false,
        }
    }
}

impl ViewerSettings {
    /// Return a copy with every numeric knob forced into its allowed range.
    pub fn clamped(&self) -> Self {
        Self {
            max_unique: self
                .max_unique
                .clamp(*MAX_UNIQUE_RANGE.start(), *MAX_UNIQUE_RANGE.end()),
            random_count: self
                .random_count
                .clamp(*RANDOM_COUNT_RANGE.start(), *RANDOM_COUNT_RANGE.end()),
            ..self.clone()
        }
    }
}

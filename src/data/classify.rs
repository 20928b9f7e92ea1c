use super::model::{ColumnDescriptor, ColumnKind, Table};
use crate::config::{FEW_VALUES_LIMIT, MAX_UNIQUE_RANGE};

// ---------------------------------------------------------------------------
// Column buckets
// ---------------------------------------------------------------------------

/// Ranges narrower than this have nothing to filter on.
pub const MIN_NUMERIC_SPAN: f64 = 1e-9;

/// How a column's filter control is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// At most 20 distinct values.
    Few,
    /// Up to `max_unique` distinct values.
    Many,
    /// More than `max_unique` distinct values; options get truncated.
    TooMany,
    /// Numeric column with a usable range.
    Numeric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedColumn {
    pub bucket: Bucket,
    pub descriptor: ColumnDescriptor,
}

/// Assign every column of `table` to exactly one bucket.
///
/// With `numeric_ranges` on, a numeric column with more than one distinct
/// value and a non-degenerate span is `Numeric` regardless of cardinality.
/// Everything else is bucketed by distinct non-null count. A `max_unique`
/// below 20 is raised to 20.
pub fn classify(table: &Table, max_unique: usize, numeric_ranges: bool) -> Vec<ClassifiedColumn> {
    let max_unique = max_unique.max(*MAX_UNIQUE_RANGE.start());
    ColumnDescriptor::describe_all(table)
        .into_iter()
        .map(|descriptor| ClassifiedColumn {
            bucket: bucket_for(&descriptor, max_unique, numeric_ranges),
            descriptor,
        })
        .collect()
}

fn bucket_for(d: &ColumnDescriptor, max_unique: usize, numeric_ranges: bool) -> Bucket {
    if numeric_ranges && d.kind == ColumnKind::Numeric && d.unique_count > 1 {
        if let Some((min, max)) = d.range {
            if max - min >= MIN_NUMERIC_SPAN {
                return Bucket::Numeric;
            }
        }
    }
    if d.unique_count <= FEW_VALUES_LIMIT {
        Bucket::Few
    } else if d.unique_count <= max_unique {
        Bucket::Many
    } else {
        Bucket::TooMany
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::classify::{Bucket, ClassifiedColumn};
use super::model::{CellValue, Table};
use crate::config::MAX_UNIQUE_RANGE;
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Filter specifications: what control each column gets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    /// Multi-select over sorted distinct values.
    Choice {
        options: Vec<CellValue>,
        /// Distinct non-null values in the column (may exceed `options.len()`).
        total_distinct: usize,
        truncated: bool,
    },
    /// Inclusive range; the full `[min, max]` means "inactive".
    Range { min: f64, max: f64 },
    /// The column's values cannot be presented; shown as a notice.
    Disabled(ViewerError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub bucket: Bucket,
    pub control: FilterControl,
}

/// Build a filter specification for every column that should get one.
///
/// `too_many` columns only offer the first `max_unique` values in native sort
/// order, with the same floor of 20 the classifier applies. With
/// `filter_all_columns` off only `few` columns are returned.
pub fn build_filter_specs(
    classified: &[ClassifiedColumn],
    max_unique: usize,
    filter_all_columns: bool,
) -> Vec<FilterSpec> {
    classified
        .iter()
        .filter(|c| filter_all_columns || c.bucket == Bucket::Few)
        .map(|c| FilterSpec {
            column: c.descriptor.name.clone(),
            bucket: c.bucket,
            control: control_for(c, max_unique),
        })
        .collect()
}

fn control_for(c: &ClassifiedColumn, max_unique: usize) -> FilterControl {
    let d = &c.descriptor;
    if c.bucket == Bucket::Numeric {
        if let Some((min, max)) = d.range {
            return FilterControl::Range { min, max };
        }
    }
    if d.mixed_types {
        log::warn!("column '{}' mixes value types, filter disabled", d.name);
        return FilterControl::Disabled(ViewerError::FilterConstruction {
            column: d.name.clone(),
            reason: "values of different types cannot be sorted".to_string(),
        });
    }
    let limit = match c.bucket {
        Bucket::TooMany => max_unique.max(*MAX_UNIQUE_RANGE.start()),
        _ => usize::MAX,
    };
    FilterControl::Choice {
        options: d.distinct.iter().take(limit).cloned().collect(),
        total_distinct: d.unique_count,
        truncated: d.unique_count > limit,
    }
}

// ---------------------------------------------------------------------------
// Selections → predicates
// ---------------------------------------------------------------------------

/// A raw value picked in a filter control.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Values(Vec<CellValue>),
    Range(f64, f64),
}

/// Immutable snapshot of every control's current selection, keyed by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    by_column: BTreeMap<String, Selection>,
}

impl Selections {
    pub fn get(&self, column: &str) -> Option<&Selection> {
        self.by_column.get(column)
    }

    /// A copy with `column` set to `selection`.
    pub fn with(&self, column: &str, selection: Selection) -> Self {
        let mut by_column = self.by_column.clone();
        by_column.insert(column.to_string(), selection);
        Self { by_column }
    }

    /// A copy with `column` reset to its default.
    pub fn without(&self, column: &str) -> Self {
        let mut by_column = self.by_column.clone();
        by_column.remove(column);
        Self { by_column }
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }
}

/// A per-column condition contributing to the active filter set.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Membership(BTreeSet<CellValue>),
    /// Inclusive on both ends.
    Range { min: f64, max: f64 },
}

impl Predicate {
    /// Null never matches.
    pub fn matches(&self, value: &CellValue) -> bool {
        if value.is_null() {
            return false;
        }
        match self {
            Predicate::Membership(set) => set.contains(value),
            Predicate::Range { min, max } => value
                .as_f64()
                .is_some_and(|v| *min <= v && v <= *max),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Membership(set) => {
                let values: Vec<String> = set.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", values.join(", "))
            }
            Predicate::Range { min, max } => write!(f, "{min} to {max}"),
        }
    }
}

impl FilterSpec {
    /// Convert a raw selection into a predicate, or `None` when the selection
    /// leaves the column unfiltered (empty, full range, or mismatched kind).
    pub fn predicate(&self, selection: &Selection) -> Option<Predicate> {
        match (&self.control, selection) {
            (FilterControl::Choice { options, .. }, Selection::Values(values)) => {
                let set: BTreeSet<CellValue> = values
                    .iter()
                    .filter(|v| options.binary_search(v).is_ok())
                    .cloned()
                    .collect();
                (!set.is_empty()).then_some(Predicate::Membership(set))
            }
            (FilterControl::Range { min, max }, Selection::Range(lo, hi)) => {
                let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
                let lo = lo.clamp(*min, *max);
                let hi = hi.clamp(*min, *max);
                if lo <= *min && hi >= *max {
                    None
                } else {
                    Some(Predicate::Range { min: lo, max: hi })
                }
            }
            _ => None,
        }
    }
}

/// Column name → predicate. Empty means no filtering.
pub type ActiveFilterSet = BTreeMap<String, Predicate>;

/// Collect the predicates of every non-default selection.
pub fn build_active_filters(specs: &[FilterSpec], selections: &Selections) -> ActiveFilterSet {
    specs
        .iter()
        .filter_map(|spec| {
            let selection = selections.get(&spec.column)?;
            let predicate = spec.predicate(selection)?;
            Some((spec.column.clone(), predicate))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Combiner
// ---------------------------------------------------------------------------

/// Return indices of rows that pass every active filter, in source order.
///
/// A row passes a column's predicate only when its value is non-null and
/// matches. A predicate naming a column the table lacks matches nothing.
pub fn filtered_indices(table: &Table, filters: &ActiveFilterSet) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..table.len()).collect();
    for (column, predicate) in filters {
        let Some(col) = table.column_index(column) else {
            log::debug!("filter on unknown column '{column}' excludes all rows");
            return Vec::new();
        };
        indices.retain(|&i| predicate.matches(&table.rows()[i][col]));
    }
    indices
}

/// Materialise the filtered view as its own table.
pub fn apply_filters(table: &Table, filters: &ActiveFilterSet) -> Table {
    table.select_rows(&filtered_indices(table, filters))
}

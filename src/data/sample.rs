use rand::seq::index;
use rand::Rng;

use super::model::Table;

// ---------------------------------------------------------------------------
// Random row sampling
// ---------------------------------------------------------------------------

/// Result of drawing random rows from the filtered view.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// The filtered view has no rows; nothing to sample.
    Empty,
    /// The view had no more rows than requested, so all of them are returned.
    Full(Table),
    /// Exactly the requested number of distinct rows.
    Sampled(Table),
}

impl SampleOutcome {
    pub fn table(&self) -> Option<&Table> {
        match self {
            SampleOutcome::Empty => None,
            SampleOutcome::Full(t) | SampleOutcome::Sampled(t) => Some(t),
        }
    }
}

/// Draw up to `n` rows uniformly without replacement using the thread RNG.
pub fn sample_rows(table: &Table, n: usize) -> SampleOutcome {
    sample_rows_with(table, n, &mut rand::thread_rng())
}

/// Same as [`sample_rows`] with an explicit RNG. `n` is treated as at least 1.
pub fn sample_rows_with<R: Rng + ?Sized>(table: &Table, n: usize, rng: &mut R) -> SampleOutcome {
    let n = n.max(1);
    if table.is_empty() {
        return SampleOutcome::Empty;
    }
    let len = table.len();
    if len <= n {
        return SampleOutcome::Full(table.clone());
    }
    let picked = index::sample(rng, len, n).into_vec();
    SampleOutcome::Sampled(table.select_rows(&picked))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::CellValue;

    fn numbered(n: i64) -> Table {
        Table::new(
            vec!["id".into()],
            (0..n).map(|i| vec![CellValue::Integer(i)]).collect(),
        )
        .unwrap()
    }

    fn ids(table: &Table) -> Vec<i64> {
        table
            .column_values(0)
            .map(|v| match v {
                CellValue::Integer(i) => *i,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn empty_table_signals_empty() {
        assert_eq!(sample_rows(&numbered(0), 10), SampleOutcome::Empty);
    }

    #[test]
    fn small_table_returned_whole() {
        let t = numbered(4);
        assert_eq!(sample_rows(&t, 10), SampleOutcome::Full(t.clone()));
        assert_eq!(sample_rows(&t, 4), SampleOutcome::Full(t));
    }

    #[test]
    fn exact_count_of_distinct_source_rows() {
        let t = numbered(200);
        for _ in 0..20 {
            let SampleOutcome::Sampled(s) = sample_rows(&t, 10) else {
                panic!("expected a sample");
            };
            let picked = ids(&s);
            assert_eq!(picked.len(), 10);
            let unique: BTreeSet<i64> = picked.iter().copied().collect();
            assert_eq!(unique.len(), 10);
            assert!(unique.iter().all(|i| (0..200).contains(i)));
        }
    }

    #[test]
    fn zero_request_treated_as_one() {
        let t = numbered(5);
        let outcome = sample_rows(&t, 0);
        assert_eq!(outcome.table().map(Table::len), Some(1));
    }
}

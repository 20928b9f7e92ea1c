use super::model::{ColumnDescriptor, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Overview statistics
// ---------------------------------------------------------------------------

/// Non-null value count per column, in column order.
pub fn non_null_counts(table: &Table) -> Vec<(String, usize)> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let count = table.column_values(idx).filter(|v| !v.is_null()).count();
            (name.clone(), count)
        })
        .collect()
}

/// Mean over non-null values of each numeric column.
pub fn numeric_means(table: &Table) -> Vec<(String, f64)> {
    ColumnDescriptor::describe_all(table)
        .into_iter()
        .enumerate()
        .filter(|(_, d)| d.kind == ColumnKind::Numeric)
        .filter_map(|(idx, d)| {
            let (sum, n) = table
                .column_values(idx)
                .filter_map(|v| v.as_f64())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (n > 0).then(|| (d.name, sum / n as f64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_and_means() {
        let t = Table::new(
            vec!["name".into(), "score".into()],
            vec![
                vec![CellValue::Text("a".into()), CellValue::Integer(10)],
                vec![CellValue::Null, CellValue::Float(20.0)],
                vec![CellValue::Text("c".into()), CellValue::Null],
            ],
        )
        .unwrap();

        assert_eq!(
            non_null_counts(&t),
            vec![("name".to_string(), 2), ("score".to_string(), 2)]
        );
        assert_eq!(numeric_means(&t), vec![("score".to_string(), 15.0)]);
    }
}

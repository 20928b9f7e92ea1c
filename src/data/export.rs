use anyhow::{Context, Result, bail};
use rust_xlsxwriter::Workbook;

use super::model::{CellValue, Table};
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Export formats
// ---------------------------------------------------------------------------

/// Largest integer magnitude a spreadsheet number stores exactly (2^53).
const MAX_EXACT_INTEGER: i64 = 1 << 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("filtered_data.{}", self.extension())
    }
}

/// Serialise `table` with headers first, preserving column and row order.
pub fn export_table(table: &Table, format: ExportFormat) -> Result<Vec<u8>, ViewerError> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table),
        ExportFormat::Xlsx => write_xlsx(table),
    };
    bytes.map_err(|e| {
        log::error!("{} export failed: {e:#}", format.label());
        ViewerError::ExportFailure(format!("{e:#}"))
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns())
        .context("writing CSV header")?;
    for (i, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(CellValue::to_field))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV output: {}", e.error()))
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1").context("naming worksheet")?;

    for (c, name) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).context("too many columns for a worksheet")?;
        worksheet
            .write_string(0, col, name.as_str())
            .with_context(|| format!("writing header '{name}'"))?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let sheet_row = u32::try_from(r + 1).context("too many rows for a worksheet")?;
        for (c, value) in row.iter().enumerate() {
            let col = u16::try_from(c).context("too many columns for a worksheet")?;
            let column = &table.columns()[c];
            let written = match value {
                CellValue::Null => continue,
                CellValue::Text(s) => worksheet.write_string(sheet_row, col, s.as_str()),
                CellValue::Float(v) => {
                    if !v.is_finite() {
                        bail!("row {r}, column '{column}': {v} is not a spreadsheet number");
                    }
                    worksheet.write_number(sheet_row, col, *v)
                }
                CellValue::Bool(b) => worksheet.write_boolean(sheet_row, col, *b),
                CellValue::Integer(i) => {
                    if i.unsigned_abs() > MAX_EXACT_INTEGER as u64 {
                        bail!("row {r}, column '{column}': integer {i} cannot be stored exactly");
                    }
                    worksheet.write_number(sheet_row, col, *i as f64)
                }
            };
            written.with_context(|| format!("row {r}, column '{column}'"))?;
        }
    }

    workbook.save_to_buffer().context("assembling workbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> Table {
        Table::new(
            vec!["Region".into(), "Score".into(), "Note".into()],
            vec![
                vec![
                    CellValue::Text("A".into()),
                    CellValue::Integer(50),
                    CellValue::Text("has, comma".into()),
                ],
                vec![
                    CellValue::Text("B".into()),
                    CellValue::Float(2.5),
                    CellValue::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_rows_in_order() {
        let bytes = export_table(&sample_table(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Region,Score,Note\nA,50,\"has, comma\"\nB,2.5,\n"
        );
    }

    #[test]
    fn csv_of_empty_table_is_header_only() {
        let t = Table::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        let bytes = export_table(&t, ExportFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a,b\n");
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = export_table(&sample_table(), ExportFormat::Xlsx).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn xlsx_cell_grid_matches_table() {
        use calamine::{Data, Reader, Xlsx};

        let bytes = export_table(&sample_table(), ExportFormat::Xlsx).unwrap();
        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Sheet1").unwrap();
        assert_eq!(range.start(), Some((0, 0)));

        let grid: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
        assert_eq!(
            grid,
            vec![
                vec![
                    Data::String("Region".into()),
                    Data::String("Score".into()),
                    Data::String("Note".into()),
                ],
                vec![
                    Data::String("A".into()),
                    Data::Float(50.0),
                    Data::String("has, comma".into()),
                ],
                vec![Data::String("B".into()), Data::Float(2.5), Data::Empty],
            ]
        );
    }

    #[test]
    fn xlsx_rejects_non_finite_floats() {
        for v in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let t = Table::new(
                vec!["ratio".into()],
                vec![vec![CellValue::Float(1.0)], vec![CellValue::Float(v)]],
            )
            .unwrap();
            let err = export_table(&t, ExportFormat::Xlsx).unwrap_err();
            assert!(
                matches!(err, ViewerError::ExportFailure(ref msg) if msg.contains("row 1, column 'ratio'")),
                "{v}: {err}"
            );
        }
    }

    #[test]
    fn xlsx_rejects_inexact_integers() {
        let t = Table::new(
            vec!["big".into()],
            vec![vec![CellValue::Integer(i64::MAX)]],
        )
        .unwrap();
        let err = export_table(&t, ExportFormat::Xlsx).unwrap_err();
        assert!(matches!(err, ViewerError::ExportFailure(ref msg) if msg.contains("big")));
    }

    #[test]
    fn default_file_names() {
        assert_eq!(ExportFormat::Csv.default_file_name(), "filtered_data.csv");
        assert_eq!(ExportFormat::Xlsx.default_file_name(), "filtered_data.xlsx");
    }
}

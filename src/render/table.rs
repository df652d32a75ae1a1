//! Delimited text (CSV) rendering for tables.

use crate::error::{Error, Result};
use crate::model::Table;

/// Render a table as CSV.
///
/// The header record is row 0 when the table has headers, otherwise
/// `column_1..column_n`. Every record must have exactly `columns` fields.
pub fn to_csv(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(Vec::new());

    match table.header() {
        Some(header) => writer.write_record(header)?,
        None => writer.write_record((1..=table.columns).map(|i| format!("column_{}", i)))?,
    }
    for row in table.body() {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Render(format!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Render(format!("CSV encoding error: {}", e)))
}

/// Render every table of a document as CSV blocks, each preceded by a
/// `# <id> (page N, method)` line.
pub fn tables_to_csv(tables: &[Table]) -> String {
    let mut out = String::new();
    for table in tables {
        out.push_str(&format!(
            "# {} (page {}, {})\n",
            table.id, table.page, table.extraction_method
        ));
        match &table.flattened_text {
            Some(text) => out.push_str(text),
            None => {
                if let Some(ref err) = table.conversion_error {
                    out.push_str(&format!("# not rendered: {}\n", err));
                }
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    fn table(rows: &[&[&str]]) -> Table {
        let data = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Table::from_matrix(1, data, ExtractionMethod::TextAlignment)
    }

    #[test]
    fn test_generated_header() {
        let csv = to_csv(&table(&[&["a", "b"], &["c", "d"]])).unwrap();
        assert_eq!(csv, "column_1,column_2\na,b\nc,d\n");
    }

    #[test]
    fn test_row_zero_header() {
        let mut t = table(&[&["Name", "Note"], &["x", "has, comma"]]);
        t.has_headers = true;
        let csv = to_csv(&t).unwrap();
        assert_eq!(csv, "Name,Note\nx,\"has, comma\"\n");
    }

    #[test]
    fn test_ragged_table_fails() {
        let mut t = table(&[&["a", "b"], &["c", "d"]]);
        t.data[1].pop();
        assert!(matches!(to_csv(&t), Err(Error::Render(_))));
    }

    #[test]
    fn test_tables_to_csv() {
        let mut t = table(&[&["a", "b"], &["c", "d"]]);
        t.id = "table_1".to_string();
        t.flattened_text = Some("column_1,column_2\na,b\nc,d\n".to_string());
        let out = tables_to_csv(&[t]);
        assert!(out.starts_with("# table_1 (page 1, text_alignment)\n"));
        assert!(out.contains("c,d\n"));
    }
}

//! Cross-strategy table deduplication.
//!
//! Tables arrive in strategy priority order, so the first table seen for a
//! given shape and first row is the one with the strongest evidence.

use crate::model::Table;

/// Whether two tables describe the same region.
///
/// Same page, same shape, and an identical first row.
pub fn is_duplicate(a: &Table, b: &Table) -> bool {
    a.page == b.page && a.rows == b.rows && a.columns == b.columns && a.data.first() == b.data.first()
}

/// Accepted tables, first-seen wins.
#[derive(Debug, Default)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table unless it duplicates one already accepted.
    ///
    /// Returns whether the table was kept.
    pub fn insert(&mut self, table: Table) -> bool {
        if let Some(existing) = self.tables.iter().find(|t| is_duplicate(t, &table)) {
            log::debug!(
                "Page {}: {} table duplicates {} table, dropped",
                table.page,
                table.extraction_method,
                existing.extraction_method
            );
            return false;
        }
        self.tables.push(table);
        true
    }

    /// Number of accepted tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no table was accepted.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Accepted tables in insertion order.
    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

/// Drop every table that duplicates an earlier one.
pub fn dedup_tables(tables: Vec<Table>) -> Vec<Table> {
    let mut set = TableSet::new();
    for table in tables {
        set.insert(table);
    }
    set.into_tables()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    fn table(page: u32, first: &str, method: ExtractionMethod) -> Table {
        Table::from_matrix(
            page,
            vec![
                vec![first.to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ],
            method,
        )
    }

    #[test]
    fn test_first_seen_wins() {
        let tables = vec![
            table(1, "a", ExtractionMethod::BorderedHybrid),
            table(1, "a", ExtractionMethod::grid("strict-lines")),
            table(1, "a", ExtractionMethod::TextAlignment),
        ];
        let kept = dedup_tables(tables);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].extraction_method, ExtractionMethod::BorderedHybrid);
    }

    #[test]
    fn test_different_page_or_first_row_kept() {
        let tables = vec![
            table(1, "a", ExtractionMethod::TextAlignment),
            table(2, "a", ExtractionMethod::TextAlignment),
            table(1, "z", ExtractionMethod::TextAlignment),
        ];
        assert_eq!(dedup_tables(tables).len(), 3);
    }

    #[test]
    fn test_different_shape_kept() {
        let mut wide = table(1, "a", ExtractionMethod::TextAlignment);
        wide.data.push(vec!["e".to_string(), "f".to_string()]);
        wide.rows = 3;
        let tables = vec![table(1, "a", ExtractionMethod::BorderedHybrid), wide];
        assert_eq!(dedup_tables(tables).len(), 2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let tables = vec![
            table(1, "a", ExtractionMethod::grid("text")),
            table(1, "a", ExtractionMethod::TextAlignment),
            table(1, "x", ExtractionMethod::TextAlignment),
        ];
        let once = dedup_tables(tables);
        let twice = dedup_tables(once.clone());
        assert_eq!(once, twice);
    }
}

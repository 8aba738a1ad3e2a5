use crate::core::config::ColumnMatcher;
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::metrics::column::column_index;
use crate::core::model::Table;
use aho_corasick::AhoCorasick;
use serde::Serialize;
use std::collections::HashMap;

pub const BLANK_CATEGORY: &str = "(blank)";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Value frequencies of one column, most frequent first. Ties keep the order
/// in which values first appeared.
pub fn compute_category_counts(table: &Table, column: &str) -> AnalysisResult<Vec<CategoryCount>> {
    let idx = column_index(table, column)?;
    if table.is_empty() {
        return Err(AnalysisError::empty("table has no rows"));
    }
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for cell in table.column(idx) {
        let key = if cell.is_empty() { BLANK_CATEGORY } else { cell };
        match index.get(key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key, counts.len());
                counts.push(CategoryCount {
                    category: key.to_string(),
                    count: 1,
                });
            }
        }
    }
    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(counts)
}

/// Resolves the categorical column for a table.
///
/// An explicit column name must exist; a keyword match returns `None` when
/// no header matches.
pub fn find_category_column(
    table: &Table,
    matcher: &ColumnMatcher,
) -> AnalysisResult<Option<String>> {
    if let Some(column) = &matcher.column {
        column_index(table, column)?;
        return Ok(Some(column.clone()));
    }
    if matcher.keyword.is_empty() {
        return Ok(None);
    }
    let fold = |s: &str| {
        if matcher.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let ac = AhoCorasick::new([fold(matcher.keyword.as_str())])
        .map_err(|e| AnalysisError::format(format!("invalid category keyword: {e}")))?;
    Ok(table
        .headers
        .iter()
        .find(|h| ac.is_match(fold(h.as_str()).as_str()))
        .cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(headers: &[&str], col: &[&str]) -> Table {
        Table {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: col
                .iter()
                .map(|v| headers.iter().map(|_| v.to_string()).collect())
                .collect(),
        }
    }

    fn counts(pairs: &[(&str, u64)]) -> Vec<CategoryCount> {
        pairs
            .iter()
            .map(|(c, n)| CategoryCount {
                category: c.to_string(),
                count: *n,
            })
            .collect()
    }

    #[test]
    fn descending_with_first_seen_ties() {
        let t = table(&["type"], &["A", "B", "A", "C", "A"]);
        assert_eq!(
            compute_category_counts(&t, "type").unwrap(),
            counts(&[("A", 3), ("B", 1), ("C", 1)])
        );
        let t = table(&["type"], &["z", "y", "y", "z", "x"]);
        assert_eq!(
            compute_category_counts(&t, "type").unwrap(),
            counts(&[("z", 2), ("y", 2), ("x", 1)])
        );
    }

    #[test]
    fn blank_cells_get_a_category() {
        let t = table(&["type"], &["", "A", ""]);
        assert_eq!(
            compute_category_counts(&t, "type").unwrap(),
            counts(&[(BLANK_CATEGORY, 2), ("A", 1)])
        );
    }

    #[test]
    fn missing_column_and_empty_table() {
        let t = table(&["kind"], &["A"]);
        assert_eq!(
            compute_category_counts(&t, "type").unwrap_err(),
            AnalysisError::ColumnNotFound("type".to_string())
        );
        let t = table(&["type"], &[]);
        assert!(matches!(
            compute_category_counts(&t, "type"),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn keyword_match_respects_case_setting() {
        let t = table(&["Name", "Protein_Type", "type"], &["a"]);
        let mut m = ColumnMatcher::default();
        assert_eq!(
            find_category_column(&t, &m).unwrap(),
            Some("Protein_Type".to_string())
        );
        m.case_sensitive = true;
        assert_eq!(find_category_column(&t, &m).unwrap(), Some("type".to_string()));
        m.keyword = "class".to_string();
        assert_eq!(find_category_column(&t, &m).unwrap(), None);
        m.keyword.clear();
        assert_eq!(find_category_column(&t, &m).unwrap(), None);
    }

    #[test]
    fn explicit_column_must_exist() {
        let t = table(&["Name", "family"], &["a"]);
        let m = ColumnMatcher {
            column: Some("family".to_string()),
            ..ColumnMatcher::default()
        };
        assert_eq!(find_category_column(&t, &m).unwrap(), Some("family".to_string()));
        let m = ColumnMatcher {
            column: Some("organism".to_string()),
            ..ColumnMatcher::default()
        };
        assert_eq!(
            find_category_column(&t, &m).unwrap_err(),
            AnalysisError::ColumnNotFound("organism".to_string())
        );
    }

    #[test]
    fn keyword_folds_non_ascii_case() {
        let t = table(&["Protein", "CATÉGORIE"], &["x"]);
        let matcher = ColumnMatcher {
            keyword: "catégorie".to_string(),
            ..ColumnMatcher::default()
        };
        assert_eq!(
            find_category_column(&t, &matcher).unwrap().as_deref(),
            Some("CATÉGORIE")
        );
        let strict = ColumnMatcher {
            case_sensitive: true,
            ..matcher
        };
        assert_eq!(find_category_column(&t, &strict).unwrap(), None);
    }
}

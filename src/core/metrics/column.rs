use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::model::Table;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        Some(Self {
            count: values.len() as u64,
            mean: sum / values.len() as f64,
            min,
            max,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedStats {
    pub column: String,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn column_index(table: &Table, column: &str) -> AnalysisResult<usize> {
    table
        .column_index(column)
        .ok_or_else(|| AnalysisError::ColumnNotFound(column.to_string()))
}

/// Numeric values of a column, skipping blank cells.
pub fn column_values(table: &Table, column: &str) -> AnalysisResult<Vec<f64>> {
    let idx = column_index(table, column)?;
    if table.is_empty() {
        return Err(AnalysisError::empty("table has no rows"));
    }
    let mut values = Vec::with_capacity(table.len());
    for (row, cell) in table.column(idx).enumerate() {
        if cell.is_empty() {
            continue;
        }
        let v = parse_number(cell).ok_or_else(|| {
            AnalysisError::format(format!(
                "column '{}' has non-numeric value '{}' in row {}",
                column,
                cell,
                row + 1
            ))
        })?;
        values.push(v);
    }
    Ok(values)
}

/// Mean, min and max of a numeric column.
pub fn compute_column_metrics(table: &Table, column: &str) -> AnalysisResult<ColumnStats> {
    let values = column_values(table, column)?;
    ColumnStats::from_values(&values)
        .ok_or_else(|| AnalysisError::empty(format!("column '{}' has no values", column)))
}

/// Stats for every column whose non-blank cells all parse as numbers.
pub fn numeric_columns(table: &Table) -> Vec<NamedStats> {
    table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let values: Option<Vec<f64>> = table
                .column(idx)
                .filter(|c| !c.is_empty())
                .map(parse_number)
                .collect();
            let stats = ColumnStats::from_values(&values?)?;
            Some(NamedStats {
                column: name.clone(),
                stats,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn mean_min_max() {
        let t = table(&["w"], &[&["10"], &["20"], &["30"]]);
        let s = compute_column_metrics(&t, "w").unwrap();
        assert_eq!(
            s,
            ColumnStats {
                count: 3,
                mean: 20.0,
                min: 10.0,
                max: 30.0
            }
        );
    }

    #[test]
    fn missing_column() {
        let t = table(&["w"], &[&["1"]]);
        assert_eq!(
            compute_column_metrics(&t, "mass").unwrap_err(),
            AnalysisError::ColumnNotFound("mass".to_string())
        );
    }

    #[test]
    fn blanks_skipped_and_text_rejected() {
        let t = table(&["w", "n"], &[&["1.5", "x"], &["", "y"], &["2.5", "z"]]);
        let s = compute_column_metrics(&t, "w").unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 2.0);
        let err = compute_column_metrics(&t, "n").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Format("column 'n' has non-numeric value 'x' in row 1".to_string())
        );
    }

    #[test]
    fn empty_table_and_blank_column() {
        let t = table(&["w"], &[]);
        assert!(matches!(
            compute_column_metrics(&t, "w"),
            Err(AnalysisError::EmptyInput(_))
        ));
        let t = table(&["w"], &[&[""]]);
        assert!(matches!(
            compute_column_metrics(&t, "w"),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn detects_numeric_columns() {
        let t = table(
            &["name", "weight", "len"],
            &[&["a", "10.5", "3"], &["b", "", "4"], &["c", "12", "NaN"]],
        );
        let cols: Vec<String> = numeric_columns(&t).into_iter().map(|c| c.column).collect();
        assert_eq!(cols, vec!["weight".to_string()]);
    }
}

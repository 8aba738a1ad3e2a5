use crate::core::config::AnalysisConfig;
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::model::{ParsedData, Table};
use serde::Serialize;

mod category;
mod column;
mod sequence;

pub use category::{CategoryCount, compute_category_counts, find_category_column};
pub use column::{ColumnStats, NamedStats, column_values, compute_column_metrics, numeric_columns};
pub use sequence::{SequenceAnalysis, summarize_sequences};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HistBin {
    pub lo: f64,
    pub hi: f64,
    pub count: u64,
}

/// Equal-width histogram. The last bin is closed on both ends.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistBin>,
}

impl Histogram {
    pub fn build(values: &[f64], bins: usize) -> Self {
        if values.is_empty() || bins == 0 {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max - min < f64::EPSILON {
            return Self {
                bins: vec![HistBin {
                    lo: min,
                    hi: max,
                    count: values.len() as u64,
                }],
            };
        }
        let width = (max - min) / bins as f64;
        let mut out: Vec<HistBin> = (0..bins)
            .map(|i| HistBin {
                lo: min + width * i as f64,
                hi: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();
        for &v in values {
            let i = (((v - min) / width) as usize).min(bins - 1);
            out[i].count += 1;
        }
        Self { bins: out }
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySection {
    pub column: String,
    pub counts: Vec<CategoryCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistogramSection {
    pub column: String,
    pub stats: ColumnStats,
    pub histogram: Histogram,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableAnalysis {
    pub rows: u64,
    pub headers: Vec<String>,
    pub preview: Vec<Vec<String>>,
    pub numeric: Vec<NamedStats>,
    pub category: Option<CategorySection>,
    pub histogram: Option<HistogramSection>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Analysis {
    Sequences(SequenceAnalysis),
    Table(TableAnalysis),
}

pub fn analyze(data: &ParsedData, cfg: &AnalysisConfig) -> AnalysisResult<Analysis> {
    match data {
        ParsedData::Sequences(records) => Ok(Analysis::Sequences(summarize_sequences(
            records,
            cfg.case_policy,
            cfg.bins,
        )?)),
        ParsedData::Table(table) => Ok(Analysis::Table(summarize_table(table, cfg)?)),
    }
}

/// Column statistics, category counts and the histogram column of a table.
pub fn summarize_table(table: &Table, cfg: &AnalysisConfig) -> AnalysisResult<TableAnalysis> {
    if table.is_empty() {
        return Err(AnalysisError::empty("table has no rows"));
    }
    let numeric = numeric_columns(table);

    let category = match find_category_column(table, &cfg.category)? {
        Some(column) => {
            let counts = compute_category_counts(table, &column)?;
            Some(CategorySection { column, counts })
        }
        None => None,
    };

    let histogram_column = match &cfg.histogram_column {
        Some(c) => Some(c.clone()),
        None => numeric.first().map(|n| n.column.clone()),
    };
    let histogram = match histogram_column {
        Some(column) => {
            let stats = compute_column_metrics(table, &column)?;
            let values = column_values(table, &column)?;
            let histogram = Histogram::build(&values, cfg.bins);
            Some(HistogramSection {
                column,
                stats,
                histogram,
            })
        }
        None => None,
    };

    Ok(TableAnalysis {
        rows: table.len() as u64,
        headers: table.headers.clone(),
        preview: table.rows.iter().take(cfg.preview_rows).cloned().collect(),
        numeric,
        category,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ColumnMatcher;
    use crate::core::table;
    use pretty_assertions::assert_eq;

    const PROTEINS: &str = "Protein,Molecular Weight,Type\n\
        P1,10,enzyme\n\
        P2,20,receptor\n\
        P3,30,enzyme\n";

    #[test]
    fn histogram_bins_cover_range() {
        let h = Histogram::build(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(h.bins.len(), 2);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.bins[1].count, 3);
        assert_eq!(h.bins[1].hi, 4.0);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<u64>(), 5);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(Histogram::build(&[], 10).is_empty());
        let h = Histogram::build(&[7.0, 7.0], 10);
        assert_eq!(h.bins, vec![HistBin { lo: 7.0, hi: 7.0, count: 2 }]);
    }

    #[test]
    fn table_summary_picks_type_and_first_numeric() {
        let t = table::parse(PROTEINS, b',').unwrap();
        let out = summarize_table(&t, &AnalysisConfig::default()).unwrap();
        assert_eq!(out.rows, 3);
        assert_eq!(out.numeric.len(), 1);
        let cat = out.category.unwrap();
        assert_eq!(cat.column, "Type");
        assert_eq!(cat.counts[0].category, "enzyme");
        assert_eq!(cat.counts[0].count, 2);
        let hist = out.histogram.unwrap();
        assert_eq!(hist.column, "Molecular Weight");
        assert_eq!(hist.stats.mean, 20.0);
        assert_eq!(hist.stats.min, 10.0);
        assert_eq!(hist.stats.max, 30.0);
    }

    #[test]
    fn explicit_columns_must_exist() {
        let t = table::parse(PROTEINS, b',').unwrap();
        let cfg = AnalysisConfig {
            histogram_column: Some("Mass".to_string()),
            ..AnalysisConfig::default()
        };
        assert_eq!(
            summarize_table(&t, &cfg).unwrap_err(),
            AnalysisError::ColumnNotFound("Mass".to_string())
        );
        let cfg = AnalysisConfig {
            category: ColumnMatcher {
                column: Some("Family".to_string()),
                ..ColumnMatcher::default()
            },
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            summarize_table(&t, &cfg),
            Err(AnalysisError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn table_without_rows_is_empty_input() {
        let t = table::parse("a,b\n", b',').unwrap();
        assert!(matches!(
            summarize_table(&t, &AnalysisConfig::default()),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn preview_is_truncated() {
        let t = table::parse(PROTEINS, b',').unwrap();
        let cfg = AnalysisConfig {
            preview_rows: 2,
            ..AnalysisConfig::default()
        };
        assert_eq!(summarize_table(&t, &cfg).unwrap().preview.len(), 2);
    }
}

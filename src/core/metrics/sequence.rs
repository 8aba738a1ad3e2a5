use crate::core::config::CasePolicy;
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::metrics::Histogram;
use crate::core::model::SequenceRecord;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SequenceMetrics {
    pub length: u64,
    pub gc_count: u64,
    pub at_count: u64,
    pub gc_ratio: f64,
    pub at_ratio: f64,
}

impl SequenceMetrics {
    pub fn gc_content(&self) -> f64 {
        self.gc_ratio * 100.0
    }

    pub fn at_content(&self) -> f64 {
        self.at_ratio * 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SequenceRow {
    pub id: String,
    #[serde(flatten)]
    pub metrics: SequenceMetrics,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SequenceSummary {
    pub sequences: u64,
    pub skipped_empty: u64,
    pub total_residues: u64,
    pub min_len: u64,
    pub max_len: u64,
    pub mean_len: f64,
    pub gc_ratio: f64,
    pub at_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SequenceAnalysis {
    pub rows: Vec<SequenceRow>,
    pub skipped: Vec<String>,
    pub summary: SequenceSummary,
    pub length_histogram: Histogram,
}

fn count_gc_at(residues: &[u8], policy: CasePolicy) -> (u64, u64) {
    let mut gc = 0u64;
    let mut at = 0u64;
    for &b in residues {
        let b = match policy {
            CasePolicy::Exact => b,
            CasePolicy::Insensitive => b.to_ascii_uppercase(),
        };
        match b {
            b'G' | b'C' => gc += 1,
            b'A' | b'T' => at += 1,
            _ => {}
        }
    }
    (gc, at)
}

/// Length and GC/AT composition of one residue string.
pub fn compute_sequence_metrics(
    residues: &str,
    policy: CasePolicy,
) -> AnalysisResult<SequenceMetrics> {
    let length = residues.chars().count() as u64;
    if length == 0 {
        return Err(AnalysisError::empty("sequence has no residues"));
    }
    let (gc_count, at_count) = count_gc_at(residues.as_bytes(), policy);
    Ok(SequenceMetrics {
        length,
        gc_count,
        at_count,
        gc_ratio: gc_count as f64 / length as f64,
        at_ratio: at_count as f64 / length as f64,
    })
}

/// Per-record metrics plus file-wide aggregates. Records without residues
/// are listed in `skipped` and left out of every statistic.
pub fn summarize_sequences(
    records: &[SequenceRecord],
    policy: CasePolicy,
    bins: usize,
) -> AnalysisResult<SequenceAnalysis> {
    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for record in records {
        if record.residues.is_empty() {
            skipped.push(record.id.clone());
            continue;
        }
        let metrics = compute_sequence_metrics(&record.residues, policy)?;
        rows.push(SequenceRow {
            id: record.id.clone(),
            metrics,
        });
    }
    if rows.is_empty() {
        return Err(AnalysisError::empty(format!(
            "all {} sequence records are empty",
            records.len()
        )));
    }

    let mut total = 0u64;
    let mut gc = 0u64;
    let mut at = 0u64;
    let mut min_len = u64::MAX;
    let mut max_len = 0u64;
    for row in &rows {
        let m = &row.metrics;
        total += m.length;
        gc += m.gc_count;
        at += m.at_count;
        min_len = min_len.min(m.length);
        max_len = max_len.max(m.length);
    }
    let n = rows.len() as u64;
    let summary = SequenceSummary {
        sequences: n,
        skipped_empty: skipped.len() as u64,
        total_residues: total,
        min_len,
        max_len,
        mean_len: total as f64 / n as f64,
        gc_ratio: gc as f64 / total as f64,
        at_ratio: at as f64 / total as f64,
    };
    let lengths: Vec<f64> = rows.iter().map(|r| r.metrics.length as f64).collect();
    let length_histogram = Histogram::build(&lengths, bins);

    Ok(SequenceAnalysis {
        rows,
        skipped,
        summary,
        length_histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rec(id: &str, residues: &str) -> SequenceRecord {
        SequenceRecord {
            id: id.to_string(),
            residues: residues.to_string(),
        }
    }

    #[test]
    fn gattaca() {
        let m = compute_sequence_metrics("GATTACA", CasePolicy::Exact).unwrap();
        assert_eq!(m.length, 7);
        assert_eq!(m.gc_count, 2);
        assert_eq!(m.at_count, 5);
        assert!((m.gc_ratio - 2.0 / 7.0).abs() < EPS);
        assert!((m.at_ratio - 5.0 / 7.0).abs() < EPS);
        assert!((m.gc_content() - 28.571428571).abs() < 1e-6);
    }

    #[test]
    fn acgt_ratios_sum_to_one() {
        for s in ["A", "GC", "ACGTACGTTT", "GGGGGGGGA", "TACGATCGATCGATGCTAGC"] {
            let m = compute_sequence_metrics(s, CasePolicy::Exact).unwrap();
            assert!((m.gc_ratio + m.at_ratio - 1.0).abs() < EPS, "{s}");
        }
    }

    #[test]
    fn empty_residues_rejected() {
        assert_eq!(
            compute_sequence_metrics("", CasePolicy::Exact).unwrap_err(),
            AnalysisError::EmptyInput("sequence has no residues".to_string())
        );
    }

    #[test]
    fn case_policy_controls_lowercase() {
        let exact = compute_sequence_metrics("ggAT", CasePolicy::Exact).unwrap();
        assert_eq!((exact.gc_count, exact.at_count), (0, 2));
        let loose = compute_sequence_metrics("ggAT", CasePolicy::Insensitive).unwrap();
        assert_eq!((loose.gc_count, loose.at_count), (2, 2));
    }

    #[test]
    fn other_symbols_count_towards_length_only() {
        let m = compute_sequence_metrics("ACGTNN", CasePolicy::Exact).unwrap();
        assert_eq!(m.length, 6);
        assert!((m.gc_ratio + m.at_ratio - 4.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn summary_pools_counts_and_skips_empty() {
        let records = vec![rec("a", "GGCC"), rec("gap", ""), rec("b", "AT")];
        let out = summarize_sequences(&records, CasePolicy::Exact, 10).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.skipped, vec!["gap".to_string()]);
        let s = &out.summary;
        assert_eq!(s.sequences, 2);
        assert_eq!(s.skipped_empty, 1);
        assert_eq!(s.total_residues, 6);
        assert_eq!((s.min_len, s.max_len), (2, 4));
        assert!((s.mean_len - 3.0).abs() < EPS);
        assert!((s.gc_ratio - 4.0 / 6.0).abs() < EPS);
        assert_eq!(out.length_histogram.bins.iter().map(|b| b.count).sum::<u64>(), 2);
    }

    #[test]
    fn all_empty_records_is_empty_input() {
        let records = vec![rec("a", ""), rec("b", "")];
        assert!(matches!(
            summarize_sequences(&records, CasePolicy::Exact, 10),
            Err(AnalysisError::EmptyInput(_))
        ));
    }
}

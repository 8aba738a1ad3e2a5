use crate::core::config::AnalysisConfig;
use crate::core::error::AnalysisResult;
use crate::core::ingest::ingest;
use crate::core::metrics::{self, Analysis};
use crate::core::model::UploadContext;
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunOutput {
    pub ctx: UploadContext,
    pub analysis: Analysis,
}

/// Ingests one upload and computes every metric shown on the dashboard.
/// Pure apart from logging: nothing is cached between calls.
pub fn run(bytes: &[u8], file_name: &str, cfg: &AnalysisConfig) -> AnalysisResult<RunOutput> {
    let t_total = Instant::now();

    let t_ingest = Instant::now();
    let ingested = ingest(bytes, file_name)?;
    log_stage("engine.ingest", t_ingest);

    let t_metrics = Instant::now();
    let analysis = metrics::analyze(&ingested.data, cfg)?;
    log_stage("engine.metrics", t_metrics);

    let ctx = UploadContext {
        file_name: file_name.to_string(),
        sample_name: sample_name(file_name),
        format: ingested.format,
        gzipped: ingested.gzipped,
        bytes: bytes.len(),
    };
    match &analysis {
        Analysis::Sequences(s) => info!(
            file = %ctx.file_name,
            sequences = s.summary.sequences,
            residues = s.summary.total_residues,
            "analyzed sequence file"
        ),
        Analysis::Table(t) => info!(
            file = %ctx.file_name,
            rows = t.rows,
            columns = t.headers.len(),
            "analyzed table"
        ),
    }
    log_stage("engine.total", t_total);

    Ok(RunOutput { ctx, analysis })
}

/// `proteins.csv.gz` -> `proteins`.
pub fn sample_name(file_name: &str) -> String {
    let (name, _) = crate::core::io::strip_gz_suffix(file_name);
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload")
        .to_string()
}

pub fn log_stage(name: &str, t: Instant) {
    debug!(stage = name, time = %fmt_dur(t.elapsed()), "stage done");
}

pub fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

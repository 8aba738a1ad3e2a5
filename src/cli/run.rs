use crate::cli::args::{AnalysisArgs, Cli, Commands, ReportArgs, SessionArgs, ViewArg};
use crate::core::config::{AnalysisConfig, CasePolicy};
use crate::core::engine::{self, log_stage};
use crate::core::io::Upload;
use crate::core::session::{Session, SessionState};
use crate::report::{self, View};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const DASHBOARD_HTML: &str = "dashboard.html";
const SUMMARY_TXT: &str = "summary.txt";
const METRICS_TSV: &str = "metrics.tsv";
const METRICS_JSON: &str = "metrics.json";
const FIGURES_DIR: &str = "figures";

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Report(args) => {
            let out_dir = run_report(args)?;
            println!("{}", out_dir.display());
            Ok(())
        }
        Commands::Session(args) => run_session(args, io::stdin().lock()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("KIRA_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn build_config(args: &AnalysisArgs) -> Result<AnalysisConfig> {
    let mut cfg = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if args.case_insensitive {
        cfg.case_policy = CasePolicy::Insensitive;
    }
    if let Some(k) = &args.category_keyword {
        cfg.category.keyword = k.clone();
    }
    if args.category_case_sensitive {
        cfg.category.case_sensitive = true;
    }
    if let Some(c) = &args.category_column {
        cfg.category.column = Some(c.clone());
    }
    if let Some(c) = &args.histogram_column {
        cfg.histogram_column = Some(c.clone());
    }
    if let Some(bins) = args.bins {
        if bins == 0 {
            bail!("--bins must be >= 1");
        }
        cfg.bins = bins;
    }
    Ok(cfg)
}

pub fn selected_views(args: &AnalysisArgs) -> Vec<View> {
    if args.view.is_empty() {
        return View::ALL.to_vec();
    }
    args.view
        .iter()
        .map(|v| match v {
            ViewArg::Table => View::Table,
            ViewArg::Composition => View::Composition,
            ViewArg::Lengths => View::Lengths,
            ViewArg::Categories => View::Categories,
            ViewArg::Histogram => View::Histogram,
        })
        .collect()
}

/// Analyzes one file and writes its dashboard directory. Returns the
/// directory; fails after writing the dashboard if the file was rejected.
pub fn run_report(args: ReportArgs) -> Result<PathBuf> {
    let t0 = Instant::now();
    let cfg = build_config(&args.analysis)?;
    let views = selected_views(&args.analysis);

    let t_read = Instant::now();
    let upload = if args.input.as_os_str() == "-" {
        let Some(name) = args.name.as_deref() else {
            bail!("--name is required when reading from stdin");
        };
        Upload::from_reader(io::stdin().lock(), name)?
    } else {
        if !args.input.is_file() {
            bail!("input file not found: {}", args.input.display());
        }
        Upload::open(&args.input)?
    };
    let declared = args.name.clone().unwrap_or_else(|| upload.name().to_string());
    log_stage("read", t_read);

    let sample_name = args
        .sample_name
        .clone()
        .unwrap_or_else(|| engine::sample_name(&declared));
    let root = format!("{}_dashboard", sample_name);
    let out_dir = args.out.join(&root);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    clear_previous_outputs(&args.out, &root)?;

    let mut session = Session::new(cfg);
    let state = session.upload(upload.bytes(), &declared);

    let t_html = Instant::now();
    report::html::write(&out_dir.join(DASHBOARD_HTML), state, &views)?;
    log_stage("html", t_html);

    let output = match state {
        SessionState::Loaded(output) => output,
        SessionState::Failed { error, .. } => {
            bail!(
                "{} rejected ({}): {}; see {}",
                declared,
                error.kind(),
                error,
                out_dir.join(DASHBOARD_HTML).display()
            );
        }
        SessionState::Empty => bail!("no upload was processed"),
    };

    let t_text = Instant::now();
    report::summary_txt::write(&out_dir.join(SUMMARY_TXT), output)?;
    report::metrics_txt::write(&out_dir.join(METRICS_TSV), output)?;
    let mut bundled: Vec<String> = vec![
        DASHBOARD_HTML.to_string(),
        SUMMARY_TXT.to_string(),
        METRICS_TSV.to_string(),
    ];
    if args.json {
        report::json::write(&out_dir.join(METRICS_JSON), output)?;
        bundled.push(METRICS_JSON.to_string());
    }
    log_stage("text", t_text);

    if args.export_figures {
        let t_fig = Instant::now();
        let written = report::figures::write(&out_dir, output, &views)
            .with_context(|| "failed to export figures")?;
        info!(count = written.len(), "figures exported");
        for path in &written {
            let rel = path.strip_prefix(&out_dir).with_context(|| {
                format!("figure {} is outside {}", path.display(), out_dir.display())
            })?;
            bundled.push(rel.to_string_lossy().replace('\\', "/"));
        }
        log_stage("figures", t_fig);
    }

    if !args.no_zip {
        let t_zip = Instant::now();
        let names: Vec<&str> = bundled.iter().map(String::as_str).collect();
        report::zip::write_zip(&args.out, &root, &names)
            .with_context(|| "failed to create zip output")?;
        log_stage("zip", t_zip);
    }

    info!(out = %out_dir.display(), "report written");
    log_stage("total", t0);
    Ok(out_dir)
}

/// Removes what an earlier run into the same directory left behind, so the
/// bundle only ever reflects the current upload.
fn clear_previous_outputs(out: &Path, root: &str) -> Result<()> {
    let dir = out.join(root);
    for path in [
        dir.join(SUMMARY_TXT),
        dir.join(METRICS_TSV),
        dir.join(METRICS_JSON),
        out.join(format!("{}.zip", root)),
    ] {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", path.display()));
            }
        }
    }
    let figures = dir.join(FIGURES_DIR);
    if figures.is_dir() {
        fs::remove_dir_all(&figures)
            .with_context(|| format!("failed to remove {}", figures.display()))?;
    }
    Ok(())
}

/// Each non-empty input line names a file to upload. The dashboard always
/// reflects the latest upload; rejected files leave a warning, not an exit.
pub fn run_session<R: BufRead>(args: SessionArgs, input: R) -> Result<()> {
    let cfg = build_config(&args.analysis)?;
    let views = selected_views(&args.analysis);
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output dir {}", args.out.display()))?;
    let dashboard = args.out.join(DASHBOARD_HTML);

    let mut session = Session::new(cfg);
    report::html::write(&dashboard, session.state(), &views)?;
    info!(path = %dashboard.display(), "waiting for uploads on stdin");

    for line in input.lines() {
        let line = line.context("failed to read stdin")?;
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        let upload = match Upload::open(Path::new(path)) {
            Ok(u) => u,
            Err(e) => {
                error!("{:#}", e);
                continue;
            }
        };
        let t = Instant::now();
        let state = session.upload(upload.bytes(), upload.name());
        report::html::write(&dashboard, state, &views)?;
        if let SessionState::Loaded(out) = state {
            info!(file = %out.ctx.file_name, "dashboard updated");
        }
        log_stage("session.upload", t);
    }
    info!(uploads = session.uploads(), "session finished");
    Ok(())
}

use crate::core::engine::RunOutput;
use crate::report::View;
use crate::report::html;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

/// Writes every selected chart as `<name>.svg` and `<name>.pdf` under
/// `out_dir/figures` and returns the written paths.
pub fn write(out_dir: &Path, output: &RunOutput, views: &[View]) -> Result<Vec<PathBuf>> {
    let dir = out_dir.join("figures");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::new();
    for fig in html::figures(output)?
        .into_iter()
        .filter(|f| views.contains(&f.view))
    {
        let svg_path = dir.join(format!("{}.svg", fig.name));
        fs::write(&svg_path, &fig.svg)
            .with_context(|| format!("failed to write {}", svg_path.display()))?;
        let pdf =
            svg_to_pdf(&fig.svg).with_context(|| format!("failed to convert {} to PDF", fig.name))?;
        let pdf_path = dir.join(format!("{}.pdf", fig.name));
        fs::write(&pdf_path, pdf)
            .with_context(|| format!("failed to write {}", pdf_path.display()))?;
        written.push(svg_path);
        written.push(pdf_path);
    }
    Ok(written)
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|e| anyhow::anyhow!("usvg parse failed: {e}"))?;
    let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow::anyhow!("svg2pdf conversion failed: {e}"))?;
    Ok(pdf)
}

use crate::core::engine::RunOutput;
use crate::core::metrics::{
    Analysis, CategorySection, HistogramSection, SequenceAnalysis, TableAnalysis,
};
use crate::core::session::SessionState;
use crate::report::{View, escape, fmt_int, fmt_num, svg};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const PLOT_W: f64 = 720.0;
const PLOT_H: f64 = 300.0;
const MAX_CATEGORY_BARS: usize = 30;

/// A chart shown on the dashboard, also exportable as a standalone file.
pub struct Figure {
    pub name: &'static str,
    pub view: View,
    pub title: String,
    pub svg: String,
}

pub fn write(path: &Path, state: &SessionState, views: &[View]) -> Result<()> {
    let html = render(state, views)?;
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("create {} failed", path.display()))?,
    );
    w.write_all(html.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Renders whatever the session holds. Never fails on analysis errors: those
/// become a warning panel.
pub fn render(state: &SessionState, views: &[View]) -> Result<String> {
    let mut html = String::with_capacity(64 * 1024);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let title = match state {
        SessionState::Loaded(out) => out.ctx.sample_name.clone(),
        SessionState::Failed { file_name, .. } => file_name.clone(),
        SessionState::Empty => "no file".to_string(),
    };
    write_head(&mut html, &title)?;

    writeln!(html, "<h1>kira-biostats dashboard</h1>")?;
    match state {
        SessionState::Empty => {
            writeln!(
                html,
                "<div class=\"meta\">Timestamp: {}</div>",
                fmt_timestamp(ts)
            )?;
            writeln!(
                html,
                "<div class=\"placeholder\">No file loaded yet. Provide a FASTA file (.fasta, .fa, .fna, .faa) or a protein table (.csv, .tsv) to see its statistics.</div>"
            )?;
        }
        SessionState::Failed { file_name, error } => {
            writeln!(
                html,
                "<div class=\"meta\">File: {}<br/>Timestamp: {}</div>",
                escape(file_name),
                fmt_timestamp(ts)
            )?;
            writeln!(
                html,
                "<div class=\"warning\"><b>{}</b>: {}<br/>The file could not be analyzed. Upload a corrected file to continue.</div>",
                error.kind(),
                escape(&error.to_string())
            )?;
        }
        SessionState::Loaded(output) => {
            writeln!(
                html,
                "<div class=\"meta\">File: <b>{}</b><br/>Format: {}{}<br/>Size: {} bytes<br/>Timestamp: {} (unix: {})</div>",
                escape(&output.ctx.file_name),
                output.ctx.format.label(),
                if output.ctx.gzipped { " (gzip)" } else { "" },
                fmt_int(output.ctx.bytes as u64),
                fmt_timestamp(ts),
                ts
            )?;
            write_loaded(&mut html, output, views)?;
        }
    }

    html.push_str("<script>");
    html.push_str(r#"document.querySelectorAll('table.sortable').forEach(t=>{const h=t.querySelectorAll('th');h.forEach((th,i)=>{th.style.cursor='pointer';th.addEventListener('click',()=>{const rows=[...t.querySelectorAll('tr')].slice(1);const asc=th.getAttribute('data-asc')!=='true';rows.sort((a,b)=>{const av=a.children[i].innerText;const bv=b.children[i].innerText;const an=parseFloat(av);const bn=parseFloat(bv);if(!isNaN(an)&&!isNaN(bn)){return asc?an-bn:bn-an;}return asc?av.localeCompare(bv):bv.localeCompare(av);});th.setAttribute('data-asc',asc);rows.forEach(r=>t.appendChild(r));});});});"#);
    html.push_str("</script>");
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn write_head(html: &mut String, title: &str) -> Result<()> {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>kira-biostats: {}</title>", escape(title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, "h2{{margin:24px 0 8px 0;font-size:20px;}}")?;
    writeln!(
        html,
        ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}"
    )?;
    writeln!(
        html,
        ".cards{{display:flex;flex-wrap:wrap;gap:12px;margin:12px 0 20px 0;}}"
    )?;
    writeln!(
        html,
        ".card{{border:1px solid #ddd;border-radius:4px;padding:10px 16px;min-width:120px;background:#fafafa;}}"
    )?;
    writeln!(html, ".card .label{{color:#666;font-size:12px;}}")?;
    writeln!(html, ".card .value{{font-size:22px;font-weight:bold;}}")?;
    writeln!(
        html,
        ".warning{{border:1px solid #e6a400;background:#fff7e0;color:#6b4b00;padding:10px 14px;max-width:900px;}}"
    )?;
    writeln!(
        html,
        ".placeholder{{border:1px dashed #bbb;color:#666;padding:24px;max-width:900px;text-align:center;}}"
    )?;
    writeln!(
        html,
        ".module{{border-top:1px solid #eee;padding-top:8px;}}"
    )?;
    writeln!(html, ".plot{{margin:8px 0 6px 0;}}")?;
    writeln!(
        html,
        ".desc{{color:#444;font-size:13px;max-width:1000px;margin:4px 0 10px 0;}}"
    )?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;width:100%;max-width:1000px;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;}}"
    )?;
    writeln!(
        html,
        ".table th:first-child,.table td:first-child{{text-align:left;}}"
    )?;
    writeln!(html, "details{{margin:6px 0 18px 0;}}")?;
    writeln!(html, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    Ok(())
}

fn write_loaded(html: &mut String, output: &RunOutput, views: &[View]) -> Result<()> {
    let figures = figures(output)?;
    match &output.analysis {
        Analysis::Sequences(seq) => {
            sequence_cards(html, seq)?;
            for view in View::ALL.iter().filter(|v| views.contains(*v)) {
                match view {
                    View::Table => module_sequence_table(html, seq)?,
                    View::Composition => module_figure(
                        html,
                        &figures,
                        "gc_at_content",
                        "Share of residues that are G/C versus A/T, pooled over all sequences.",
                    )?,
                    View::Lengths => module_figure(
                        html,
                        &figures,
                        "sequence_lengths",
                        "Distribution of sequence lengths across the file.",
                    )?,
                    View::Categories | View::Histogram => {}
                }
            }
        }
        Analysis::Table(table) => {
            table_cards(html, table)?;
            for view in View::ALL.iter().filter(|v| views.contains(*v)) {
                match view {
                    View::Table => module_table_preview(html, table)?,
                    View::Categories => module_categories(html, table, &figures)?,
                    View::Histogram => module_histogram(html, table, &figures)?,
                    View::Composition | View::Lengths => {}
                }
            }
        }
    }
    Ok(())
}

fn card(out: &mut String, label: &str, value: &str) -> Result<()> {
    writeln!(
        out,
        "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        escape(label),
        value
    )?;
    Ok(())
}

fn sequence_cards(out: &mut String, seq: &SequenceAnalysis) -> Result<()> {
    let s = &seq.summary;
    writeln!(out, "<div class=\"cards\">")?;
    card(out, "Sequences", &fmt_int(s.sequences))?;
    card(out, "Mean length", &format!("{:.1}", s.mean_len))?;
    card(out, "Min length", &fmt_int(s.min_len))?;
    card(out, "Max length", &fmt_int(s.max_len))?;
    card(out, "GC %", &format!("{:.2}", s.gc_ratio * 100.0))?;
    writeln!(out, "</div>")?;
    Ok(())
}

fn table_cards(out: &mut String, table: &TableAnalysis) -> Result<()> {
    writeln!(out, "<div class=\"cards\">")?;
    card(out, "Rows", &fmt_int(table.rows))?;
    card(out, "Columns", &fmt_int(table.headers.len() as u64))?;
    if let Some(h) = &table.histogram {
        card(out, &format!("Mean {}", h.column), &fmt_num(h.stats.mean))?;
        card(out, &format!("Min {}", h.column), &fmt_num(h.stats.min))?;
        card(out, &format!("Max {}", h.column), &fmt_num(h.stats.max))?;
    }
    writeln!(out, "</div>")?;
    Ok(())
}

fn module_header(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "<div class=\"module\">")?;
    writeln!(out, "<h2>{}</h2>", escape(title))?;
    Ok(())
}

fn module_desc(out: &mut String, text: &str) -> Result<()> {
    writeln!(out, "<p class=\"desc\">{}</p>", text)?;
    Ok(())
}

fn module_footer(out: &mut String) -> Result<()> {
    writeln!(out, "</div>")?;
    Ok(())
}

fn module_figure(out: &mut String, figures: &[Figure], name: &str, desc: &str) -> Result<()> {
    let Some(fig) = figures.iter().find(|f| f.name == name) else {
        return Ok(());
    };
    module_header(out, &fig.title)?;
    module_desc(out, desc)?;
    writeln!(out, "<div class=\"plot\">{}</div>", fig.svg)?;
    module_footer(out)
}

fn module_sequence_table(out: &mut String, seq: &SequenceAnalysis) -> Result<()> {
    module_header(out, "Sequence indicators")?;
    module_desc(
        out,
        "Length and nucleotide composition of each sequence. Click a column header to sort.",
    )?;
    writeln!(out, "<table class=\"table sortable\">")?;
    writeln!(
        out,
        "<tr><th>Sequence</th><th>Length</th><th>GC %</th><th>AT %</th><th>GC ratio</th><th>AT ratio</th></tr>"
    )?;
    for row in &seq.rows {
        let m = &row.metrics;
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.4}</td><td>{:.4}</td></tr>",
            escape(&row.id),
            m.length,
            m.gc_content(),
            m.at_content(),
            m.gc_ratio,
            m.at_ratio
        )?;
    }
    writeln!(out, "</table>")?;
    if !seq.skipped.is_empty() {
        module_desc(
            out,
            &format!(
                "Skipped {} record(s) without residues: {}",
                seq.skipped.len(),
                escape(&seq.skipped.join(", "))
            ),
        )?;
    }
    module_footer(out)
}

fn module_table_preview(out: &mut String, table: &TableAnalysis) -> Result<()> {
    module_header(out, "Data preview")?;
    module_desc(
        out,
        &format!(
            "First {} of {} rows.",
            table.preview.len(),
            fmt_int(table.rows)
        ),
    )?;
    writeln!(out, "<table class=\"table sortable\">")?;
    write!(out, "<tr>")?;
    for h in &table.headers {
        write!(out, "<th>{}</th>", escape(h))?;
    }
    writeln!(out, "</tr>")?;
    for row in &table.preview {
        write!(out, "<tr>")?;
        for cell in row {
            write!(out, "<td>{}</td>", escape(cell))?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Numeric columns</h2>")?;
    if table.numeric.is_empty() {
        module_desc(out, "No numeric columns found.")?;
    } else {
        writeln!(out, "<table class=\"table\">")?;
        writeln!(
            out,
            "<tr><th>Column</th><th>Values</th><th>Mean</th><th>Min</th><th>Max</th></tr>"
        )?;
        for n in &table.numeric {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&n.column),
                fmt_int(n.stats.count),
                fmt_num(n.stats.mean),
                fmt_num(n.stats.min),
                fmt_num(n.stats.max)
            )?;
        }
        writeln!(out, "</table>")?;
    }
    module_footer(out)
}

fn module_categories(out: &mut String, table: &TableAnalysis, figures: &[Figure]) -> Result<()> {
    let Some(CategorySection { column, counts }) = &table.category else {
        module_header(out, "Categories")?;
        module_desc(out, "No categorical column matched the configured rule.")?;
        return module_footer(out);
    };
    module_header(out, &format!("Counts by {}", column))?;
    if counts.len() > MAX_CATEGORY_BARS {
        module_desc(
            out,
            &format!(
                "{} distinct values; the chart shows the {} most frequent.",
                counts.len(),
                MAX_CATEGORY_BARS
            ),
        )?;
    }
    if let Some(fig) = figures.iter().find(|f| f.name == "category_counts") {
        writeln!(out, "<div class=\"plot\">{}</div>", fig.svg)?;
    }
    writeln!(out, "<details><summary>Table</summary>")?;
    writeln!(out, "<table class=\"table sortable\">")?;
    writeln!(out, "<tr><th>{}</th><th>Count</th></tr>", escape(column))?;
    for c in counts {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&c.category),
            c.count
        )?;
    }
    writeln!(out, "</table></details>")?;
    module_footer(out)
}

fn module_histogram(out: &mut String, table: &TableAnalysis, figures: &[Figure]) -> Result<()> {
    let Some(HistogramSection { column, stats, .. }) = &table.histogram else {
        module_header(out, "Histogram")?;
        module_desc(out, "No numeric column to plot.")?;
        return module_footer(out);
    };
    module_header(out, &format!("Distribution of {}", column))?;
    module_desc(
        out,
        &format!(
            "{} values, mean {}, range {} to {}.",
            fmt_int(stats.count),
            fmt_num(stats.mean),
            fmt_num(stats.min),
            fmt_num(stats.max)
        ),
    )?;
    if let Some(fig) = figures.iter().find(|f| f.name == "column_histogram") {
        writeln!(out, "<div class=\"plot\">{}</div>", fig.svg)?;
    }
    module_footer(out)
}

/// Every chart the analysis can show, independent of the selected views.
pub fn figures(output: &RunOutput) -> Result<Vec<Figure>> {
    let mut figs = Vec::new();
    match &output.analysis {
        Analysis::Sequences(seq) => {
            let s = &seq.summary;
            let mut bars = vec![
                ("GC".to_string(), s.gc_ratio * 100.0),
                ("AT".to_string(), s.at_ratio * 100.0),
            ];
            let other = (1.0 - s.gc_ratio - s.at_ratio) * 100.0;
            if other > 1e-9 {
                bars.push(("Other".to_string(), other));
            }
            figs.push(Figure {
                name: "gc_at_content",
                view: View::Composition,
                title: "GC and AT content".to_string(),
                svg: svg::bar_chart(&bars, PLOT_W, PLOT_H, "Nucleotide group", "Percent")?,
            });
            figs.push(Figure {
                name: "sequence_lengths",
                view: View::Lengths,
                title: "Sequence length".to_string(),
                svg: svg::histogram(&seq.length_histogram, PLOT_W, PLOT_H, "Length", "Sequences")?,
            });
        }
        Analysis::Table(table) => {
            if let Some(cat) = &table.category {
                let bars: Vec<(String, f64)> = cat
                    .counts
                    .iter()
                    .take(MAX_CATEGORY_BARS)
                    .map(|c| (c.category.clone(), c.count as f64))
                    .collect();
                figs.push(Figure {
                    name: "category_counts",
                    view: View::Categories,
                    title: format!("Counts by {}", cat.column),
                    svg: svg::bar_chart(&bars, PLOT_W, PLOT_H, &cat.column, "Rows")?,
                });
            }
            if let Some(h) = &table.histogram {
                figs.push(Figure {
                    name: "column_histogram",
                    view: View::Histogram,
                    title: format!("Distribution of {}", h.column),
                    svg: svg::histogram(&h.histogram, PLOT_W, PLOT_H, &h.column, "Rows")?,
                });
            }
        }
    }
    Ok(figs)
}

fn fmt_timestamp(ts: u64) -> String {
    let days = (ts / 86_400) as i64;
    let secs = (ts % 86_400) as u32;
    let hour = secs / 3_600;
    let min = (secs % 3_600) / 60;
    let sec = secs % 60;

    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if m <= 2 { 1 } else { 0 };

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, m, d, hour, min, sec
    )
}

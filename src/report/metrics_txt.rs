use crate::core::engine::RunOutput;
use crate::core::metrics::{Analysis, Histogram, SequenceAnalysis, TableAnalysis};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write(path: &Path, output: &RunOutput) -> Result<()> {
    let mut w = BufWriter::new(File::create(path).with_context(|| "create metrics.tsv failed")?);
    write_to(&mut w, output)?;
    w.flush()?;
    Ok(())
}

/// Every dashboard table as `>>Section` blocks of tab-separated rows.
pub fn write_to(w: &mut dyn Write, output: &RunOutput) -> Result<()> {
    writeln!(w, "##kira-biostats\t{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, ">>Basic Statistics")?;
    writeln!(w, "#Measure\tValue")?;
    writeln!(w, "Filename\t{}", field(&output.ctx.file_name))?;
    writeln!(w, "File type\t{}", output.ctx.format.label())?;
    writeln!(w, "Compressed\t{}", output.ctx.gzipped)?;
    writeln!(w, "Bytes\t{}", output.ctx.bytes)?;
    writeln!(w, ">>END_MODULE")?;
    match &output.analysis {
        Analysis::Sequences(seq) => {
            write_sequences(w, seq)?;
            write_histogram(w, "Sequence Length Distribution", "Length", &seq.length_histogram)?;
        }
        Analysis::Table(table) => write_table(w, table)?,
    }
    Ok(())
}

fn write_sequences(w: &mut dyn Write, seq: &SequenceAnalysis) -> Result<()> {
    writeln!(w, ">>Sequence Indicators")?;
    writeln!(w, "#Sequence\tLength\tGC Content\tAT Content\tGC Ratio\tAT Ratio")?;
    for row in &seq.rows {
        let m = &row.metrics;
        writeln!(
            w,
            "{}\t{}\t{:.4}\t{:.4}\t{:.6}\t{:.6}",
            field(&row.id),
            m.length,
            m.gc_content(),
            m.at_content(),
            m.gc_ratio,
            m.at_ratio
        )?;
    }
    writeln!(w, ">>END_MODULE")?;
    Ok(())
}

fn write_table(w: &mut dyn Write, table: &TableAnalysis) -> Result<()> {
    writeln!(w, ">>Numeric Columns")?;
    writeln!(w, "#Column\tCount\tMean\tMin\tMax")?;
    for n in &table.numeric {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            field(&n.column),
            n.stats.count, n.stats.mean, n.stats.min, n.stats.max
        )?;
    }
    writeln!(w, ">>END_MODULE")?;

    if let Some(cat) = &table.category {
        writeln!(w, ">>Category Counts\t{}", field(&cat.column))?;
        writeln!(w, "#Category\tCount")?;
        for c in &cat.counts {
            writeln!(w, "{}\t{}", field(&c.category), c.count)?;
        }
        writeln!(w, ">>END_MODULE")?;
    }

    if let Some(h) = &table.histogram {
        let column = field(&h.column);
        write_histogram(w, &format!("Distribution\t{}", column), &column, &h.histogram)?;
    }
    Ok(())
}

/// Free text never carries a tab into a row.
fn field(s: &str) -> Cow<'_, str> {
    if s.contains('\t') {
        Cow::Owned(s.replace('\t', " "))
    } else {
        Cow::Borrowed(s)
    }
}

fn write_histogram(w: &mut dyn Write, title: &str, label: &str, hist: &Histogram) -> Result<()> {
    writeln!(w, ">>{}", title)?;
    writeln!(w, "#{} From\t{} To\tCount", label, label)?;
    for bin in &hist.bins {
        writeln!(w, "{}\t{}\t{}", bin.lo, bin.hi, bin.count)?;
    }
    writeln!(w, ">>END_MODULE")?;
    Ok(())
}

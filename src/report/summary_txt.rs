use crate::core::engine::RunOutput;
use crate::core::metrics::Analysis;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write(path: &Path, output: &RunOutput) -> Result<()> {
    let mut w = BufWriter::new(File::create(path).with_context(|| "create summary.txt failed")?);
    write_to(&mut w, output)?;
    w.flush()?;
    Ok(())
}

/// One `key<TAB>value` line per headline number.
pub fn write_to(w: &mut dyn Write, output: &RunOutput) -> Result<()> {
    writeln!(w, "File\t{}", output.ctx.file_name)?;
    writeln!(w, "Format\t{}", output.ctx.format.label())?;
    match &output.analysis {
        Analysis::Sequences(seq) => {
            let s = &seq.summary;
            writeln!(w, "Sequences\t{}", s.sequences)?;
            writeln!(w, "Skipped empty sequences\t{}", s.skipped_empty)?;
            writeln!(w, "Total residues\t{}", s.total_residues)?;
            if s.min_len == s.max_len {
                writeln!(w, "Sequence length\t{}", s.min_len)?;
            } else {
                writeln!(w, "Sequence length\t{}-{}", s.min_len, s.max_len)?;
            }
            writeln!(w, "Mean length\t{:.2}", s.mean_len)?;
            writeln!(w, "%GC\t{:.2}", s.gc_ratio * 100.0)?;
            writeln!(w, "%AT\t{:.2}", s.at_ratio * 100.0)?;
        }
        Analysis::Table(table) => {
            writeln!(w, "Rows\t{}", table.rows)?;
            writeln!(w, "Columns\t{}", table.headers.len())?;
            writeln!(w, "Numeric columns\t{}", table.numeric.len())?;
            match &table.category {
                Some(c) => {
                    writeln!(w, "Category column\t{}", c.column)?;
                    writeln!(w, "Distinct categories\t{}", c.counts.len())?;
                }
                None => writeln!(w, "Category column\t-")?,
            }
            if let Some(h) = &table.histogram {
                writeln!(w, "Histogram column\t{}", h.column)?;
                writeln!(w, "Mean\t{}", h.stats.mean)?;
                writeln!(w, "Min\t{}", h.stats.min)?;
                writeln!(w, "Max\t{}", h.stats.max)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnalysisConfig;
    use crate::core::engine;
    use pretty_assertions::assert_eq;

    #[test]
    fn fasta_summary_lines() {
        let out = engine::run(b">a\nGATTACA\n>b\nGC\n", "x.fa", &AnalysisConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_to(&mut buf, &out).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "File\tx.fa\n\
             Format\tFASTA sequences\n\
             Sequences\t2\n\
             Skipped empty sequences\t0\n\
             Total residues\t9\n\
             Sequence length\t2-7\n\
             Mean length\t4.50\n\
             %GC\t44.44\n\
             %AT\t55.56\n"
        );
    }

    #[test]
    fn table_summary_lines() {
        let out = engine::run(b"w,type\n10,a\n30,b\n", "t.csv", &AnalysisConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_to(&mut buf, &out).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Category column\ttype\n"));
        assert!(text.contains("Histogram column\tw\nMean\t20\nMin\t10\nMax\t30\n"));
    }
}

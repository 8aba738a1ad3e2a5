use crate::core::engine::RunOutput;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write(path: &Path, output: &RunOutput) -> Result<()> {
    let mut w = BufWriter::new(File::create(path).with_context(|| "create metrics.json failed")?);
    serde_json::to_writer_pretty(&mut w, output).context("failed to serialize metrics")?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnalysisConfig;
    use crate::core::engine;
    use serde_json::Value;

    #[test]
    fn json_has_tagged_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let out = engine::run(b">a\nGATTACA\n", "x.fa", &AnalysisConfig::default()).unwrap();
        write(&path, &out).unwrap();
        let v: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["ctx"]["format"], "fasta");
        assert_eq!(v["analysis"]["kind"], "sequences");
        assert_eq!(v["analysis"]["rows"][0]["id"], "a");
        assert_eq!(v["analysis"]["rows"][0]["length"], 7);
    }
}

use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::fasta;
use crate::core::io::{extension, gunzip, is_gzip, strip_gz_suffix};
use crate::core::model::{DataFormat, ParsedData};
use crate::core::table;
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ingested {
    pub format: DataFormat,
    pub gzipped: bool,
    pub data: ParsedData,
}

/// Parses one uploaded byte stream, choosing the format from the declared
/// name and falling back to the content.
pub fn ingest(bytes: &[u8], declared_name: &str) -> AnalysisResult<Ingested> {
    let (name, gz_name) = strip_gz_suffix(declared_name);
    let gzipped = gz_name || is_gzip(bytes);
    let payload: Cow<'_, [u8]> = if gzipped {
        Cow::Owned(
            gunzip(bytes)
                .map_err(|e| AnalysisError::format(format!("gzip decompression failed: {e}")))?,
        )
    } else {
        Cow::Borrowed(bytes)
    };

    let text = decode_utf8(&payload)?;
    let format = match extension(name).and_then(DataFormat::from_extension) {
        Some(f) => f,
        None => sniff_format(text)?,
    };

    let data = match format.delimiter() {
        None => ParsedData::Sequences(fasta::parse(text)?),
        Some(delimiter) => ParsedData::Table(table::parse(text, delimiter)?),
    };
    Ok(Ingested {
        format,
        gzipped,
        data,
    })
}

fn decode_utf8(bytes: &[u8]) -> AnalysisResult<&str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| {
        AnalysisError::format(format!(
            "input is not valid UTF-8 (byte offset {})",
            e.valid_up_to()
        ))
    })
}

fn sniff_format(text: &str) -> AnalysisResult<DataFormat> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty());
    match first {
        Some(line) if line.starts_with('>') => Ok(DataFormat::Fasta),
        Some(line) if line.contains('\t') => Ok(DataFormat::Tsv),
        Some(line) if line.contains(',') => Ok(DataFormat::Csv),
        _ => Err(AnalysisError::format(
            "unrecognized format: expected FASTA or a delimited table",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SequenceRecord;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FASTA: &[u8] = b">s1\nGATTACA\n>s2\nGGCC\n";

    #[test]
    fn fasta_by_extension() {
        let out = ingest(FASTA, "reads.FASTA").unwrap();
        assert_eq!(out.format, DataFormat::Fasta);
        assert!(!out.gzipped);
        let ParsedData::Sequences(records) = out.data else {
            panic!("expected sequences");
        };
        assert_eq!(
            records[0],
            SequenceRecord {
                id: "s1".to_string(),
                residues: "GATTACA".to_string()
            }
        );
    }

    #[test]
    fn empty_stream_as_fasta_is_format_error() {
        let err = ingest(b"", "empty.fasta").unwrap_err();
        assert!(matches!(err, AnalysisError::Format(_)));
        assert_eq!(err.kind(), "FormatError");
    }

    #[test]
    fn gzipped_fasta_matches_plain() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(FASTA).unwrap();
        let gz = enc.finish().unwrap();
        let plain = ingest(FASTA, "x.fa").unwrap();
        let packed = ingest(&gz, "x.fa.gz").unwrap();
        assert!(packed.gzipped);
        assert_eq!(plain.data, packed.data);
        // magic bytes alone are enough
        assert_eq!(ingest(&gz, "x.fa").unwrap().data, plain.data);
    }

    #[test]
    fn corrupt_gzip_is_format_error() {
        let err = ingest(&[0x1f, 0x8b, 0, 1, 2], "x.fa").unwrap_err();
        assert!(err.to_string().contains("gzip decompression failed"));
    }

    #[test]
    fn tables_by_extension() {
        let csv = ingest(b"a,b\n1,2\n", "p.csv").unwrap();
        assert_eq!(csv.format, DataFormat::Csv);
        let tsv = ingest(b"a\tb\n1\t2\n", "p.tsv").unwrap();
        assert_eq!(tsv.format, DataFormat::Tsv);
        let ParsedData::Table(t) = tsv.data else {
            panic!("expected table");
        };
        assert_eq!(t.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn unknown_extension_sniffs_content() {
        assert_eq!(ingest(b"\n>x\nAC\n", "upload.txt").unwrap().format, DataFormat::Fasta);
        assert_eq!(ingest(b"a\tb\n1\t2\n", "upload").unwrap().format, DataFormat::Tsv);
        assert_eq!(ingest(b"a,b\n1,2\n", "upload.dat").unwrap().format, DataFormat::Csv);
        assert!(matches!(
            ingest(b"hello world\n", "upload.txt"),
            Err(AnalysisError::Format(_))
        ));
    }

    #[test]
    fn bom_is_dropped_and_invalid_utf8_rejected() {
        let out = ingest(b"\xEF\xBB\xBFname,v\nx,1\n", "t.csv").unwrap();
        let ParsedData::Table(t) = out.data else {
            panic!("expected table");
        };
        assert_eq!(t.headers, vec!["name", "v"]);
        let err = ingest(b">a\n\xFF\xFE\n", "x.fasta").unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn malformed_table_is_format_error() {
        assert!(matches!(
            ingest(b"a,b\n1,2,3\n", "p.csv"),
            Err(AnalysisError::Format(_))
        ));
    }
}

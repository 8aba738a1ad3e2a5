use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::model::Table;
use csv::{ErrorKind, ReaderBuilder, Trim};

/// Parses delimited text with a header row into a rectangular [`Table`].
pub fn parse(text: &str, delimiter: u8) -> AnalysisResult<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header_record = reader.headers().map_err(csv_error)?.clone();
    if header_record.is_empty() {
        return Err(AnalysisError::format("missing header row"));
    }
    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("column_{}", i + 1)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    Ok(Table { headers, rows })
}

fn csv_error(err: csv::Error) -> AnalysisError {
    match err.kind() {
        ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
            AnalysisError::format(format!(
                "malformed row at line {}: {} fields, expected {}",
                line, len, expected_len
            ))
        }
        ErrorKind::Utf8 { pos, .. } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
            AnalysisError::format(format!("invalid UTF-8 at line {}", line))
        }
        _ => AnalysisError::format(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_csv_with_header() {
        let table = parse("name,weight,type\nA, 10 ,enzyme\nB,20,receptor\n", b',').unwrap();
        assert_eq!(table.headers, vec!["name", "weight", "type"]);
        assert_eq!(
            table.rows,
            vec![vec!["A", "10", "enzyme"], vec!["B", "20", "receptor"]]
        );
        assert_eq!(table.column_index("weight"), Some(1));
        assert_eq!(table.column(2).collect::<Vec<_>>(), vec!["enzyme", "receptor"]);
    }

    #[test]
    fn parses_tsv_and_quoted_fields() {
        let table = parse("id\tnote\n1\t\"a, b\"\n", b'\t').unwrap();
        assert_eq!(table.rows, vec![vec!["1", "a, b"]]);
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = parse("a,b\n", b',').unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn blank_headers_are_named() {
        let table = parse(",x\n1,2\n", b',').unwrap();
        assert_eq!(table.headers, vec!["column_1", "x"]);
    }

    #[test]
    fn inconsistent_row_is_format_error() {
        let err = parse("a,b\n1,2\n3\n", b',').unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Format("malformed row at line 3: 1 fields, expected 2".to_string())
        );
    }

    #[test]
    fn empty_text_is_format_error() {
        assert_eq!(
            parse("", b',').unwrap_err(),
            AnalysisError::Format("missing header row".to_string())
        );
    }
}

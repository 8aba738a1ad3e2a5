use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::model::SequenceRecord;
use memchr::memchr;
use std::collections::HashSet;

const HEADER_MARKER: u8 = b'>';
const COMMENT_MARKER: u8 = b';';

/// Line iterator over decoded text. Yields 1-based line numbers and strips a
/// trailing `\r`.
pub struct Lines<'a> {
    text: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line_no: 0,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text.as_bytes()[self.pos..];
        let end = match memchr(b'\n', rest) {
            Some(i) => self.pos + i,
            None => self.text.len(),
        };
        let line = &self.text[self.pos..end];
        self.pos = end + 1;
        self.line_no += 1;
        Some((self.line_no, line.strip_suffix('\r').unwrap_or(line)))
    }
}

/// Parses FASTA text into records in file order.
///
/// Residue lines are concatenated with all whitespace removed. Blank lines
/// and `;` comments are skipped.
pub fn parse(text: &str) -> AnalysisResult<Vec<SequenceRecord>> {
    let mut records: Vec<SequenceRecord> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (line_no, line) in Lines::new(text) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.as_bytes()[0] {
            HEADER_MARKER => {
                let id = trimmed[1..].trim();
                if id.is_empty() {
                    return Err(AnalysisError::format(format!(
                        "empty FASTA header at line {}",
                        line_no
                    )));
                }
                if !seen.insert(id) {
                    return Err(AnalysisError::format(format!(
                        "duplicate sequence identifier '{}' at line {}",
                        id, line_no
                    )));
                }
                records.push(SequenceRecord {
                    id: id.to_string(),
                    residues: String::new(),
                });
            }
            COMMENT_MARKER => continue,
            _ => {
                let Some(current) = records.last_mut() else {
                    return Err(AnalysisError::format(format!(
                        "expected a '>' header before sequence data at line {}",
                        line_no
                    )));
                };
                current
                    .residues
                    .extend(trimmed.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    if records.is_empty() {
        return Err(AnalysisError::format("no FASTA header ('>') found"));
    }
    Ok(records)
}

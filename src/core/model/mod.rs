use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Fasta,
    Csv,
    Tsv,
}

impl DataFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "fasta" | "fa" | "fas" | "fna" | "ffn" | "faa" | "frn" | "mpfa" => {
                Some(DataFormat::Fasta)
            }
            "csv" => Some(DataFormat::Csv),
            "tsv" | "tab" => Some(DataFormat::Tsv),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataFormat::Fasta => "FASTA sequences",
            DataFormat::Csv => "Comma-separated table",
            DataFormat::Tsv => "Tab-separated table",
        }
    }

    pub fn delimiter(self) -> Option<u8> {
        match self {
            DataFormat::Fasta => None,
            DataFormat::Csv => Some(b','),
            DataFormat::Tsv => Some(b'\t'),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SequenceRecord {
    pub id: String,
    pub residues: String,
}

/// Rectangular record set. Every row has exactly `headers.len()` cells.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedData {
    Sequences(Vec<SequenceRecord>),
    Table(Table),
}

/// What the ingestor knows about one upload besides its parsed content.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UploadContext {
    pub file_name: String,
    pub sample_name: String,
    pub format: DataFormat,
    pub gzipped: bool,
    pub bytes: usize,
}

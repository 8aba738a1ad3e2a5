use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_BINS: usize = 20;
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Which residue symbols count towards GC/AT.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasePolicy {
    /// Only uppercase `G`, `C`, `A`, `T` are counted.
    #[default]
    Exact,
    /// Lowercase (soft-masked) residues are counted too.
    Insensitive,
}

/// Rule for picking the categorical column of a table.
///
/// An explicit `column` wins; otherwise the first header containing
/// `keyword` is used. Unless `case_sensitive` is set, both sides are
/// lowercased (full Unicode folding) before matching.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMatcher {
    pub keyword: String,
    pub case_sensitive: bool,
    pub column: Option<String>,
}

impl Default for ColumnMatcher {
    fn default() -> Self {
        Self {
            keyword: "type".to_string(),
            case_sensitive: false,
            column: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub case_policy: CasePolicy,
    pub category: ColumnMatcher,
    pub histogram_column: Option<String>,
    pub bins: usize,
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            case_policy: CasePolicy::Exact,
            category: ColumnMatcher::default(),
            histogram_column: None,
            bins: DEFAULT_BINS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(s).context("invalid analysis config")?;
        if cfg.bins == 0 {
            anyhow::bail!("bins must be >= 1");
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

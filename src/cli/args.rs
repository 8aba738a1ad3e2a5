use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kira-biostats",
    version,
    about = "Summary statistics dashboard for FASTA files and protein tables"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). KIRA_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one file and write its dashboard.
    Report(ReportArgs),
    /// Read one file path per stdin line and re-render the dashboard after each.
    Session(SessionArgs),
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Input file, or `-` for stdin.
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Declared file name used for format detection (required with stdin).
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub sample_name: Option<String>,

    #[arg(long, default_value_t = false)]
    pub no_zip: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also write each chart as SVG and PDF.
    #[arg(long, default_value_t = false)]
    pub export_figures: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Parser)]
pub struct SessionArgs {
    #[arg(long)]
    pub out: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Args)]
pub struct AnalysisArgs {
    /// TOML file with analysis defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Count lowercase residues towards GC/AT.
    #[arg(long, default_value_t = false)]
    pub case_insensitive: bool,

    /// Substring that selects the categorical column.
    #[arg(long)]
    pub category_keyword: Option<String>,

    /// Match the category keyword case-sensitively.
    #[arg(long, default_value_t = false)]
    pub category_case_sensitive: bool,

    /// Exact categorical column name; overrides the keyword.
    #[arg(long)]
    pub category_column: Option<String>,

    /// Numeric column to plot as a histogram.
    #[arg(long)]
    pub histogram_column: Option<String>,

    #[arg(long)]
    pub bins: Option<usize>,

    /// Dashboard panels to show; repeat or comma-separate. Defaults to all.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub view: Vec<ViewArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ViewArg {
    #[value(name = "table")]
    Table,
    #[value(name = "composition")]
    Composition,
    #[value(name = "lengths")]
    Lengths,
    #[value(name = "categories")]
    Categories,
    #[value(name = "histogram")]
    Histogram,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_with_views() {
        let cli = Cli::try_parse_from([
            "kira-biostats",
            "-v",
            "report",
            "p.csv",
            "--out",
            "out",
            "--view",
            "table,categories",
            "--category-column",
            "Family",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.analysis.view.len(), 2);
        assert_eq!(args.analysis.category_column.as_deref(), Some("Family"));
        assert!(!args.no_zip);
    }
}

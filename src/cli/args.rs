use crate::report::svg::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_X_LABEL, DEFAULT_Y_LABEL};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "latency-boxplot",
    version,
    about = "Box-and-whisker plot of percentile latencies from a CSV file"
)]
pub struct Cli {
    /// CSV rows of `label, min, p25, median, p75, max` (may be gzip-compressed)
    pub input: PathBuf,

    /// HTML page to write (defaults to the input path with an .html extension)
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long)]
    pub svg: Option<PathBuf>,

    #[arg(long)]
    pub pdf: Option<PathBuf>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, default_value = DEFAULT_X_LABEL)]
    pub x_label: String,

    #[arg(long, default_value = DEFAULT_Y_LABEL)]
    pub y_label: String,

    #[arg(long, value_enum, default_value_t = SortArg::Input)]
    pub sort_by: SortArg,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: f64,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: f64,

    /// Treat the first row as a header and skip it
    #[arg(long, default_value_t = false)]
    pub header: bool,

    /// Write the outputs without launching a viewer
    #[arg(long, default_value_t = false)]
    pub no_open: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    #[value(name = "input")]
    Input,
    #[value(name = "label")]
    Label,
    #[value(name = "median")]
    Median,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn single_positional_uses_defaults() {
        let cli = Cli::try_parse_from(["latency-boxplot", "runs.csv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("runs.csv"));
        assert!(cli.out.is_none());
        assert_eq!(cli.x_label, "Test Run");
        assert_eq!(cli.y_label, "Latency in Milliseconds");
        assert!(matches!(cli.sort_by, SortArg::Input));
        assert_eq!(cli.width, 900.0);
        assert!(!cli.header);
        assert!(!cli.no_open);
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["latency-boxplot"]).is_err());
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "latency-boxplot",
            "runs.csv.gz",
            "--sort-by",
            "median",
            "--pdf",
            "plot.pdf",
            "--no-open",
            "--title",
            "Redis queues",
        ])
        .unwrap();
        assert!(matches!(cli.sort_by, SortArg::Median));
        assert_eq!(cli.pdf, Some(PathBuf::from("plot.pdf")));
        assert!(cli.no_open);
        assert_eq!(cli.title.as_deref(), Some("Redis queues"));
    }
}

use clap::Parser;

use crate::data::loader::DEFAULT_SOURCE;
use crate::ui::charts::ChartStyle;

#[derive(Parser, Debug)]
#[command(name = "penguin-dash", version, about = "Mini penguins dashboard")]
pub struct Cli {
    #[arg(long, default_value = DEFAULT_SOURCE, help = "Dataset URL or path (.csv or .json)")]
    pub source: String,

    #[arg(long, value_enum, default_value_t = ChartStyle::Interactive, help = "Chart backend")]
    pub charts: ChartStyle,

    #[arg(long, default_value_t = 30, help = "HTTP timeout for remote sources, in seconds")]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["penguin-dash"]);
        assert_eq!(cli.source, DEFAULT_SOURCE);
        assert_eq!(cli.charts, ChartStyle::Interactive);
        assert_eq!(cli.timeout_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "penguin-dash",
            "--source",
            "data/penguins.json",
            "--charts",
            "none",
            "--timeout-secs",
            "5",
        ]);
        assert_eq!(cli.source, "data/penguins.json");
        assert_eq!(cli.charts, ChartStyle::None);
        assert_eq!(cli.timeout_secs, 5);
    }
}

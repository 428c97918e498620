use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_DATA_PATH: &str = "Cleaned_Bird_Observation_Data.csv";

/// Command line options. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bird-dashboard",
    version,
    about = "Interactive dashboard for bird observation records"
)]
pub struct Args {
    /// Observation table to load (.csv, .json or .parquet).
    #[arg(short, long, env = "BIRD_DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Rows shown in the filtered records preview.
    #[arg(long, env = "BIRD_DASHBOARD_PREVIEW_ROWS", default_value_t = 50)]
    pub preview_rows: usize,

    /// Write the unfiltered dashboard as JSON to this path and exit.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["bird-dashboard"]).unwrap();
        if std::env::var_os("BIRD_DASHBOARD_DATA").is_none() {
            assert_eq!(args.data, PathBuf::from(DEFAULT_DATA_PATH));
        }
        assert!(args.export.is_none());
    }

    #[test]
    fn explicit_flags() {
        let args = Args::try_parse_from([
            "bird-dashboard",
            "--data",
            "birds.parquet",
            "--preview-rows",
            "10",
            "--export",
            "out.json",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("birds.parquet"));
        assert_eq!(args.preview_rows, 10);
        assert_eq!(args.export, Some(PathBuf::from("out.json")));
    }
}

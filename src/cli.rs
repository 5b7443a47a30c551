//! Module describing all possible commands and sub-commands to the `terremoto` main driver
//!
//! - `run` is the daemon: it waits for the daily alert time, forever
//! - `check` runs a single cycle right now, `--dry-run` prints instead of sending
//! - `distance` and `sites` are small helpers that need no configuration
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};

/// CLI options
#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file (HCL).
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Use hierarchical logging output.
    #[clap(long = "tree")]
    pub use_tree: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `run`
/// `check [--dry-run]`
/// `distance LAT1 LON1 LAT2 LON2`
/// `sites`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Send the alert every day at the configured time
    Run,
    /// Run one alert cycle now
    Check(CheckOpts),
    /// Great-circle distance in km between two points
    Distance(DistanceOpts),
    /// List all known feeds
    Sites,
    /// List all package versions
    Version,
}

// ------

/// Options for a one-shot check.
///
#[derive(Debug, Parser)]
pub struct CheckOpts {
    /// Print the message instead of sending it.
    #[clap(short = 'n', long)]
    pub dry_run: bool,
}

// ------

/// Two points, in degrees.
///
#[derive(Debug, Parser)]
pub struct DistanceOpts {
    #[clap(allow_negative_numbers = true)]
    pub lat1: f64,
    #[clap(allow_negative_numbers = true)]
    pub lon1: f64,
    #[clap(allow_negative_numbers = true)]
    pub lat2: f64,
    #[clap(allow_negative_numbers = true)]
    pub lon2: f64,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_opts_verify() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_opts_distance_negative() {
        let opts = Opts::try_parse_from([
            "terremoto",
            "distance",
            "40.7",
            "-74.0",
            "-33.9",
            "151.2",
        ])
        .unwrap();
        match opts.subcmd {
            SubCommand::Distance(d) => {
                assert_eq!(-74.0, d.lon1);
                assert_eq!(-33.9, d.lat2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_opts_check_dry_run() {
        let opts = Opts::try_parse_from(["terremoto", "-c", "my.hcl", "check", "-n"]).unwrap();
        assert_eq!(Some(PathBuf::from("my.hcl")), opts.config);
        assert!(matches!(opts.subcmd, SubCommand::Check(CheckOpts { dry_run: true })));
    }
}

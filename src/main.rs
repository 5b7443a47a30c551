//! `terremoto`: daily earthquake digest for one location.
//!
//! Configuration is read from the environment (and `.env` if present), optionally preceded by
//! an HCL file given with `-c`.  See the `config` module for all variables.
//!

use std::sync::Arc;

use chrono::Utc;
use clap::{crate_authors, crate_description, crate_version, Parser};
use eyre::Result;
use tracing::{info, trace, warn};

use terremoto::{Alert, Config, Opts, Scheduler, SubCommand, SystemClock};
use terremoto_common::{haversine, init_logging};
use terremoto_sources::{FeedClient, Fetchable, Notifier, Pushover, Sites, Stdout};

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    match &opts.subcmd {
        // Commands without configuration
        //
        SubCommand::Distance(d) => {
            let dist = haversine(d.lat1, d.lon1, d.lat2, d.lon2);
            println!("{:.1} km", dist);
        }
        SubCommand::Sites => {
            println!("{}", Sites::load()?.list());
        }
        SubCommand::Version => {
            println!("{}", version());
            println!("Modules:");
            println!("\t{}", terremoto_common::version());
            println!("\t{}", terremoto_formats::version());
            println!("\t{}", terremoto_sources::version());
        }

        // Handle `run`
        //
        SubCommand::Run => {
            let cfg = init_runtime(&opts)?;
            trace!("run");

            let alert = build_alert(&cfg, false)?;
            let (sched, handle) =
                Scheduler::new(cfg.schedule, cfg.run_immediately, alert, SystemClock);
            let mut task = tokio::spawn(sched.run());

            // Wait for either ^C or the scheduler finishing on its own
            //
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res?;
                    info!("Shutting down earthquake alert system...");
                    handle.stop();
                    task.await?;
                }
                res = &mut task => res?,
            }
            trace!("scheduler is {}", handle.state());
        }

        // Handle `check`
        //
        SubCommand::Check(copts) => {
            let cfg = init_runtime(&opts)?;
            trace!("check");

            let alert = build_alert(&cfg, copts.dry_run)?;
            let stats = alert.run_cycle(Utc::now()).await?;
            info!("Check completed: {}", stats);
        }
    }
    Ok(())
}

/// Load `.env` and configuration, start logging.  Any error here is fatal.
///
fn init_runtime(opts: &Opts) -> Result<Config> {
    // It is fine not to have a `.env`
    //
    let dotenv = dotenvy::dotenv();

    let cfg = Config::load(opts.config.as_deref())?;

    init_logging(NAME, &cfg.log_level, opts.use_tree, cfg.log_file.as_deref())?;
    if dotenv.is_err() {
        warn!(".env file not found, using system environment variables");
    }

    banner()?;
    info!(
        "Initialized Earthquake Alert for location: {:.4}, {:.4}, radius: {:.1}km",
        cfg.home.location.lat, cfg.home.location.lon, cfg.home.radius_km
    );
    Ok(cfg)
}

/// Assemble feed and notifier from the configuration.
///
fn build_alert(cfg: &Config, dry_run: bool) -> Result<Alert> {
    let site = Sites::load()?.get(&cfg.feed)?;
    let feed: Arc<dyn Fetchable> =
        Arc::new(FeedClient::new(site, cfg.timeout, cfg.min_magnitude)?);

    let notifier: Arc<dyn Notifier> = if dry_run {
        Arc::new(Stdout)
    } else {
        Arc::new(Pushover::new(cfg.credentials.clone(), cfg.timeout)?)
    };
    info!("Using {} feed, sending through {}", feed.name(), notifier.name());

    Ok(Alert::new(feed, notifier, cfg.home, cfg.window_hours))
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}

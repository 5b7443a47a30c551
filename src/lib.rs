//! Library part of the `terremoto` daily earthquake alert.
//!
//! Once a day the alert fetches the recent events from a public seismic feed, keeps the ones
//! close enough to a fixed home location and sends a short digest through Pushover.
//!
//! Feeds, event formats and notifiers are in the `terremoto-sources` and `terremoto-formats`
//! crates, geodesy and logging in `terremoto-common`.
//!

pub use alert::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use filter::*;
pub use message::*;
pub use schedule::*;

mod alert;
mod cli;
mod config;
mod error;
mod filter;
mod message;
mod schedule;

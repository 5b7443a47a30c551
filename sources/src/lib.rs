//! Module to deal with the remote services we talk to.
//!
//! - seismic feeds we fetch events from (`Fetchable`, `FeedClient`)
//! - notification services we deliver the digest to (`Notifier`, `Pushover`)
//!
//! Both are traits so the alert cycle can be driven by fakes.
//!

#[macro_use]
mod macros;

// Re-export these modules for a shorted import path.
//
pub use error::*;
pub use feed::*;
pub use notify::*;
pub use site::*;

mod error;
mod feed;
mod notify;
mod site;

use clap::{crate_name, crate_version};

const NAME: &str = crate_name!();
const VERSION: &str = crate_version!();

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

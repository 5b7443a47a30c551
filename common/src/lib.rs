//! This library is there to share some common code amongst all terremoto modules.
//!

mod location;
mod logging;
mod window;

use clap::{crate_name, crate_version};
pub use location::*;
pub use logging::*;
pub use window::*;

const NAME: &str = crate_name!();
const VERSION: &str = crate_version!();

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

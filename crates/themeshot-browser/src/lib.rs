//! Headless Chrome backend for `themeshot-core`.
//!
//! [`ChromeFinder`] locates a binary, [`ProfileDir`] provides the user-data
//! directory, and [`BrowserLauncher`] starts Chrome and returns a
//! [`CdpDriver`] implementing [`themeshot_core::Driver`].

mod cdp_driver;
mod chrome_finder;
mod dom;
mod error;
mod launcher;
mod profile;

pub use cdp_driver::CdpDriver;
pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::BrowserLauncher;
pub use profile::ProfileDir;

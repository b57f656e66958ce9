//! Browser sessions for talking to Jira's web UI.
//!
//! [`ChromeLauncher`] is the production [`xraygen_ports::BrowserLauncher`].
//! The login flow in [`login`] works against any
//! [`xraygen_ports::BrowserPage`], so it is tested with a scripted page.

mod chrome;
mod error;
pub mod login;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use error::BrowserError;
pub use login::authenticate;

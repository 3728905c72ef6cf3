//! fingy: collect a browser device fingerprint over CDP and digest it.
//!
//! The core pipeline lives in [`fingerprint`] and talks to the browser only
//! through [`fingerprint::BrowserHost`]. [`browser`] supplies the CDP-backed
//! host and the plumbing to launch or attach to a browser.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fingerprint;

pub use error::{FingyError, Result};

//! cachenv - memoize shell commands
//!
//! Intercepts registered commands through PATH links and replays their
//! stdout, stderr and exit code from a content-addressed store.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod invocation;
pub mod links;
pub mod store;
pub mod ui;

pub use error::{CachenvError, CachenvResult};

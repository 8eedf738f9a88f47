// Crate root library declaration and module exports.
pub mod board;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod profile;
pub mod router;
pub mod session;
pub mod storage;
pub mod validation;

#[cfg(feature = "tui")]
pub mod tui;

pub mod bump;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod gates;
pub mod git;
pub mod lock;
pub mod pipeline;
pub mod preflight;
pub mod publisher;
pub mod tagger;
pub mod toolchain;
pub mod ui;
pub mod warning;

pub use error::{PreflightError, ReleaseError, Result};

pub mod analyzer;
pub mod artifact;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod conventional;
pub mod domain;
pub mod error;
pub mod exec;
pub mod git;
pub mod migration;
pub mod release;
pub mod ui;

pub use error::{ReleaseBumpError, Result};

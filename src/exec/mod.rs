//! Process execution collaborator
//!
//! Every external action of a release run (module rewrite, reference repair tool, lock
//! regeneration, staging) goes through the [`CommandRunner`] trait:
//!
//! - [`SystemRunner`]: runs real processes with `std::process::Command`
//! - [`RecordingRunner`]: records invocations for tests, optionally failing on demand
//!
//! Runs are blocking and report plain success or failure. There is no retry or timeout here.

pub mod mock;
pub mod system;

pub use mock::RecordingRunner;
pub use system::SystemRunner;

use crate::error::{ReleaseBumpError, Result};
use std::fmt;
use std::path::Path;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build an invocation from a configured argument vector.
    ///
    /// Each `(placeholder, value)` pair replaces `{placeholder}` in every argument.
    pub fn from_template(template: &[String], substitutions: &[(&str, &str)]) -> Result<Self> {
        let (program, args) = template
            .split_first()
            .ok_or_else(|| ReleaseBumpError::config("command must name a program to run"))?;

        let expand = |arg: &String| {
            substitutions
                .iter()
                .fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{}}}", key), value)
                })
        };

        Ok(Invocation {
            program: expand(program),
            args: args.iter().map(&expand).collect(),
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands on behalf of a release run
pub trait CommandRunner {
    /// Run `invocation` in `work_dir` to completion.
    ///
    /// # Returns
    /// * `Ok(())` - The process exited successfully
    /// * `Err` - The process could not be started or exited with a failure status
    fn run(&self, invocation: &Invocation, work_dir: &Path) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation, work_dir: &Path) -> Result<()> {
        (**self).run(invocation, work_dir)
    }
}

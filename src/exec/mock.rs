use crate::error::{ReleaseBumpError, Result};
use crate::exec::{CommandRunner, Invocation};
use std::cell::RefCell;
use std::path::Path;

/// Command runner that records invocations instead of spawning processes
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    /// Create a runner where every command succeeds
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Create a runner that fails any command whose rendered form contains `needle`
    pub fn failing_on(needle: impl Into<String>) -> Self {
        RecordingRunner {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(needle.into()),
        }
    }

    /// Invocations seen so far, in call order (including a failing one)
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines seen so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, _work_dir: &Path) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());

        let rendered = invocation.to_string();
        match &self.fail_on {
            Some(needle) if rendered.contains(needle.as_str()) => Err(ReleaseBumpError::command(
                format!("{} failed with exit code 1", rendered),
            )),
            _ => Ok(()),
        }
    }
}

//! Cleanup tasks run when an instance or scope is closed

use crate::Result;
use std::fmt;

/// A task registered to run on close
pub type CleanupFn = Box<dyn FnOnce() -> Result<()> + Send>;

/// Ordered collection of cleanup tasks
///
/// Tasks run most recent first and each runs at most once. A failing task
/// stops the current `close`; tasks that already ran are not re-run and the
/// remaining ones stay queued for the next call.
#[derive(Default)]
pub struct Cleanup {
    tasks: Vec<CleanupFn>,
}

impl Cleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task
    pub fn push(&mut self, task: CleanupFn) {
        self.tasks.push(task);
    }

    /// Number of tasks still queued
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run all queued tasks
    pub fn close(&mut self) -> Result<()> {
        while let Some(task) = self.tasks.pop() {
            task()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("pending", &self.tasks.len())
            .finish()
    }
}

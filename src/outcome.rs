//! Continue-on-failure result accumulation
//!
//! Attributes of one variable, aliases of one variable, variables of one
//! document and documents of one directory are all processed the same way:
//! every unit is attempted even after a failure, and the reported error is the
//! most recent one observed (last error wins).

use crate::error::VarCreateError;

/// Running result over a sequence of independent units of work
#[derive(Debug, Default)]
pub struct Outcome {
    succeeded: usize,
    failed: usize,
    last_error: Option<VarCreateError>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one unit, passing a success value through
    pub fn record<T>(&mut self, result: Result<T, VarCreateError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeed();
                Some(value)
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    pub fn succeed(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failure; it replaces any earlier one as the reported error
    pub fn fail(&mut self, err: VarCreateError) {
        self.failed += 1;
        self.last_error = Some(err);
    }

    /// Fold a nested outcome into this one, counting its units individually
    pub fn absorb(&mut self, other: Outcome) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        if other.last_error.is_some() {
            self.last_error = other.last_error;
        }
    }

    /// True when nothing failed
    pub fn is_success(&self) -> bool {
        self.last_error.is_none()
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The most recent failure, if any
    pub fn last_error(&self) -> Option<&VarCreateError> {
        self.last_error.as_ref()
    }

    /// Convert to a result carrying the success count, or the last error
    pub fn into_result(self) -> Result<usize, VarCreateError> {
        match self.last_error {
            Some(err) => Err(err),
            None => Ok(self.succeeded),
        }
    }
}

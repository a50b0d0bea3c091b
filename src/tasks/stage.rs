//! # Lifecycle stages of a dispatch call.
//!
//! [`Stage`] names the four non-terminal states a dispatch passes through:
//! `Validate → Preprocess → Execute → Postprocess`. The dispatcher attaches
//! the failing stage to [`DispatchFailed`](crate::EventKind::DispatchFailed)
//! events so subscribers can tell *where* a callback gave up.

use std::fmt;

/// One of the four lifecycle stages driven by the dispatcher.
///
/// The error hook (`on_error`) is not a stage: it observes a failure raised
/// by one of these and never appears in stage-ordering guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Structural inspection of the input; rejects invalid input.
    Validate,
    /// In-place normalization of the input.
    Preprocess,
    /// The unit of work itself; produces the result.
    Execute,
    /// Side effect on the successful result.
    Postprocess,
}

impl Stage {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagerun::Stage;
    ///
    /// assert_eq!(Stage::Validate.as_str(), "validate");
    /// assert_eq!(Stage::Postprocess.as_str(), "postprocess");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Preprocess => "preprocess",
            Stage::Execute => "execute",
            Stage::Postprocess => "postprocess",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

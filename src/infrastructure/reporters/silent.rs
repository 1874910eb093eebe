#[cfg(test)]
#[path = "silent_test.rs"]
mod tests;

use crate::domain::models::Reporter;
use crate::domain::models::ReporterName;

/// Swallows every event. Used for automated runs and tests.
#[derive(Default)]
pub struct SilentReporter {}

impl Reporter for SilentReporter {
    fn name(&self) -> ReporterName {
        return ReporterName::Silent;
    }
}

use std::path::Path;
use std::time::Duration;

use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ChatResult;
use super::HarnessError;
use super::Report;
use super::Session;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReporterName {
    Console,
    Silent,
}

impl ReporterName {
    pub fn parse(text: String) -> Option<ReporterName> {
        return ReporterName::iter().find(|e| return e.to_string() == text);
    }
}

/// Receives progress events from a harness run. Every hook defaults to doing
/// nothing, so implementations only override what they display.
pub trait Reporter {
    fn name(&self) -> ReporterName;

    fn run_started(&self, _base_url: &str, _username: &str, _total: usize) {}

    fn login_succeeded(&self, _session: &Session) {}

    /// `fatal` is set when the run stops because of the failure.
    fn login_failed(&self, _err: &HarnessError, _fatal: bool) {}

    fn message_sending(&self, _sequence: usize, _total: usize, _text: &str) {}

    fn message_completed(&self, _result: &ChatResult) {}

    fn waiting(&self, _delay: Duration) {}

    fn final_check_started(&self) {}

    fn final_check_completed(&self, _result: &ChatResult) {}

    fn report_ready(&self, _report: &Report) {}

    fn report_saved(&self, _path: &Path) {}

    fn interrupted(&self, _completed: usize) {}
}

pub type ReporterBox = Box<dyn Reporter + Send + Sync>;

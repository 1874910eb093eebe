#[cfg(test)]
#[path = "report_test.rs"]
mod tests;

use chrono::Local;
use chrono::SecondsFormat;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ChatResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub base_url: String,
    pub total_messages: usize,
    pub successful_messages: usize,
    pub failed_messages: usize,
    /// Percentage, 0 to 100.
    pub success_rate: f64,
    /// Percentage, 0 to 100.
    pub failure_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub avg_response_length: f64,
    pub final_check_passed: bool,
    pub results: Vec<ChatResult>,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    return part as f64 / total as f64 * 100.0;
}

impl Report {
    /// Aggregates results. Latency and length statistics only consider
    /// successful results; failures have no meaningful response.
    pub fn build(base_url: &str, results: &[ChatResult]) -> Report {
        let successful = results
            .iter()
            .filter(|res| return res.success)
            .collect::<Vec<&ChatResult>>();

        let total = results.len();
        let failed = total - successful.len();

        let mut avg_response_time = 0.0;
        let mut min_response_time = 0.0;
        let mut max_response_time = 0.0;
        let mut avg_response_length = 0.0;

        if !successful.is_empty() {
            let count = successful.len() as f64;
            let times = successful
                .iter()
                .map(|res| return res.response_time)
                .collect::<Vec<f64>>();

            avg_response_time = times.iter().sum::<f64>() / count;
            min_response_time = times.iter().copied().fold(f64::INFINITY, f64::min);
            max_response_time = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            avg_response_length = successful
                .iter()
                .map(|res| return res.response_length as f64)
                .sum::<f64>()
                / count;
        }

        let final_check_passed = results
            .iter()
            .rev()
            .find(|res| return res.final_check)
            .map(|res| return res.success)
            .unwrap_or(false);

        return Report {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
            base_url: base_url.to_string(),
            total_messages: total,
            successful_messages: successful.len(),
            failed_messages: failed,
            success_rate: percent(successful.len(), total),
            failure_rate: percent(failed, total),
            avg_response_time,
            min_response_time,
            max_response_time,
            avg_response_length,
            final_check_passed,
            results: results.to_vec(),
        };
    }

    pub fn failures(&self) -> Vec<&ChatResult> {
        return self
            .results
            .iter()
            .filter(|res| return !res.success)
            .collect();
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;

use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;

pub const FINAL_CHECK_MESSAGE: &str = "Final check - does the input still work?";

const DEFAULT_MESSAGES: [&str; 15] = [
    "Hello, this is an automated test.",
    "How can I create a new announcement?",
    "Which categories are available?",
    "Explain what the AURALIS system is.",
    "How do I view older announcements?",
    "What is the difference between ADMIN and READER users?",
    "Can I attach files to announcements?",
    "How does the questions system work?",
    "What is the mind map?",
    "How do I search for specific announcements?",
    "Are there filters available in search?",
    "How do I mark an announcement as read?",
    "Can I export reports?",
    "How do I change my password?",
    "Does the system have a REST API?",
];

/// Ordered list of chat messages a run walks through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    messages: Vec<String>,
}

impl Default for Script {
    fn default() -> Script {
        return Script {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|msg| return msg.to_string())
                .collect(),
        };
    }
}

impl Script {
    pub fn parse(text: &str) -> Result<Script> {
        let messages = text
            .lines()
            .map(|line| return line.trim())
            .filter(|line| return !line.is_empty())
            .map(|line| return line.to_string())
            .collect::<Vec<String>>();

        if messages.is_empty() {
            bail!("Script has no messages");
        }

        return Ok(Script { messages });
    }

    pub async fn load(path: &Path) -> Result<Script> {
        let text = fs::read_to_string(path).await?;
        return Script::parse(&text);
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    /// Returns `count` messages, cycling through the script when `count` is
    /// larger than the script.
    pub fn take(&self, count: usize) -> Vec<String> {
        return self.messages.iter().cycle().take(count).cloned().collect();
    }
}

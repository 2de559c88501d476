// Verdict types produced by the URL scorer.

use serde::Serialize;

/// Score at or above which a URL is considered Safe.
pub const SAFE_THRESHOLD: u32 = 80;

/// Score at or above which a URL is Suspicious rather than Dangerous.
pub const SUSPICIOUS_THRESHOLD: u32 = 50;

/// Coarse safety bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Safe,
    Suspicious,
    Dangerous,
}

impl Status {
    /// Determine the status from a score (0-100).
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= SAFE_THRESHOLD => Status::Safe,
            s if s >= SUSPICIOUS_THRESHOLD => Status::Suspicious,
            _ => Status::Dangerous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "Safe",
            Status::Suspicious => "Suspicious",
            Status::Dangerous => "Dangerous",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_DESCRIPTION: &str = "This URL seems safe.";

/// The outcome of scoring one URL.
///
/// `red_flags` keeps the order in which rules fired and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub score: u32,
    pub status: Status,
    pub red_flags: Vec<String>,
    pub category: String,
    pub description: String,
}

impl Verdict {
    /// Build a verdict from a running score that may have gone negative.
    pub(crate) fn from_running(
        running: i32,
        red_flags: Vec<String>,
        category: String,
        description: String,
    ) -> Self {
        let score = running.clamp(0, 100) as u32;
        Self {
            score,
            status: Status::from_score(score),
            red_flags,
            category,
            description,
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.red_flags.iter().any(|f| f == flag)
    }
}

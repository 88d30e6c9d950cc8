use crate::artifact::Artifact;
use crate::error::VerifyError;
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub kind: String,
    pub step: String,
    pub message: String,
}

impl From<&VerifyError> for FailureSummary {
    fn from(err: &VerifyError) -> Self {
        Self {
            kind: err.kind().to_string(),
            step: err.step().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one verification run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub themes: Vec<Theme>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_artifact: Option<PathBuf>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Step;

    #[test]
    fn test_failure_summary_from_error() {
        let err = VerifyError::AssertionFailed {
            step: Step::ApplyTheme(Theme::Playful),
            expected: "text 'Saved'".to_string(),
            timeout: std::time::Duration::from_secs(10),
        };
        let summary = FailureSummary::from(&err);
        assert_eq!(summary.kind, "assertion_failed");
        assert_eq!(summary.step, "apply-theme(playful)");
        assert!(summary.message.contains("text 'Saved'"));
    }

    #[test]
    fn test_passed_report_omits_failure_in_json() {
        let now = Utc::now();
        let report = RunReport {
            base_url: "http://localhost:3000".to_string(),
            themes: vec![Theme::Default],
            started_at: now,
            finished_at: now,
            artifacts: vec![],
            failure: None,
            error_artifact: None,
        };
        assert!(report.passed());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("failure").is_none());
        assert_eq!(json["themes"][0], "default");
    }
}

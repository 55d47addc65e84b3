//! Build pipeline result model.
//!
//! The service is shipped by a stage pipeline (install, scan, build, push,
//! deploy, chaos). This module folds per-stage outcomes into one overall
//! status and renders the summary posted to the results webhook.

use serde::Serialize;

/// Max characters of failure detail carried in a summary.
pub const ERROR_EXCERPT_MAX_CHARS: usize = 500;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Install,
    DependencyScan,
    Build,
    ImageScan,
    Push,
    Deploy,
    Chaos,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Install => "install",
            Stage::DependencyScan => "dependency_scan",
            Stage::Build => "build",
            Stage::ImageScan => "image_scan",
            Stage::Push => "push",
            Stage::Deploy => "deploy",
            Stage::Chaos => "chaos",
        }
    }

    fn is_scan(self) -> bool {
        matches!(self, Stage::DependencyScan | Stage::ImageScan)
    }

    /// Status a failure of this stage degrades the run to.
    fn failure_status(self, critical: bool) -> BuildStatus {
        match self {
            Stage::Install | Stage::Build => BuildStatus::Failure,
            s if s.is_scan() && critical => BuildStatus::Failure,
            _ => BuildStatus::Unstable,
        }
    }
}

/// Outcome reported by a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Passed,
    Skipped,
    Failed { critical: bool, detail: String },
}

/// Overall run status. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Unstable,
    Failure,
}

/// Accumulates stage outcomes for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    status: BuildStatus,
    completed: Vec<(Stage, StageOutcome)>,
    aborted_at: Option<Stage>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            status: BuildStatus::Success,
            completed: Vec::new(),
            aborted_at: None,
        }
    }

    /// Record a stage outcome and return the resulting overall status.
    ///
    /// Status never improves. Once a stage aborts the run, later records are
    /// ignored.
    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) -> BuildStatus {
        if let Some(at) = self.aborted_at {
            tracing::warn!(stage = stage.as_str(), aborted_at = at.as_str(), "stage recorded after abort; ignored");
            return self.status;
        }

        if let StageOutcome::Failed { critical, detail } = &outcome {
            let degraded = stage.failure_status(*critical);
            tracing::warn!(stage = stage.as_str(), status = ?degraded, %detail, "stage failed");
            self.status = self.status.max(degraded);
            if degraded == BuildStatus::Failure {
                self.aborted_at = Some(stage);
            }
        }

        self.completed.push((stage, outcome));
        self.status
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    /// Whether the stage ran to a pass.
    pub fn passed(&self, stage: Stage) -> bool {
        self.completed
            .iter()
            .any(|(s, o)| *s == stage && *o == StageOutcome::Passed)
    }

    /// Whether the stage ran at all (passed or failed).
    pub fn ran(&self, stage: Stage) -> bool {
        self.completed
            .iter()
            .any(|(s, o)| *s == stage && *o != StageOutcome::Skipped)
    }

    /// Detail of the first failed stage, if any.
    pub fn first_failure(&self) -> Option<&str> {
        self.completed.iter().find_map(|(_, o)| match o {
            StageOutcome::Failed { detail, .. } => Some(detail.as_str()),
            _ => None,
        })
    }
}

/// Payload posted to the build results webhook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub status: BuildStatus,
    pub job_name: String,
    pub build_number: u64,
    pub commit_message: String,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_excerpt: Option<String>,
    pub deployed: bool,
    pub security_scanned: bool,
    pub chaos_ran: bool,
}

impl BuildSummary {
    pub fn from_run(
        run: &PipelineRun,
        job_name: impl Into<String>,
        build_number: u64,
        commit_message: impl Into<String>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            status: run.status(),
            job_name: job_name.into(),
            build_number,
            commit_message: commit_message.into(),
            duration_seconds,
            error_excerpt: run.first_failure().map(excerpt),
            deployed: run.passed(Stage::Deploy),
            security_scanned: run.ran(Stage::DependencyScan) || run.ran(Stage::ImageScan),
            chaos_ran: run.ran(Stage::Chaos),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::BeaconError::Internal(format!("summary encode failed: {e}")))
    }

    /// Value for the webhook `Authorization` header.
    pub fn authorization_header(token: &str) -> String {
        format!("Bearer {token}")
    }
}

fn excerpt(detail: &str) -> String {
    detail.chars().take(ERROR_EXCERPT_MAX_CHARS).collect()
}

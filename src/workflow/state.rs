// WorkflowState - shared state carried between pipeline stages
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Target platform for the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Long-form YouTube video
    Youtube,
    /// Short-form vertical video
    Short,
}

impl Platform {
    /// Parse a platform string. Unrecognized values fall back to long form.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("short") || normalized.eq_ignore_ascii_case("shorts") {
            Platform::Short
        } else {
            if !normalized.is_empty() && !normalized.eq_ignore_ascii_case("youtube") {
                tracing::warn!("Unrecognized platform '{}', falling back to YouTube", raw);
            }
            Platform::Youtube
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Youtube => write!(f, "YouTube"),
            Platform::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    Initializing,
    Running,
    Completed,
    Failed,
}

/// State owned by exactly one in-flight workflow run. Stages never share a
/// state instance across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: String,
    pub current_node: String,

    pub topic: String,
    pub tones: String,
    pub file_path: String,
    pub current_year: String,
    pub platform: Platform,

    /// Set once per research pass, overwritten on a repeated pass
    pub research_results: String,
    /// Set only when the screenwriting stage judges the script complete
    pub final_script: String,
    /// Loop request from the screenwriting stage, cleared on re-entry into
    /// research
    pub needs_more_research: bool,
    /// Research passes performed so far, bounds the loop
    pub research_attempts: u32,

    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(
        topic: String,
        tones: String,
        file_path: String,
        current_year: Option<String>,
        platform: Platform,
    ) -> Self {
        let now = Utc::now();
        let tones = if tones.trim().is_empty() {
            "professional".to_string()
        } else {
            tones
        };
        let current_year = current_year
            .filter(|y| !y.trim().is_empty())
            .unwrap_or_else(|| now.year().to_string());

        Self {
            workflow_id: Uuid::new_v4().to_string(),
            current_node: "start".to_string(),
            topic,
            tones,
            file_path,
            current_year,
            platform,
            research_results: String::new(),
            final_script: String::new(),
            needs_more_research: false,
            research_attempts: 0,
            status: WorkflowStatus::Initializing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a stage's partial output into the state. Only fields the stage
    /// set are touched.
    pub fn apply_update(&mut self, update: StateUpdate) {
        self.updated_at = Utc::now();

        if let Some(research_results) = update.research_results {
            self.research_results = research_results;
        }
        if let Some(final_script) = update.final_script {
            self.final_script = final_script;
        }
        if let Some(needs_more_research) = update.needs_more_research {
            self.needs_more_research = needs_more_research;
        }
        if let Some(research_attempts) = update.research_attempts {
            self.research_attempts = research_attempts;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    pub fn set_current_node(&mut self, node: &str) {
        self.current_node = node.to_string();
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

/// Partial state produced by one stage execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub research_results: Option<String>,
    pub final_script: Option<String>,
    pub needs_more_research: Option<bool>,
    pub research_attempts: Option<u32>,
    pub status: Option<WorkflowStatus>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_research_results(mut self, research_results: String) -> Self {
        self.research_results = Some(research_results);
        self
    }

    pub fn with_final_script(mut self, final_script: String) -> Self {
        self.final_script = Some(final_script);
        self
    }

    pub fn with_needs_more_research(mut self, needs_more_research: bool) -> Self {
        self.needs_more_research = Some(needs_more_research);
        self
    }

    pub fn with_research_attempts(mut self, research_attempts: u32) -> Self {
        self.research_attempts = Some(research_attempts);
        self
    }

    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status = Some(status);
        self
    }
}

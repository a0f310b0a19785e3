// API request/response payloads
use crate::tasks::TaskStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ScriptResponse {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl ScriptResponse {
    pub fn accepted(task_id: String) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            file_path: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Frames emitted on the SSE stream while a script is being generated.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationEvent {
    Started,
    ResearchCompleted {
        research_results: String,
    },
    Completed {
        final_script: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_path: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_event_wire_format() {
        let event = GenerationEvent::ResearchCompleted {
            research_results: "Rome founded 753 BC".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "research_completed");
        assert_eq!(json["research_results"], "Rome founded 753 BC");

        let done = GenerationEvent::Completed {
            final_script: "Script".to_string(),
            file_path: None,
        };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json.get("file_path").is_none());
    }

    #[test]
    fn test_script_response_omits_empty_fields() {
        let response = ScriptResponse::accepted("task-1".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
    }
}

//! Caller-facing actions: request parsing and validation for tool calls and RPC
//!
//! Every surface (CLI, tool call, RPC) turns its input into an [`Action`]
//! here, so malformed input is rejected before any store command runs.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::model::{Platform, PostId, PostMetadata, Status};
use crate::usecases::repository::{CreateOptions, ListFilter};

/// Tool name registered with the host runtime
pub const TOOL_NAME: &str = "social_scheduler";

/// Action names accepted by the tool handler, in schema order
pub const ACTIONS: [&str; 7] = [
    "draft", "schedule", "publish", "list", "upcoming", "cancel", "delete",
];

/// RPC methods and the action each maps to
pub const RPC_METHODS: [(&str, &str); 5] = [
    ("social.draft", "draft"),
    ("social.schedule", "schedule"),
    ("social.publish", "publish"),
    ("social.list", "list"),
    ("social.upcoming", "upcoming"),
];

pub const DEFAULT_UPCOMING_HOURS: u32 = 24;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Raw tool-call payload; which fields matter depends on `action`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRequest {
    pub action: Option<String>,
    pub content: Option<String>,
    pub platforms: Option<Vec<Platform>>,
    pub id: Option<PostId>,
    pub date: Option<String>,
    pub status: Option<Status>,
    pub platform: Option<Platform>,
    pub campaign: Option<String>,
    pub hours: Option<u32>,
    pub limit: Option<usize>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub metadata: Option<PostMetadata>,
}

/// A validated operation on the post queue
#[derive(Debug, Clone)]
pub enum Action {
    Draft {
        content: String,
        platforms: Vec<Platform>,
        options: CreateOptions,
    },
    Schedule {
        id: PostId,
        date: String,
    },
    Publish {
        id: PostId,
    },
    List(ListFilter),
    Upcoming {
        hours: u32,
    },
    Cancel {
        id: PostId,
    },
    Delete {
        id: PostId,
    },
}

impl Action {
    /// Parse a tool-call JSON object
    pub fn from_tool_call(params: Value) -> Result<Self, ActionError> {
        let request: ToolRequest = parse_params(params)?;
        Self::from_request(request)
    }

    /// Parse an RPC call: the method selects the action, params carry the fields
    pub fn from_rpc(method: &str, params: Value) -> Result<Self, ActionError> {
        let action = RPC_METHODS
            .iter()
            .find(|(name, _)| *name == method)
            .map(|(_, action)| *action)
            .ok_or_else(|| ActionError::UnknownMethod(method.to_string()))?;

        let mut request: ToolRequest = parse_params(params)?;
        request.action = Some(action.to_string());
        Self::from_request(request)
    }

    pub fn from_request(request: ToolRequest) -> Result<Self, ActionError> {
        let action = request
            .action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ActionError::Validation("Action is required".to_string()))?;

        match action {
            "draft" => {
                let content = required(request.content, "Content is required for draft action")?;
                let platforms = match request.platforms {
                    Some(platforms) if !platforms.is_empty() => platforms,
                    _ => vec![Platform::Twitter],
                };
                Ok(Action::Draft {
                    content,
                    platforms,
                    options: CreateOptions {
                        campaign: request.campaign,
                        due: request.due,
                        priority: request.priority,
                        metadata: request.metadata,
                    },
                })
            }
            "schedule" => {
                let id = required_id(request.id, "schedule")?;
                let date = required(request.date, "Date is required for schedule action")?;
                Ok(Action::Schedule { id, date })
            }
            "publish" => Ok(Action::Publish {
                id: required_id(request.id, "publish")?,
            }),
            "list" => Ok(Action::List(ListFilter {
                status: request.status,
                platform: request.platform,
                campaign: request.campaign,
                limit: request.limit,
            })),
            "upcoming" => Ok(Action::Upcoming {
                hours: request.hours.unwrap_or(DEFAULT_UPCOMING_HOURS),
            }),
            "cancel" => Ok(Action::Cancel {
                id: required_id(request.id, "cancel")?,
            }),
            "delete" => Ok(Action::Delete {
                id: required_id(request.id, "delete")?,
            }),
            other => Err(ActionError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Draft { .. } => "draft",
            Action::Schedule { .. } => "schedule",
            Action::Publish { .. } => "publish",
            Action::List(_) => "list",
            Action::Upcoming { .. } => "upcoming",
            Action::Cancel { .. } => "cancel",
            Action::Delete { .. } => "delete",
        }
    }
}

fn parse_params(params: Value) -> Result<ToolRequest, ActionError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| ActionError::InvalidParams(e.to_string()))
}

fn required(value: Option<String>, message: &str) -> Result<String, ActionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ActionError::Validation(message.to_string()))
}

fn required_id(id: Option<PostId>, action: &str) -> Result<PostId, ActionError> {
    id.filter(|id| !id.is_empty()).ok_or_else(|| {
        ActionError::Validation(format!("Post ID is required for {} action", action))
    })
}

/// JSON schema describing the tool to the host runtime
pub fn tool_definition() -> Value {
    let platforms: Vec<&str> = Platform::ALL.iter().map(Platform::as_str).collect();
    json!({
        "name": TOOL_NAME,
        "description": "Manage social media posts across multiple platforms. Create drafts, schedule posts, publish immediately, and track your social media pipeline.",
        "input_schema": {
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ACTIONS,
                    "description": "Action to perform",
                },
                "content": {
                    "type": "string",
                    "description": "Post content (for draft action)",
                },
                "platforms": {
                    "type": "array",
                    "items": { "type": "string", "enum": platforms },
                    "description": "Target platforms (for draft action)",
                },
                "id": {
                    "type": "string",
                    "description": "Post ID (for schedule, publish, cancel, delete actions)",
                },
                "date": {
                    "type": "string",
                    "description": "Schedule date in ISO format (for schedule action)",
                },
                "status": {
                    "type": "string",
                    "enum": ["draft", "scheduled", "published", "failed"],
                    "description": "Filter by status (for list action)",
                },
                "platform": {
                    "type": "string",
                    "enum": platforms,
                    "description": "Filter by platform (for list action)",
                },
                "campaign": {
                    "type": "string",
                    "description": "Campaign name (for draft/list actions)",
                },
                "hours": {
                    "type": "number",
                    "description": "Hours to look ahead (for upcoming action)",
                },
            },
            "required": ["action"],
        },
    })
}

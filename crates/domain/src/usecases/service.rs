//! Social service - executes validated actions and adapts results per surface

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

use crate::{
    model::TaskRecord,
    ports::{Clock, TaskStore},
    tags,
    usecases::{
        actions::{Action, ActionError},
        publish::{OrchestratorError, PublishOrchestrator, PublisherRegistry},
        repository::{PostRepository, RepositoryError},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Publish(#[from] OrchestratorError),
}

/// Result of executing an action
#[derive(Debug, Clone)]
pub enum ActionOutput {
    Message(String),
    Listed(Vec<TaskRecord>),
    Upcoming { hours: u32, posts: Vec<TaskRecord> },
}

impl ActionOutput {
    /// Text form returned to tool callers
    pub fn render(&self) -> String {
        match self {
            ActionOutput::Message(message) => message.clone(),
            ActionOutput::Listed(posts) if posts.is_empty() => "No posts found".to_string(),
            ActionOutput::Listed(posts) => {
                let lines: Vec<String> = posts
                    .iter()
                    .map(|p| format!("{}. {} [{}]", p.id, p.summary, display_tags(p).join(", ")))
                    .collect();
                format!("Found {} post(s):\n{}", posts.len(), lines.join("\n"))
            }
            ActionOutput::Upcoming { hours, posts } if posts.is_empty() => {
                format!("No posts scheduled in the next {} hours", hours)
            }
            ActionOutput::Upcoming { posts, .. } => {
                let lines: Vec<String> = posts
                    .iter()
                    .map(|p| format!("{}. {} @ {}", p.id, p.summary, format_due(p)))
                    .collect();
                format!("{} post(s) upcoming:\n{}", posts.len(), lines.join("\n"))
            }
        }
    }

    pub fn posts(&self) -> &[TaskRecord] {
        match self {
            ActionOutput::Message(_) => &[],
            ActionOutput::Listed(posts) | ActionOutput::Upcoming { posts, .. } => posts,
        }
    }
}

/// Tags worth showing to a person: everything except the marker and live status tags
pub fn display_tags(record: &TaskRecord) -> Vec<&str> {
    record
        .tags
        .iter()
        .map(|t| tags::normalize(t))
        .filter(|t| !tags::is_bookkeeping_tag(t))
        .collect()
}

pub fn format_due(record: &TaskRecord) -> String {
    record
        .due
        .and_then(|due| due.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unscheduled".to_string())
}

/// Response envelope for tool calls
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn success(result: String) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// Entry point shared by every caller surface
pub struct SocialService<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    repository: Arc<PostRepository<S, C>>,
    orchestrator: PublishOrchestrator<S, C>,
}

impl<S, C> SocialService<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, publishers: PublisherRegistry) -> Self {
        let repository = Arc::new(PostRepository::new(store, clock));
        let orchestrator = PublishOrchestrator::new(Arc::clone(&repository), publishers);
        Self {
            repository,
            orchestrator,
        }
    }

    pub fn repository(&self) -> &PostRepository<S, C> {
        &self.repository
    }

    pub async fn execute(&self, action: Action) -> Result<ActionOutput, ServiceError> {
        tracing::debug!(action = action.name(), "Executing action");

        let output = match action {
            Action::Draft {
                content,
                platforms,
                options,
            } => ActionOutput::Message(
                self.repository
                    .create(&content, &platforms, crate::model::Status::Draft, options)
                    .await?,
            ),
            Action::Schedule { id, date } => {
                ActionOutput::Message(self.repository.schedule(&id, &date).await?)
            }
            Action::Publish { id } => {
                ActionOutput::Message(self.orchestrator.publish(&id).await?.message())
            }
            Action::List(filter) => ActionOutput::Listed(self.repository.list(filter).await?),
            Action::Upcoming { hours } => ActionOutput::Upcoming {
                hours,
                posts: self.repository.upcoming(hours).await?,
            },
            Action::Cancel { id } => ActionOutput::Message(self.repository.cancel(&id).await?),
            Action::Delete { id } => ActionOutput::Message(self.repository.delete(&id).await?),
        };

        Ok(output)
    }

    /// Handle a tool call; errors are reported in the envelope, never raised
    pub async fn handle_tool_call(&self, params: Value) -> ToolResponse {
        let action = match Action::from_tool_call(params) {
            Ok(action) => action,
            Err(e) => return ToolResponse::failure(e),
        };

        match self.execute(action).await {
            Ok(output) => ToolResponse::success(output.render()),
            Err(e) => {
                tracing::warn!(error = %e, "Tool call failed");
                ToolResponse::failure(e)
            }
        }
    }

    /// Handle an RPC method call
    pub async fn handle_rpc(&self, method: &str, params: Value) -> Result<Value, ServiceError> {
        let action = Action::from_rpc(method, params)?;
        let output = self.execute(action).await?;

        Ok(match output {
            ActionOutput::Message(message) => json!({ "ok": true, "message": message }),
            ActionOutput::Listed(posts) | ActionOutput::Upcoming { posts, .. } => {
                json!({ "ok": true, "posts": posts })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostId, parse_timestamp};
    use crate::usecases::repository::tests::{FakeStore, FixedClock, record};

    fn service(store: Arc<FakeStore>) -> SocialService<FakeStore, FixedClock> {
        let clock = Arc::new(FixedClock(parse_timestamp("2026-03-01T12:00:00Z").unwrap()));
        SocialService::new(store, clock, PublisherRegistry::new())
    }

    #[tokio::test]
    async fn test_tool_validation_errors_do_not_touch_store() {
        let store = Arc::new(FakeStore::default());
        let service = service(store.clone());

        let response = service.handle_tool_call(json!({"action": "draft"})).await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("Content is required"));

        let response = service.handle_tool_call(json!({"action": "invalid"})).await;
        assert!(response.error.unwrap().contains("Unknown action"));

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tool_list_renders_platform_tags() {
        let store = Arc::new(FakeStore::with_records(vec![record(
            1,
            &["social", "draft", "twitter", "bluesky"],
        )]));
        let response = service(store)
            .handle_tool_call(json!({"action": "list"}))
            .await;

        assert!(response.ok);
        assert_eq!(
            response.result.unwrap(),
            "Found 1 post(s):\n1. post 1 [twitter, bluesky]"
        );
    }

    #[tokio::test]
    async fn test_tool_list_keeps_failed_marker() {
        let store = Arc::new(FakeStore::with_records(vec![record(
            2,
            &["social", "scheduled", "twitter", "failed"],
        )]));
        let response = service(store)
            .handle_tool_call(json!({"action": "list"}))
            .await;

        assert_eq!(
            response.result.unwrap(),
            "Found 1 post(s):\n2. post 2 [twitter, failed]"
        );
    }

    #[tokio::test]
    async fn test_tool_upcoming_empty_message() {
        let store = Arc::new(FakeStore::default());
        let response = service(store)
            .handle_tool_call(json!({"action": "upcoming", "hours": 6}))
            .await;
        assert_eq!(
            response.result.unwrap(),
            "No posts scheduled in the next 6 hours"
        );
    }

    #[tokio::test]
    async fn test_rpc_schedule_and_list() {
        let store = Arc::new(FakeStore::with_records(vec![record(
            2,
            &["social", "draft", "linkedin"],
        )]));
        let service = service(store.clone());

        let value = service
            .handle_rpc("social.schedule", json!({"id": "2", "date": "2026-03-02T09:00"}))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["message"], "Scheduled post 2 for 2026-03-02T09:00");

        let value = service.handle_rpc("social.list", json!({})).await.unwrap();
        assert_eq!(value["posts"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_tool_error() {
        let store = Arc::new(FakeStore::with_records(vec![record(
            3,
            &["social", "scheduled", "twitter"],
        )]));
        let service = service(store);

        let response = service
            .handle_tool_call(json!({"action": "publish", "id": "3"}))
            .await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("Failed to publish post 3"));

        let missing = service.execute(Action::Publish { id: PostId::from("99") }).await;
        assert!(matches!(
            missing,
            Err(ServiceError::Publish(OrchestratorError::PostNotFound(_)))
        ));
    }
}

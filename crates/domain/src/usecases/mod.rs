//! Application use cases / business logic

pub mod actions;
pub mod publish;
pub mod repository;
pub mod service;

pub use actions::{Action, ActionError, ToolRequest, tool_definition};
pub use publish::{OrchestratorError, PublishOrchestrator, PublisherRegistry};
pub use repository::{CreateOptions, ListFilter, PostRepository, RepositoryError};
pub use service::{ActionOutput, ServiceError, SocialService, ToolResponse};

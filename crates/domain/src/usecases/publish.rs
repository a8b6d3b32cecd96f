//! Publish orchestrator - fans a post out to its platforms and records the result

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::{
    model::{
        Platform, PlatformOutcome, Post, PostId, PublishReport, PublishVerdict, describe_failures,
        join_platforms,
    },
    ports::{Clock, PlatformPublisher, TaskStore},
    usecases::repository::{PostRepository, RepositoryError},
};

/// Publishers keyed by the platform they deliver to
#[derive(Clone, Default)]
pub struct PublisherRegistry {
    publishers: HashMap<Platform, Arc<dyn PlatformPublisher>>,
}

impl PublisherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher under its own platform, replacing any previous one
    pub fn register(&mut self, publisher: Arc<dyn PlatformPublisher>) {
        self.publishers.insert(publisher.platform(), publisher);
    }

    pub fn with(mut self, publisher: Arc<dyn PlatformPublisher>) -> Self {
        self.register(publisher);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn PlatformPublisher>> {
        self.publishers.get(&platform)
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<_> = self.publishers.keys().copied().collect();
        platforms.sort();
        platforms
    }
}

/// Errors that end a publish attempt
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Post {0} not found")]
    PostNotFound(PostId),
    #[error("Post {0} has no target platforms")]
    NoPlatforms(PostId),
    #[error("Failed to publish post {post_id} to any platform: {reasons}")]
    AllPlatformsFailed {
        post_id: PostId,
        reasons: String,
        outcomes: Vec<PlatformOutcome>,
    },
    /// Delivery happened but the resulting status could not be written back
    #[error("Post {post_id} was delivered to {delivered} but its status could not be recorded: {source}")]
    Bookkeeping {
        post_id: PostId,
        delivered: String,
        outcomes: Vec<PlatformOutcome>,
        source: RepositoryError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Drives one publish attempt per call.
///
/// Platforms are tried one after another with no timeout; a hanging
/// publisher blocks the whole attempt. Callers wanting a deadline must wrap
/// [`PublishOrchestrator::publish`] themselves.
pub struct PublishOrchestrator<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    repository: Arc<PostRepository<S, C>>,
    publishers: PublisherRegistry,
}

impl<S, C> PublishOrchestrator<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(repository: Arc<PostRepository<S, C>>, publishers: PublisherRegistry) -> Self {
        Self {
            repository,
            publishers,
        }
    }

    /// Publish a post to every platform it targets.
    ///
    /// Full success marks the post published and resolves it. Partial success
    /// returns a report and marks the post failed. Total failure marks the post
    /// failed and returns [`OrchestratorError::AllPlatformsFailed`]. If the
    /// status write fails after any platform accepted the post, the outcomes
    /// come back in [`OrchestratorError::Bookkeeping`].
    pub async fn publish(&self, id: &PostId) -> Result<PublishReport, OrchestratorError> {
        let record = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| OrchestratorError::PostNotFound(id.clone()))?;

        let post = Post::from_record(&record);
        if post.platforms.is_empty() {
            return Err(OrchestratorError::NoPlatforms(id.clone()));
        }

        tracing::info!(
            post_id = %id,
            platforms = ?post.platforms,
            "Publishing post"
        );

        let mut outcomes = Vec::with_capacity(post.platforms.len());
        for platform in &post.platforms {
            let outcome = self.attempt(*platform, &post.content).await;
            match &outcome.error {
                None => tracing::info!(post_id = %id, platform = %platform, "Published to platform"),
                Some(reason) => tracing::warn!(
                    post_id = %id,
                    platform = %platform,
                    error = %reason,
                    "Failed to publish to platform"
                ),
            }
            outcomes.push(outcome);
        }

        let verdict = PublishVerdict::from_outcomes(&outcomes);
        let report = PublishReport {
            post_id: id.clone(),
            verdict,
            outcomes,
        };

        let recorded = match verdict {
            PublishVerdict::Published => self.repository.mark_published(id).await,
            PublishVerdict::PartiallyFailed | PublishVerdict::Failed => {
                self.repository.mark_failed(id).await
            }
        };
        if let Err(source) = recorded {
            tracing::error!(post_id = %id, error = %source, "Failed to record publish outcome");
            // Nothing was delivered on total failure; report the platform errors instead
            if verdict != PublishVerdict::Failed {
                return Err(OrchestratorError::Bookkeeping {
                    post_id: id.clone(),
                    delivered: join_platforms(&report.succeeded()),
                    outcomes: report.outcomes,
                    source,
                });
            }
        }

        match verdict {
            PublishVerdict::Published => Ok(report),
            PublishVerdict::PartiallyFailed => {
                tracing::warn!(
                    post_id = %id,
                    failed = %describe_failures(&report.failures()),
                    "Post partially published; needs follow-up"
                );
                Ok(report)
            }
            PublishVerdict::Failed => {
                Err(OrchestratorError::AllPlatformsFailed {
                    post_id: id.clone(),
                    reasons: describe_failures(&report.failures()),
                    outcomes: report.outcomes,
                })
            }
        }
    }

    /// One platform attempt. Errors and panics are contained in the outcome.
    async fn attempt(&self, platform: Platform, content: &str) -> PlatformOutcome {
        let Some(publisher) = self.publishers.get(platform) else {
            return PlatformOutcome::failed(platform, "no publisher registered");
        };

        match AssertUnwindSafe(publisher.publish(content))
            .catch_unwind()
            .await
        {
            Ok(Ok(_receipt)) => PlatformOutcome::delivered(platform),
            Ok(Err(e)) => PlatformOutcome::failed(platform, e.to_string()),
            Err(_) => PlatformOutcome::failed(platform, "publisher panicked"),
        }
    }
}

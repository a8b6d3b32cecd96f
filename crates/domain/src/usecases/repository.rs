//! Post repository - posts expressed as tag-filtered queries and tag mutations
//!
//! Holds no state of its own: every read and write goes through the task
//! store. The store is assumed to have a single interactive writer; the
//! create-then-annotate step and the scan-based `get` are not safe against
//! concurrent callers on the same store.

use std::sync::Arc;
use time::Duration;

use crate::{
    model::{
        Platform, PostId, PostMetadata, Status, TaskRecord, encode_notes, join_platforms,
        summarize, SUMMARY_LENGTH,
    },
    ports::{Clock, StoreError, TaskStore},
    tags,
};

/// Optional fields for a new post
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub campaign: Option<String>,
    /// Due date in any format the store accepts
    pub due: Option<String>,
    /// Store priority token such as `P1`
    pub priority: Option<String>,
    pub metadata: Option<PostMetadata>,
}

/// Filters for listing posts
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub platform: Option<Platform>,
    pub campaign: Option<String>,
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Validation(String),
}

/// Post operations over a task store
pub struct PostRepository<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> PostRepository<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Create a post, attaching full content and metadata as notes when needed
    pub async fn create(
        &self,
        content: &str,
        platforms: &[Platform],
        status: Status,
        options: CreateOptions,
    ) -> Result<String, RepositoryError> {
        if content.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "Content is required".to_string(),
            ));
        }

        let mut unique: Vec<Platform> = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if !unique.contains(platform) {
                unique.push(*platform);
            }
        }
        if unique.is_empty() {
            return Err(RepositoryError::Validation(
                "At least one platform is required".to_string(),
            ));
        }

        let summary = summarize(content);
        let mut args = vec!["add".to_string(), summary.clone()];
        args.extend(tags::creation_tags(status, &unique));

        if let Some(campaign) = non_empty(options.campaign.as_deref()) {
            args.push(format!("project:{}", campaign));
        }
        if let Some(priority) = non_empty(options.priority.as_deref()) {
            args.push(priority.to_string());
        }
        if let Some(due) = non_empty(options.due.as_deref()) {
            args.push(format!("due:{}", due));
        }

        self.store.run(&args).await?;
        tracing::info!(status = %status, platforms = %join_platforms(&unique), "Created post");

        if content.chars().count() > SUMMARY_LENGTH || options.metadata.is_some() {
            self.annotate_latest(&summary, status, content, options.metadata.as_ref())
                .await?;
        }

        Ok(format!(
            "Created {} post for {}",
            status,
            join_platforms(&unique)
        ))
    }

    /// Find the post just created and attach the full content as notes.
    ///
    /// The store does not report the ID of a new task, so this looks it up:
    /// the most recently created record with the same status whose summary
    /// matches, falling back to the most recent one with that status.
    async fn annotate_latest(
        &self,
        summary: &str,
        status: Status,
        content: &str,
        metadata: Option<&PostMetadata>,
    ) -> Result<(), RepositoryError> {
        let candidates = self.list(ListFilter::status(status)).await?;
        let latest = most_recent(candidates.iter().filter(|r| r.summary == summary))
            .or_else(|| most_recent(candidates.iter()));

        let Some(record) = latest else {
            tracing::warn!(status = %status, "Created post not found; full content not attached");
            return Ok(());
        };

        let notes = encode_notes(content, metadata);
        self.store
            .run(&["note".to_string(), record.id.to_string(), notes])
            .await?;
        tracing::debug!(post_id = %record.id, "Attached notes to post");
        Ok(())
    }

    /// List posts matching the filter, in the store's own order
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<TaskRecord>, RepositoryError> {
        let mut args = vec!["next".to_string(), tags::add(tags::SOCIAL_TAG)];
        if let Some(status) = filter.status {
            args.push(tags::add(tags::encode_status(status)));
        }
        if let Some(platform) = filter.platform {
            args.push(tags::add(tags::encode_platform(platform)));
        }
        if let Some(campaign) = non_empty(filter.campaign.as_deref()) {
            args.push(format!("project:{}", campaign));
        }

        let mut records = self.store.query(&args).await?;
        // Guard against stores that ignore tag filters
        records.retain(|r| r.has_tag(tags::SOCIAL_TAG));

        if let Some(limit) = filter.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Look up a post by scanning every open post (the store has no point lookup)
    pub async fn get(&self, id: &PostId) -> Result<Option<TaskRecord>, RepositoryError> {
        let records = self.list(ListFilter::default()).await?;
        Ok(records.into_iter().find(|r| &r.id == id))
    }

    /// Move a post to `scheduled` and set its due date in one mutation
    pub async fn schedule(&self, id: &PostId, date: &str) -> Result<String, RepositoryError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(RepositoryError::Validation("Date is required".to_string()));
        }

        let mut args = vec!["modify".to_string(), id.to_string()];
        args.extend(tags::status_transition(Status::Scheduled));
        args.push(format!("due:{}", date));
        self.store.run(&args).await?;

        tracing::info!(post_id = %id, due = %date, "Scheduled post");
        Ok(format!("Scheduled post {} for {}", id, date))
    }

    /// Move a post back to `draft`; the due date is left in place but ignored
    pub async fn cancel(&self, id: &PostId) -> Result<String, RepositoryError> {
        self.transition(id, Status::Draft).await?;
        tracing::info!(post_id = %id, "Cancelled post");
        Ok(format!("Cancelled post {}, moved to drafts", id))
    }

    /// Permanently remove a post
    pub async fn delete(&self, id: &PostId) -> Result<String, RepositoryError> {
        self.store
            .run(&["remove".to_string(), id.to_string()])
            .await?;
        tracing::info!(post_id = %id, "Deleted post");
        Ok(format!("Deleted post {}", id))
    }

    /// Scheduled posts due within the next `hours`, bounds inclusive.
    ///
    /// A window reaching past the last representable date has no upper bound.
    pub async fn upcoming(&self, hours: u32) -> Result<Vec<TaskRecord>, RepositoryError> {
        let now = self.clock.now();
        let until = now.checked_add(Duration::hours(i64::from(hours)));

        let posts = self.list(ListFilter::status(Status::Scheduled)).await?;
        Ok(posts
            .into_iter()
            .filter(|post| {
                post.due
                    .is_some_and(|due| due >= now && until.is_none_or(|until| due <= until))
            })
            .collect())
    }

    /// Replace whatever status tags a post carries with `target`
    pub async fn transition(&self, id: &PostId, target: Status) -> Result<(), RepositoryError> {
        let mut args = vec!["modify".to_string(), id.to_string()];
        args.extend(tags::status_transition(target));
        self.store.run(&args).await?;
        Ok(())
    }

    /// Mark a post published and resolve its task
    pub async fn mark_published(&self, id: &PostId) -> Result<(), RepositoryError> {
        self.transition(id, Status::Published).await?;
        self.store.run(&["done".to_string(), id.to_string()]).await?;
        Ok(())
    }

    /// Add the failed tag without clearing the current status tag.
    ///
    /// Additive, unlike every other transition; kept for compatibility with
    /// posts already in the store.
    pub async fn mark_failed(&self, id: &PostId) -> Result<(), RepositoryError> {
        self.store
            .run(&[
                "modify".to_string(),
                id.to_string(),
                tags::add(tags::encode_status(Status::Failed)),
            ])
            .await?;
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Record with the latest creation time; ties go to the later record
fn most_recent<'a>(records: impl Iterator<Item = &'a TaskRecord>) -> Option<&'a TaskRecord> {
    records.max_by_key(|r| r.created)
}

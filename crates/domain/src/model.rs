//! Domain models and value objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::tags::{self, TagError};

/// Timestamp the task store reports for "no value"
pub const UNSET_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Number of characters of content kept in a post's summary
pub const SUMMARY_LENGTH: usize = 100;

/// Line separating raw content from serialized metadata in notes
pub const NOTES_DELIMITER: &str = "---";

/// Lifecycle status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Draft,
        Status::Scheduled,
        Status::Published,
        Status::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        tags::encode_status(*self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| TagError::UnsupportedValue {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Destination platform for a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Mastodon,
    Bluesky,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Mastodon,
        Platform::Bluesky,
    ];

    pub fn as_str(&self) -> &'static str {
        tags::encode_platform(*self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s.trim())
            .ok_or_else(|| TagError::UnsupportedValue {
                kind: "platform",
                value: s.to_string(),
            })
    }
}

/// Parse a comma-separated platform list such as `twitter,linkedin`
pub fn parse_platform_list(raw: &str) -> Result<Vec<Platform>, TagError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Platform::from_str)
        .collect()
}

/// Join platforms for human-readable messages
pub fn join_platforms<'a>(platforms: impl IntoIterator<Item = &'a Platform>) -> String {
    platforms
        .into_iter()
        .map(Platform::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Store-assigned task identifier.
///
/// The store reports numeric IDs in its JSON while callers pass them around as
/// text, so both forms are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PostId::from(n),
            Raw::Text(s) => PostId::new(s),
        })
    }
}

/// A task record as reported by the task store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
    pub id: PostId,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, with = "store_timestamp")]
    pub created: Option<OffsetDateTime>,
    #[serde(default, with = "store_timestamp")]
    pub resolved: Option<OffsetDateTime>,
    #[serde(default, with = "store_timestamp")]
    pub due: Option<OffsetDateTime>,
}

impl TaskRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| tags::normalize(t) == tag)
    }

    /// Campaign label, if the record has a project
    pub fn campaign(&self) -> Option<&str> {
        let project = self.project.trim();
        (!project.is_empty()).then_some(project)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for store timestamps: the unset sentinel maps to `None`.
pub mod store_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => {
                let formatted = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_str(UNSET_TIMESTAMP),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

/// Parse a timestamp as written by the store or typed by a user.
///
/// Accepts RFC 3339 and `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC). The unset
/// sentinel, empty strings, and anything unparseable yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == UNSET_TIMESTAMP {
        return None;
    }

    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(ts);
    }

    const LOCAL_FORMATS: [&str; 2] = [
        "[year]-[month]-[day]T[hour]:[minute]:[second]",
        "[year]-[month]-[day]T[hour]:[minute]",
    ];

    LOCAL_FORMATS.iter().find_map(|pattern| {
        let format = time::format_description::parse(pattern).ok()?;
        PrimitiveDateTime::parse(trimmed, &format)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    })
}

/// Structured payload stored beneath the content in a post's notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
}

/// Compose the notes text for a post: content, then metadata under a delimiter line
pub fn encode_notes(content: &str, metadata: Option<&PostMetadata>) -> String {
    let mut lines = vec![content.to_string()];
    if let Some(metadata) = metadata {
        lines.push(NOTES_DELIMITER.to_string());
        // PostMetadata only holds strings and enums; serialization cannot fail
        lines.push(serde_json::to_string_pretty(metadata).unwrap_or_default());
    }
    lines.join("\n")
}

/// Split notes back into content and optional metadata.
///
/// Only the last delimiter line counts, and only if what follows parses as
/// metadata; otherwise the notes are all content.
pub fn decode_notes(notes: &str) -> (String, Option<PostMetadata>) {
    let marker = format!("\n{}\n", NOTES_DELIMITER);
    if let Some(pos) = notes.rfind(&marker) {
        let (content, rest) = notes.split_at(pos);
        let payload = &rest[marker.len()..];
        if let Ok(metadata) = serde_json::from_str::<PostMetadata>(payload) {
            return (content.to_string(), Some(metadata));
        }
    }
    (notes.to_string(), None)
}

/// First [`SUMMARY_LENGTH`] characters of the content
pub fn summarize(content: &str) -> String {
    content.chars().take(SUMMARY_LENGTH).collect()
}

/// A social post decoded from its task record
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub summary: String,
    /// Full text from the notes, or the summary when no notes were attached
    pub content: String,
    pub status: Option<Status>,
    /// Target platforms in the order their tags appear on the record
    pub platforms: Vec<Platform>,
    pub campaign: Option<String>,
    pub due: Option<OffsetDateTime>,
    pub metadata: Option<PostMetadata>,
}

impl Post {
    pub fn from_record(record: &TaskRecord) -> Self {
        let (notes_content, metadata) = decode_notes(&record.notes);
        let content = if notes_content.trim().is_empty() {
            record.summary.clone()
        } else {
            notes_content
        };

        Self {
            id: record.id.clone(),
            summary: record.summary.clone(),
            content,
            status: tags::decode_status(&record.tags),
            platforms: tags::decode_platforms(&record.tags),
            campaign: record.campaign().map(String::from),
            due: record.due,
            metadata,
        }
    }
}

/// Outcome of one platform's publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlatformOutcome {
    pub fn delivered(platform: Platform) -> Self {
        Self {
            platform,
            success: true,
            error: None,
        }
    }

    pub fn failed(platform: Platform, reason: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Aggregate verdict over all platform outcomes of a publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishVerdict {
    Published,
    PartiallyFailed,
    Failed,
}

impl PublishVerdict {
    pub fn from_outcomes(outcomes: &[PlatformOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        if succeeded == outcomes.len() && succeeded > 0 {
            PublishVerdict::Published
        } else if succeeded == 0 {
            PublishVerdict::Failed
        } else {
            PublishVerdict::PartiallyFailed
        }
    }
}

/// Result of a publish attempt that did not fail outright
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub post_id: PostId,
    pub verdict: PublishVerdict,
    pub outcomes: Vec<PlatformOutcome>,
}

impl PublishReport {
    pub fn succeeded(&self) -> Vec<Platform> {
        self.outcomes
            .iter()
            .filter(|o| o.success)
            .map(|o| o.platform)
            .collect()
    }

    pub fn failures(&self) -> Vec<&PlatformOutcome> {
        self.outcomes.iter().filter(|o| !o.success).collect()
    }

    /// Human-readable summary returned to callers
    pub fn message(&self) -> String {
        match self.verdict {
            PublishVerdict::Published => format!(
                "Published post {} to {}",
                self.post_id,
                join_platforms(&self.succeeded())
            ),
            _ => format!(
                "Partially published post {}: succeeded on {}; failed on {}",
                self.post_id,
                join_platforms(&self.succeeded()),
                describe_failures(&self.failures())
            ),
        }
    }
}

/// Render failed outcomes as `platform (reason), ...`
pub fn describe_failures(failures: &[&PlatformOutcome]) -> String {
    failures
        .iter()
        .map(|o| match &o.error {
            Some(reason) => format!("{} ({})", o.platform, reason),
            None => o.platform.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(due: &str) -> String {
        format!(
            r#"{{"uuid":"u-1","status":"pending","id":7,"summary":"hello","notes":"","tags":["social","draft","twitter"],"project":"launch","priority":"P2","created":"2026-01-10T10:00:00Z","resolved":"{}","due":"{}"}}"#,
            UNSET_TIMESTAMP, due
        )
    }

    #[test]
    fn test_task_record_numeric_id_and_unset_due() {
        let record: TaskRecord = serde_json::from_str(&record_json(UNSET_TIMESTAMP)).unwrap();
        assert_eq!(record.id.as_str(), "7");
        assert!(record.due.is_none());
        assert!(record.resolved.is_none());
        assert!(record.created.is_some());
        assert_eq!(record.campaign(), Some("launch"));
    }

    #[test]
    fn test_task_record_null_tags() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"id":"3","summary":"x","tags":null}"#).unwrap();
        assert!(record.tags.is_empty());
        assert!(record.due.is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2026-01-15T14:00").is_some());
        assert!(parse_timestamp("2026-01-15T14:00:30").is_some());
        assert!(parse_timestamp("2026-01-15T14:00:00+01:00").is_some());
        assert!(parse_timestamp(UNSET_TIMESTAMP).is_none());
        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_notes_roundtrip_with_metadata() {
        let metadata = PostMetadata {
            thread: Some(vec!["one".to_string(), "two".to_string()]),
            media: None,
            platforms: Some(vec![Platform::Twitter]),
        };
        let notes = encode_notes("Body text", Some(&metadata));
        assert!(notes.starts_with("Body text\n---\n{"));

        let (content, decoded) = decode_notes(&notes);
        assert_eq!(content, "Body text");
        assert_eq!(decoded, Some(metadata));
    }

    #[test]
    fn test_decode_notes_keeps_plain_delimiters_in_content() {
        let notes = "Intro\n---\nnot json at all";
        let (content, metadata) = decode_notes(notes);
        assert_eq!(content, notes);
        assert!(metadata.is_none());
    }

    #[test]
    fn test_summarize_counts_characters() {
        let content = "é".repeat(150);
        assert_eq!(summarize(&content).chars().count(), SUMMARY_LENGTH);
    }

    #[test]
    fn test_post_from_record_prefers_notes() {
        let mut record: TaskRecord =
            serde_json::from_str(&record_json("2026-02-01T09:00:00Z")).unwrap();
        record.notes = "The full text".to_string();

        let post = Post::from_record(&record);
        assert_eq!(post.content, "The full text");
        assert_eq!(post.status, Some(Status::Draft));
        assert!(post.platforms.contains(&Platform::Twitter));
        assert!(post.due.is_some());

        record.notes.clear();
        assert_eq!(Post::from_record(&record).content, "hello");
    }

    #[test]
    fn test_verdict_from_outcomes() {
        let ok = PlatformOutcome::delivered(Platform::Twitter);
        let bad = PlatformOutcome::failed(Platform::Linkedin, "boom");

        assert_eq!(
            PublishVerdict::from_outcomes(&[ok.clone()]),
            PublishVerdict::Published
        );
        assert_eq!(
            PublishVerdict::from_outcomes(&[bad.clone()]),
            PublishVerdict::Failed
        );
        assert_eq!(
            PublishVerdict::from_outcomes(&[ok, bad]),
            PublishVerdict::PartiallyFailed
        );
    }

    #[test]
    fn test_parse_platform_list() {
        assert_eq!(
            parse_platform_list("twitter, bluesky").unwrap(),
            vec![Platform::Twitter, Platform::Bluesky]
        );
        assert!(parse_platform_list("twitter,myspace").is_err());
    }
}

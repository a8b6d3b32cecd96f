//! Tag codec: maps post status and platforms to and from task tags
//!
//! Tags are stored without the `+`/`-` prefix the store's command line uses
//! to add or remove them; [`add`] and [`remove`] produce those arguments.

use crate::model::{Platform, Status};

/// Marker carried by every post so unrelated store records are never touched
pub const SOCIAL_TAG: &str = "social";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Unsupported {kind}: {value}")]
    UnsupportedValue { kind: &'static str, value: String },
}

pub fn encode_status(status: Status) -> &'static str {
    match status {
        Status::Draft => "draft",
        Status::Scheduled => "scheduled",
        Status::Published => "published",
        Status::Failed => "failed",
    }
}

pub fn encode_platform(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "twitter",
        Platform::Linkedin => "linkedin",
        Platform::Mastodon => "mastodon",
        Platform::Bluesky => "bluesky",
    }
}

/// Strip a leading `+` some store versions echo back on tags
pub fn normalize(tag: &str) -> &str {
    tag.trim().trim_start_matches('+')
}

/// First status tag present, if any
pub fn decode_status(tags: &[String]) -> Option<Status> {
    tags.iter().find_map(|tag| normalize(tag).parse().ok())
}

/// Every status tag present, in tag order
pub fn decode_statuses(tags: &[String]) -> Vec<Status> {
    tags.iter()
        .filter_map(|tag| normalize(tag).parse().ok())
        .collect()
}

/// All platform tags present, in the order they first appear; duplicates collapsed
pub fn decode_platforms(tags: &[String]) -> Vec<Platform> {
    let mut platforms = Vec::new();
    for platform in tags.iter().filter_map(|tag| normalize(tag).parse().ok()) {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    platforms
}

/// Whether a tag is the social marker or a non-failure status tag.
/// `failed` is not bookkeeping: it marks a post that needs attention.
pub fn is_bookkeeping_tag(tag: &str) -> bool {
    let tag = normalize(tag);
    tag == SOCIAL_TAG || tag.parse::<Status>().is_ok_and(|s| s != Status::Failed)
}

/// Command-line argument adding a tag
pub fn add(tag: &str) -> String {
    format!("+{}", tag)
}

/// Command-line argument removing a tag
pub fn remove(tag: &str) -> String {
    format!("-{}", tag)
}

/// Tag deltas moving a post to `target`: every other status tag is removed
/// before the new one is added, so a post never holds two status tags.
pub fn status_transition(target: Status) -> Vec<String> {
    Status::ALL
        .into_iter()
        .filter(|status| *status != target)
        .map(|status| remove(encode_status(status)))
        .chain(std::iter::once(add(encode_status(target))))
        .collect()
}

/// Tag set for a newly created post
pub fn creation_tags(status: Status, platforms: &[Platform]) -> Vec<String> {
    std::iter::once(add(SOCIAL_TAG))
        .chain(std::iter::once(add(encode_status(status))))
        .chain(platforms.iter().map(|p| add(encode_platform(*p))))
        .collect()
}

//! In-memory task store for testing and offline mode
//!
//! Understands the subset of the dstask command line the scheduler issues:
//! `add`, `note`, `modify`, `done`, `remove` and `next`. Query output is
//! printed the way dstask prints it (banner, JSON array, trailer) and parsed
//! back through the same extractor the process-backed store uses.

use async_trait::async_trait;
use social_scheduler_domain::{
    Clock, StoreError, SystemClock, TaskRecord, TaskStore, parse_timestamp, tags,
};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::store_output::{ParseMode, parse_records};

const PENDING: &str = "pending";
const RESOLVED: &str = "resolved";
const DEFAULT_PRIORITY: &str = "P2";

#[derive(Default)]
struct State {
    tasks: Vec<TaskRecord>,
    next_id: u64,
}

/// In-memory task store implementation
pub struct InMemoryTaskStore {
    state: RwLock<State>,
    clock: Arc<dyn Clock>,
}

/// One parsed command-line token after the verb and ID
enum Token<'a> {
    AddTag(&'a str),
    RemoveTag(&'a str),
    Project(&'a str),
    Due(&'a str),
    Priority(&'a str),
    Word(&'a str),
}

fn tokenize(arg: &str) -> Token<'_> {
    if let Some(tag) = arg.strip_prefix('+').filter(|t| !t.is_empty()) {
        Token::AddTag(tag)
    } else if let Some(tag) = arg.strip_prefix('-').filter(|t| !t.is_empty()) {
        Token::RemoveTag(tag)
    } else if let Some(project) = arg.strip_prefix("project:") {
        Token::Project(project)
    } else if let Some(due) = arg.strip_prefix("due:") {
        Token::Due(due)
    } else if matches!(arg, "P0" | "P1" | "P2" | "P3") {
        Token::Priority(arg)
    } else {
        Token::Word(arg)
    }
}

fn failed(message: impl Into<String>) -> StoreError {
    StoreError::CommandFailed {
        status: "exit status: 1".to_string(),
        stderr: message.into(),
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(State {
                tasks: vec![],
                next_id: 1,
            }),
            clock,
        }
    }

    /// Every task held, resolved ones included
    pub fn records(&self) -> Vec<TaskRecord> {
        self.state
            .read()
            .map(|state| state.tasks.clone())
            .unwrap_or_default()
    }

    fn execute(&self, args: &[String]) -> Result<String, StoreError> {
        let Some((verb, rest)) = args.split_first() else {
            return Err(failed("no command given"));
        };

        match verb.as_str() {
            "add" => self.add(rest),
            "note" => self.note(rest),
            "modify" => self.modify(rest),
            "done" => self.resolve(rest),
            "remove" => self.remove(rest),
            "next" => self.next(rest),
            other => Err(failed(format!("unknown command: {}", other))),
        }
    }

    fn add(&self, args: &[String]) -> Result<String, StoreError> {
        let now = self.clock.now();
        let mut record = TaskRecord {
            uuid: Uuid::new_v4().to_string(),
            status: PENDING.to_string(),
            id: "0".into(),
            summary: String::new(),
            notes: String::new(),
            tags: vec![],
            project: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            created: Some(now),
            resolved: None,
            due: None,
        };

        let mut words = Vec::new();
        for arg in args {
            match tokenize(arg) {
                Token::Word(word) => words.push(word),
                Token::RemoveTag(_) => {}
                token => apply(&mut record, token)?,
            }
        }
        record.summary = words.join(" ");
        if record.summary.trim().is_empty() {
            return Err(failed("task summary is required"));
        }

        let mut state = self.state.write().map_err(poisoned)?;
        record.id = state.next_id.into();
        state.next_id += 1;

        let message = format!("Added {}: {}", record.id, record.summary);
        state.tasks.push(record);
        Ok(message)
    }

    fn note(&self, args: &[String]) -> Result<String, StoreError> {
        let (id, text) = split_id(args)?;
        let text = text.join(" ");
        self.with_task(id, |task| {
            task.notes = text;
            Ok(format!("Noted {}", task.id))
        })
    }

    fn modify(&self, args: &[String]) -> Result<String, StoreError> {
        let (id, changes) = split_id(args)?;
        self.with_task(id, |task| {
            for change in changes {
                match tokenize(change) {
                    Token::Word(word) => {
                        return Err(failed(format!("unexpected argument: {}", word)));
                    }
                    token => apply(task, token)?,
                }
            }
            Ok(format!("Modified {}", task.id))
        })
    }

    fn resolve(&self, args: &[String]) -> Result<String, StoreError> {
        let (id, _) = split_id(args)?;
        let now = self.clock.now();
        self.with_task(id, |task| {
            task.status = RESOLVED.to_string();
            task.resolved = Some(now);
            Ok(format!("Resolved {}", task.id))
        })
    }

    fn remove(&self, args: &[String]) -> Result<String, StoreError> {
        let (id, _) = split_id(args)?;
        let mut state = self.state.write().map_err(poisoned)?;
        let index = state
            .tasks
            .iter()
            .position(|t| t.id.as_str() == id && t.status != RESOLVED)
            .ok_or_else(|| failed(format!("no task with ID {}", id)))?;
        let removed = state.tasks.remove(index);
        Ok(format!("Removed {}: {}", removed.id, removed.summary))
    }

    fn next(&self, filters: &[String]) -> Result<String, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut matching: Vec<&TaskRecord> = state
            .tasks
            .iter()
            .filter(|t| t.status == PENDING)
            .filter(|t| {
                filters.iter().all(|filter| match tokenize(filter) {
                    Token::AddTag(tag) => t.has_tag(tag),
                    Token::RemoveTag(tag) => !t.has_tag(tag),
                    Token::Project(project) => t.project == project,
                    Token::Priority(priority) => t.priority == priority,
                    Token::Due(_) | Token::Word(_) => true,
                })
            })
            .collect();
        matching.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.created.cmp(&b.created)));

        let json = serde_json::to_string_pretty(&matching)
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(format!(
            "Using in-memory repository\n{}\n{} task(s) shown",
            json,
            matching.len()
        ))
    }

    fn with_task<F>(&self, id: &str, update: F) -> Result<String, StoreError>
    where
        F: FnOnce(&mut TaskRecord) -> Result<String, StoreError>,
    {
        let mut state = self.state.write().map_err(poisoned)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id.as_str() == id && t.status != RESOLVED)
            .ok_or_else(|| failed(format!("no task with ID {}", id)))?;
        update(task)
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn split_id(args: &[String]) -> Result<(&str, &[String]), StoreError> {
    match args.split_first() {
        Some((id, rest)) if !id.trim().is_empty() => Ok((id.trim(), rest)),
        _ => Err(failed("task ID is required")),
    }
}

fn apply(task: &mut TaskRecord, token: Token<'_>) -> Result<(), StoreError> {
    match token {
        Token::AddTag(tag) => {
            if !task.has_tag(tag) {
                task.tags.push(tag.to_string());
            }
        }
        Token::RemoveTag(tag) => task.tags.retain(|t| tags::normalize(t) != tag),
        Token::Project(project) => task.project = project.to_string(),
        Token::Due(raw) => {
            task.due = Some(
                parse_timestamp(raw).ok_or_else(|| failed(format!("invalid due date: {}", raw)))?,
            );
        }
        Token::Priority(priority) => task.priority = priority.to_string(),
        Token::Word(_) => {}
    }
    Ok(())
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn run(&self, args: &[String]) -> Result<String, StoreError> {
        self.execute(args)
    }

    async fn query(&self, args: &[String]) -> Result<Vec<TaskRecord>, StoreError> {
        let output = self.execute(args)?;
        parse_records(&output, ParseMode::Strict)
    }
}

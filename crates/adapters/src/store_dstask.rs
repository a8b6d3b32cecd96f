//! dstask-backed task store, driven as a child process

use async_trait::async_trait;
use social_scheduler_domain::{StoreError, TaskRecord, TaskStore};
use std::io::ErrorKind;
use std::process::Stdio;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::process::Command;

use crate::store_output::{ParseMode, parse_records};

/// Whether to launch the store through `mise exec`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiseMode {
    /// Use mise when `mise --version` succeeds
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for MiseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(MiseMode::Auto),
            "always" => Ok(MiseMode::Always),
            "never" => Ok(MiseMode::Never),
            other => Err(format!("Invalid mise mode: {}", other)),
        }
    }
}

/// Resolves the program and leading arguments used to invoke the store.
///
/// The mise probe runs at most once per launcher; [`StoreLauncher::reset`]
/// forgets the result.
#[derive(Debug)]
pub struct StoreLauncher {
    command: String,
    base_args: Vec<String>,
    mode: MiseMode,
    mise_available: Mutex<Option<bool>>,
}

impl StoreLauncher {
    pub fn new(command: String, base_args: Vec<String>, mode: MiseMode) -> Self {
        Self {
            command,
            base_args,
            mode,
            mise_available: Mutex::new(None),
        }
    }

    /// Program plus the arguments that precede every store command
    pub async fn program(&self) -> (String, Vec<String>) {
        let use_mise = match self.mode {
            MiseMode::Always => true,
            MiseMode::Never => false,
            MiseMode::Auto => self.mise_available().await,
        };

        if use_mise {
            let mut args = vec!["exec".to_string(), "--".to_string(), self.command.clone()];
            args.extend(self.base_args.iter().cloned());
            ("mise".to_string(), args)
        } else {
            (self.command.clone(), self.base_args.clone())
        }
    }

    /// Memoized probe result, if one has been taken
    pub fn cached(&self) -> Option<bool> {
        self.mise_available.lock().ok().and_then(|guard| *guard)
    }

    pub fn reset(&self) {
        if let Ok(mut guard) = self.mise_available.lock() {
            *guard = None;
        }
    }

    async fn mise_available(&self) -> bool {
        if let Some(available) = self.cached() {
            return available;
        }

        // Racing probes write the same answer, so the lock is not held across the await
        let available = Command::new("mise")
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        tracing::debug!(available = available, "Probed for mise");
        if let Ok(mut guard) = self.mise_available.lock() {
            *guard = Some(available);
        }
        available
    }
}

/// Task store that shells out to the `dstask` CLI
pub struct DstaskStore {
    launcher: Arc<StoreLauncher>,
    parse_mode: ParseMode,
}

struct CommandOutput {
    stdout: String,
    stderr: String,
}

impl DstaskStore {
    pub fn new(launcher: Arc<StoreLauncher>, parse_mode: ParseMode) -> Self {
        Self {
            launcher,
            parse_mode,
        }
    }

    async fn execute(&self, args: &[String]) -> Result<CommandOutput, StoreError> {
        let (program, base_args) = self.launcher.program().await;
        tracing::debug!(program = %program, args = ?args, "Running task store command");

        let output = Command::new(&program)
            .args(&base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    StoreError::Unavailable(format!("Failed to run {}: {}", program, e))
                }
                _ => StoreError::Unavailable(format!("Failed to spawn {}: {}", program, e)),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(StoreError::CommandFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[async_trait]
impl TaskStore for DstaskStore {
    async fn run(&self, args: &[String]) -> Result<String, StoreError> {
        let output = self.execute(args).await?;
        Ok(output.stdout.trim().to_string())
    }

    async fn query(&self, args: &[String]) -> Result<Vec<TaskRecord>, StoreError> {
        let output = self.execute(args).await?;
        let combined = format!("{}\n{}", output.stdout, output.stderr);
        parse_records(&combined, self.parse_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh_store(script: &str, mode: ParseMode) -> DstaskStore {
        let launcher = StoreLauncher::new(
            "sh".to_string(),
            vec!["-c".to_string(), script.to_string(), "dstask".to_string()],
            MiseMode::Never,
        );
        DstaskStore::new(Arc::new(launcher), mode)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_mise_mode_parse() {
        assert_eq!("auto".parse::<MiseMode>().unwrap(), MiseMode::Auto);
        assert_eq!("never".parse::<MiseMode>().unwrap(), MiseMode::Never);
        assert!("sometimes".parse::<MiseMode>().is_err());
    }

    #[tokio::test]
    async fn test_launcher_wraps_with_mise_when_forced() {
        let launcher = StoreLauncher::new("dstask".to_string(), vec![], MiseMode::Always);
        let (program, args) = launcher.program().await;
        assert_eq!(program, "mise");
        assert_eq!(args, vec!["exec", "--", "dstask"]);
        assert_eq!(launcher.cached(), None);
    }

    #[tokio::test]
    async fn test_launcher_memoizes_probe_until_reset() {
        let launcher = StoreLauncher::new("dstask".to_string(), vec![], MiseMode::Auto);
        assert_eq!(launcher.cached(), None);

        launcher.program().await;
        assert!(launcher.cached().is_some());

        launcher.reset();
        assert_eq!(launcher.cached(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_passes_args_verbatim() {
        // $1.. are the store arguments; a note with spaces must stay one argument
        let store = sh_store(r#"printf '%s|' "$@""#, ParseMode::Strict);
        let output = store
            .run(&args(&["note", "3", "two words; and $HOME"]))
            .await
            .unwrap();
        assert_eq!(output, "note|3|two words; and $HOME|");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_parses_records_after_banner() {
        let script = r#"echo "Found 1 task"; printf '[\n{"id": 2, "summary": "hi", "tags": ["social"]}\n]\n'"#;
        let store = sh_store(script, ParseMode::Strict);
        let records = store.query(&args(&["next", "+social"])).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "2");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_lenient_on_garbage() {
        let store = sh_store("echo 'not json'", ParseMode::Lenient);
        let records = store.query(&args(&["next"])).await.unwrap();
        assert!(records.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_command_failed() {
        let store = sh_store("echo 'no such task' >&2; exit 3", ParseMode::Lenient);
        let err = store.run(&args(&["done", "99"])).await.unwrap_err();
        match err {
            StoreError::CommandFailed { stderr, .. } => assert_eq!(stderr, "no such task"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let launcher = StoreLauncher::new(
            "definitely-not-a-real-dstask-binary".to_string(),
            vec![],
            MiseMode::Never,
        );
        let store = DstaskStore::new(Arc::new(launcher), ParseMode::Lenient);
        let err = store.run(&args(&["next"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}

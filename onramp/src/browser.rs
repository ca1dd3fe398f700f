//! Best-effort launch of the payment URL in the operator's browser.
//!
//! Each platform has an ordered list of launch commands; the first one
//! that exits successfully wins. Launch failure is never fatal to a
//! funding operation — the orchestrator downgrades it to a warning and
//! surfaces the URL for manual use.

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::BrowserError;

/// Ordered fallbacks tried on Linux after the desktop-default opener.
const LINUX_BROWSERS: &[&str] = &["firefox", "google-chrome", "chromium", "sensible-browser"];

/// The operating platform a launch plan is resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// macOS-class platforms (`open`).
    MacOs,
    /// Windows-class platforms (`cmd /C start`).
    Windows,
    /// Linux-class platforms (`xdg-open`, then common browsers).
    Linux,
    /// Anything else: launching is unsupported.
    Other(String),
}

impl Platform {
    /// Resolve the platform this process is running on.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The ordered launch commands for a platform, or an error for platforms
/// with no known opener. Unsupported platforms short-circuit here: no
/// command is ever attempted for them.
pub(crate) fn launch_plan(platform: &Platform, url: &str) -> Result<Vec<Vec<String>>, BrowserError> {
    let plan = match platform {
        Platform::MacOs => vec![vec!["open".to_string(), url.to_string()]],
        Platform::Windows => vec![vec![
            "cmd".to_string(),
            "/C".to_string(),
            "start".to_string(),
            // Empty title so `start` treats the URL as the target.
            String::new(),
            url.to_string(),
        ]],
        Platform::Linux => {
            let mut plan = vec![vec!["xdg-open".to_string(), url.to_string()]];
            plan.extend(
                LINUX_BROWSERS
                    .iter()
                    .map(|browser| vec![(*browser).to_string(), url.to_string()]),
            );
            plan
        }
        Platform::Other(name) => return Err(BrowserError::UnsupportedPlatform(name.clone())),
    };
    Ok(plan)
}

/// Capability to open a URL in the operator's environment.
///
/// The orchestrator holds a boxed opener so tests can observe launch
/// attempts without spawning processes.
#[async_trait]
pub trait UrlOpener: Send + Sync + fmt::Debug {
    /// Attempt to open the URL, returning an error only after every
    /// fallback for the platform has failed.
    async fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// A boxed URL opener for dynamic dispatch.
pub type BoxedUrlOpener = Box<dyn UrlOpener>;

/// Opens URLs by spawning the platform's launch commands.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    platform: Platform,
}

impl SystemOpener {
    /// Create an opener for the current platform.
    #[must_use]
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Create an opener for an explicit platform.
    #[must_use]
    pub const fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlOpener for SystemOpener {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        let plan = launch_plan(&self.platform, url)?;

        let mut last_failure = String::new();
        for command in &plan {
            match run(command).await {
                Ok(()) => {
                    debug!(command = %command[0], "opened payment URL in browser");
                    return Ok(());
                }
                Err(failure) => {
                    debug!(command = %command[0], %failure, "browser launch attempt failed");
                    last_failure = failure;
                }
            }
        }

        Err(BrowserError::LaunchFailed {
            url: url.to_string(),
            detail: last_failure,
        })
    }
}

/// Run one launch command to completion with all stdio detached.
async fn run(command: &[String]) -> Result<(), String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "empty launch command".to_string())?;

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| format!("{program}: {e}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{program} exited with {status}"))
    }
}

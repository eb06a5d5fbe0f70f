//! Validator Configuration
//!
//! Engine configuration, loadable from TOML and buildable in code.
//!
//! ```toml
//! alertLookbackSecs = 600
//! waitForTerminal = true
//!
//! [poll]
//! timeoutSecs = 45
//! pollIntervalMs = 1500
//!
//! [capture]
//! enabled = true
//! logDir = ".deep-validate/learnings"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use deep_validate_checks::PollOptions;

use crate::utils::error::{AppError, AppResult};

/// Upper bound on the debugger lookback (30 days of log retention).
pub const MAX_ALERT_LOOKBACK_SECS: u64 = 30 * 24 * 60 * 60;

/// Polling budget for terminal-state waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    /// Hard wall-clock budget in seconds
    pub timeout_secs: u64,
    /// Delay between fetches in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_interval_ms: 2000,
        }
    }
}

impl PollConfig {
    pub fn options(&self) -> PollOptions {
        PollOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Where and whether failure diagnostics are captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    pub enabled: bool,
    /// Root directory of the append logs; one subdirectory per session
    pub log_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: PathBuf::from(".deep-validate/learnings"),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    pub poll: PollConfig,
    /// How far back the debugger log is searched, in seconds
    pub alert_lookback_secs: u64,
    /// Poll primary resources until terminal before checking them
    pub wait_for_terminal: bool,
    /// Run analytics summary checks for completed resources
    pub check_insights: bool,
    pub capture: CaptureConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            alert_lookback_secs: 300,
            wait_for_terminal: true,
            check_insights: true,
            capture: CaptureConfig::default(),
        }
    }
}

impl ValidatorConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: ValidatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> AppResult<()> {
        if self.poll.timeout_secs == 0 {
            return Err(AppError::config("poll.timeoutSecs must be greater than zero"));
        }
        if self.poll.poll_interval_ms == 0 {
            return Err(AppError::config("poll.pollIntervalMs must be greater than zero"));
        }
        let timeout_ms = self.poll.timeout_secs.checked_mul(1000).ok_or_else(|| {
            AppError::config(format!(
                "poll.timeoutSecs ({}) is too large",
                self.poll.timeout_secs
            ))
        })?;
        if self.poll.poll_interval_ms > timeout_ms {
            return Err(AppError::config(format!(
                "poll.pollIntervalMs ({}) exceeds poll.timeoutSecs ({}s)",
                self.poll.poll_interval_ms, self.poll.timeout_secs
            )));
        }
        if self.alert_lookback_secs > MAX_ALERT_LOOKBACK_SECS {
            return Err(AppError::config(format!(
                "alertLookbackSecs ({}) exceeds the maximum of {}",
                self.alert_lookback_secs, MAX_ALERT_LOOKBACK_SECS
            )));
        }
        if self.capture.enabled && self.capture.log_dir.as_os_str().is_empty() {
            return Err(AppError::config(
                "capture.logDir must be set when capture is enabled",
            ));
        }
        Ok(())
    }

    /// Debugger lookback as a chrono duration, clamped to the maximum.
    pub fn alert_lookback(&self) -> chrono::TimeDelta {
        let secs = self.alert_lookback_secs.min(MAX_ALERT_LOOKBACK_SECS) as i64;
        chrono::TimeDelta::try_seconds(secs).unwrap_or(chrono::TimeDelta::zero())
    }
}

/// Builder for `ValidatorConfig`; validation happens in `build()`.
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout_secs = timeout.as_secs();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn alert_lookback_secs(mut self, secs: u64) -> Self {
        self.config.alert_lookback_secs = secs;
        self
    }

    pub fn wait_for_terminal(mut self, wait: bool) -> Self {
        self.config.wait_for_terminal = wait;
        self
    }

    pub fn check_insights(mut self, check: bool) -> Self {
        self.config.check_insights = check;
        self
    }

    pub fn capture(mut self, enabled: bool) -> Self {
        self.config.capture.enabled = enabled;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.capture.log_dir = dir.into();
        self
    }

    pub fn build(self) -> AppResult<ValidatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

use std::str::FromStr;
use std::time::Duration;

use saw_automation::poller::PollConfig;
use validator::Validate;

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("Invalid poll settings: {0}")]
    PollSettings(#[from] validator::ValidationErrors),

    #[error("POLL_MAX_INTERVAL_MS ({max}) must not be below POLL_INITIAL_INTERVAL_MS ({initial})")]
    PollIntervals { initial: u64, max: u64 },

    #[error(
        "RESPONSE_MARGIN_SECS ({margin}) must be positive and less than EXECUTION_BUDGET_SECS ({budget})"
    )]
    Budget { budget: u64, margin: u64 },
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Backoff settings for the execution poller.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PollSettings {
    #[validate(range(min = 1))]
    pub initial_interval_ms: u64,
    #[validate(range(min = 1))]
    pub max_interval_ms: u64,
    #[validate(range(min = 1.0, max = 10.0))]
    pub multiplier: f64,
    #[validate(range(max = 10))]
    pub max_query_retries: u32,
}

impl PollSettings {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            multiplier: self.multiplier,
            max_query_retries: self.max_query_retries,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Hard wall-clock limit the hosting environment gives one invocation.
    pub execution_budget: Duration,
    /// Part of the budget kept back for building and sending the response.
    pub response_margin: Duration,
    pub poll: PollSettings,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `HOST`                     | `0.0.0.0` |
    /// | `PORT`                     | `3000`    |
    /// | `EXECUTION_BUDGET_SECS`    | `900`     |
    /// | `RESPONSE_MARGIN_SECS`     | `15`      |
    /// | `POLL_INITIAL_INTERVAL_MS` | `2000`    |
    /// | `POLL_MAX_INTERVAL_MS`     | `10000`   |
    /// | `POLL_BACKOFF_MULTIPLIER`  | `2.0`     |
    /// | `POLL_MAX_QUERY_RETRIES`   | `3`       |
    /// | `LOG_FORMAT`               | `pretty`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;

        let budget_secs: u64 = parse_or(&lookup, "EXECUTION_BUDGET_SECS", 900)?;
        let margin_secs: u64 = parse_or(&lookup, "RESPONSE_MARGIN_SECS", 15)?;
        if margin_secs == 0 || margin_secs >= budget_secs {
            return Err(ConfigError::Budget {
                budget: budget_secs,
                margin: margin_secs,
            });
        }

        let poll = PollSettings {
            initial_interval_ms: parse_or(&lookup, "POLL_INITIAL_INTERVAL_MS", 2000)?,
            max_interval_ms: parse_or(&lookup, "POLL_MAX_INTERVAL_MS", 10_000)?,
            multiplier: parse_or(&lookup, "POLL_BACKOFF_MULTIPLIER", 2.0)?,
            max_query_retries: parse_or(&lookup, "POLL_MAX_QUERY_RETRIES", 3)?,
        };
        poll.validate()?;
        if poll.max_interval_ms < poll.initial_interval_ms {
            return Err(ConfigError::PollIntervals {
                initial: poll.initial_interval_ms,
                max: poll.max_interval_ms,
            });
        }

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            execution_budget: Duration::from_secs(budget_secs),
            response_margin: Duration::from_secs(margin_secs),
            poll,
            log_format,
        })
    }

    /// Time one troubleshooting request may take, strictly inside the
    /// hosting budget.
    pub fn request_budget(&self) -> Duration {
        self.execution_budget.saturating_sub(self.response_margin)
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

// Logger configuration
use serde::{Deserialize, Serialize};

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output (development)
    Pretty,
    /// Structured JSON output (production)
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    /// Mask emails, phone numbers and license numbers in text output
    pub redaction_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            redaction_enabled: true,
        }
    }
}

impl LoggerConfig {
    /// Directive used when no `RUST_LOG` filter is present
    pub fn filter_directive(&self) -> String {
        format!(
            "{level},tower_http=info,sqlx=warn,hyper=info",
            level = self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.redaction_enabled);
        assert!(config.filter_directive().starts_with("info,"));
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"level":"debug","format":"json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");
        assert!(config.redaction_enabled);
    }
}

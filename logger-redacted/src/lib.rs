//! Tracing setup with automatic PII redaction
//!
//! Healthcare credentials (emails, phone numbers, council registration
//! numbers) routinely end up in log messages. The pretty formatter installed
//! by [`init_tracing`] passes every field through a [`PiiRedactor`] before it
//! is written. JSON output is emitted as-is, so call sites log identifiers
//! through [`redact_email`] instead of raw values.
//!
//! # Example
//!
//! ```no_run
//! use logger_redacted::{init_tracing, LoggerConfig};
//!
//! init_tracing(&LoggerConfig::default()).expect("logger");
//! tracing::info!("User john.doe@example.com logged in");
//! // Output: "User j***@example.com logged in"
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install global subscriber: {0}")]
    Init(#[from] TryInitError),

    #[error("invalid redaction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when present.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directive())?,
    };

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?,
        LogFormat::Pretty => {
            let fields = RedactingFields::from_config(config)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .fmt_fields(fields),
                )
                .try_init()?
        }
    }

    Ok(())
}

/// Field formatter that redacts every recorded value
#[derive(Debug, Clone, Default)]
pub struct RedactingFields {
    redactor: Option<Arc<PiiRedactor>>,
}

impl RedactingFields {
    pub fn new(redactor: PiiRedactor) -> Self {
        Self {
            redactor: Some(Arc::new(redactor)),
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self, regex::Error> {
        if config.redaction_enabled {
            Ok(Self::new(PiiRedactor::new(RedactionConfig::default())?))
        } else {
            Ok(Self::default())
        }
    }
}

impl<'writer> FormatFields<'writer> for RedactingFields {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut visitor = RedactingVisitor {
            writer: &mut writer,
            redactor: self.redactor.as_deref(),
            first: true,
            result: Ok(()),
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct RedactingVisitor<'a, 'w> {
    writer: &'a mut Writer<'w>,
    redactor: Option<&'a PiiRedactor>,
    first: bool,
    result: fmt::Result,
}

impl RedactingVisitor<'_, '_> {
    fn write_field(&mut self, field: &Field, value: &str) {
        if self.result.is_err() {
            return;
        }

        let value = match self.redactor {
            Some(redactor) => redactor.redact(value),
            None => value.to_string(),
        };
        let separator = if self.first { "" } else { " " };
        self.first = false;

        self.result = if field.name() == "message" {
            write!(self.writer, "{separator}{value}")
        } else {
            write!(self.writer, "{separator}{}={value}", field.name())
        };
    }
}

impl Visit for RedactingVisitor<'_, '_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.write_field(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        self.write_field(field, &rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_redaction_has_no_redactor() {
        let config = LoggerConfig {
            redaction_enabled: false,
            ..Default::default()
        };
        let fields = RedactingFields::from_config(&config).unwrap();
        assert!(fields.redactor.is_none());
    }

    #[test]
    fn test_enabled_redaction_builds_redactor() {
        let fields = RedactingFields::from_config(&LoggerConfig::default()).unwrap();
        let redactor = fields.redactor.unwrap();
        assert_eq!(redactor.redact("a@b.org"), "a***@b.org");
    }
}

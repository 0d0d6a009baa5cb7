use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str =
    r"\b(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b";
// State-council style registration numbers, e.g. MH12345
const LICENSE_PATTERN: &str = r"\b[A-Z]{2,3}[-/]?\d{4,8}\b";

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_license_numbers: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(String, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_license_numbers: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Configuration that leaves text untouched
    pub fn disabled() -> Self {
        Self {
            redact_emails: false,
            redact_phones: false,
            redact_license_numbers: false,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug)]
pub struct PiiRedactor {
    config: RedactionConfig,
    email: Regex,
    phone: Regex,
    license: Regex,
    custom: Vec<(Regex, String)>,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Result<Self, regex::Error> {
        let custom = config
            .custom_patterns
            .iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.clone())))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            license: Regex::new(LICENSE_PATTERN)?,
            custom,
            config,
        })
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self
                .email
                .replace_all(&result, |caps: &Captures| {
                    if self.config.hash_for_correlation {
                        format!("EMAIL[{}]", hash_value(&caps[0]))
                    } else {
                        redact_email(&caps[0])
                    }
                })
                .into_owned();
        }

        if self.config.redact_phones {
            result = self
                .phone
                .replace_all(&result, |caps: &Captures| {
                    if self.config.hash_for_correlation {
                        format!("PHONE[{}]", hash_value(&caps[0]))
                    } else {
                        "(***) ***-****".to_string()
                    }
                })
                .into_owned();
        }

        if self.config.redact_license_numbers {
            result = self
                .license
                .replace_all(&result, |caps: &Captures| {
                    if self.config.hash_for_correlation {
                        format!("LICENSE[{}]", hash_value(&caps[0]))
                    } else {
                        mask_tail(&caps[0])
                    }
                })
                .into_owned();
        }

        for (pattern, replacement) in &self.custom {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }
}

/// Mask the local part of an email address, keeping the first character
/// and the domain: `john.doe@cityhospital.com` → `j***@cityhospital.com`.
pub fn redact_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// Keep the alphabetic prefix, mask the digits
fn mask_tail(value: &str) -> String {
    let prefix: String = value.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let masked = value.chars().count().saturating_sub(prefix.chars().count());
    format!("{prefix}{}", "*".repeat(masked))
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::STANDARD_NO_PAD.encode(digest.get(..8).unwrap_or_default())
}

use super::models::{Config, DATE_PLACEHOLDER};
use chrono::NaiveDate;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("source.url_template is not set")]
    MissingSourceUrl,

    #[error("source.url_template must start with http:// or https://, got '{url}'")]
    InvalidUrlScheme { url: String },

    #[error("source.date_format '{format}' is not a valid strftime pattern")]
    InvalidDateFormat { format: String },

    #[error("source.date_format '{format}' renders the same text on consecutive days")]
    DateFormatNotDaily { format: String },

    #[error("output.file_template '{template}' is invalid: {reason}")]
    InvalidFileTemplate { template: String, reason: &'static str },

    #[error("http.{field} must be positive")]
    InvalidTimeout { field: &'static str },

    #[error("http.max_body_bytes must be positive")]
    InvalidMaxBodyBytes,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_source(config)?;
    validate_output(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_source(config: &Config) -> Result<(), ValidationError> {
    let url = config.source.url_template.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingSourceUrl);
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::InvalidUrlScheme {
            url: url.to_string(),
        });
    }

    sample_date(config).map(|_| ())
}

/// Characters object_store percent-encodes in a key, so the file on disk
/// would not carry the configured name
const STORAGE_ESCAPED: &[char] = &[
    '\\', '{', '}', '^', '%', '`', '[', ']', '"', '<', '>', '~', '#', '|', '*', '?',
];

/// Render the pattern for two consecutive days. chrono panics later if a pattern
/// cannot be rendered for a plain date (bad specifiers, or time/offset fields like
/// `%H` and `%z`), and a pattern without day resolution maps every run to one file.
fn sample_date(config: &Config) -> Result<String, ValidationError> {
    let format = &config.source.date_format;
    let day = NaiveDate::default();
    let rendered = render(format, day);
    let next = day.succ_opt().and_then(|next| render(format, next));

    match (rendered, next) {
        (Some(rendered), Some(next)) if !format.is_empty() => {
            if rendered == next {
                return Err(ValidationError::DateFormatNotDaily {
                    format: format.clone(),
                });
            }
            Ok(rendered)
        }
        _ => Err(ValidationError::InvalidDateFormat {
            format: format.clone(),
        }),
    }
}

fn render(format: &str, date: NaiveDate) -> Option<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(format)).ok()?;
    Some(rendered)
}

fn validate_output(config: &Config) -> Result<(), ValidationError> {
    let template = &config.output.file_template;
    let invalid = |reason| ValidationError::InvalidFileTemplate {
        template: template.clone(),
        reason,
    };

    if !template.contains(DATE_PLACEHOLDER) {
        return Err(invalid("must contain {date}"));
    }

    let sample = template.replace(DATE_PLACEHOLDER, &sample_date(config)?);
    if sample.contains('/') || sample.contains('\\') {
        return Err(invalid("rendered file name must not contain path separators"));
    }
    if sample == "." || sample == ".." {
        return Err(invalid("rendered file name is not a file"));
    }
    if sample
        .chars()
        .any(|c| !c.is_ascii() || c.is_ascii_control() || STORAGE_ESCAPED.contains(&c))
    {
        return Err(invalid(
            "rendered file name must be printable ASCII without \\ { } ^ % ` [ ] \" < > ~ # | * ?",
        ));
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.connect_timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "connect_timeout_secs",
        });
    }

    if config.http.timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "timeout_secs",
        });
    }

    if config.http.max_body_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidMaxBodyBytes);
    }

    Ok(())
}

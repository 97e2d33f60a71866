use super::models::{Config, MAX_BATCH_LIMIT};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Poll interval must be positive")]
    ZeroPollInterval,

    #[error("batch_limit must be between 1 and {max}, got {actual}")]
    BatchLimitOutOfRange { actual: u32, max: u32 },

    #[error("Invalid timeline base_url '{url}', expected 'http://' or 'https://'")]
    InvalidBaseUrl { url: String },

    #[error("Timeline path must start with '/': {path}")]
    InvalidTimelinePath { path: String },

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },

    #[error("Store path must not be empty")]
    EmptyStorePath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_store(config)?;
    validate_poll(config)?;
    validate_timeline(config)?;
    Ok(())
}

fn validate_store(config: &Config) -> Result<(), ValidationError> {
    if config.store.path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyStorePath);
    }
    Ok(())
}

/// Interval must be non-zero and batch_limit within what the API accepts
fn validate_poll(config: &Config) -> Result<(), ValidationError> {
    if config.poll.interval.is_zero() {
        return Err(ValidationError::ZeroPollInterval);
    }

    let limit = config.poll.batch_limit;
    if limit == 0 || limit > MAX_BATCH_LIMIT {
        return Err(ValidationError::BatchLimitOutOfRange {
            actual: limit,
            max: MAX_BATCH_LIMIT,
        });
    }

    Ok(())
}

fn validate_timeline(config: &Config) -> Result<(), ValidationError> {
    let timeline = &config.timeline;

    if !(timeline.base_url.starts_with("http://") || timeline.base_url.starts_with("https://")) {
        return Err(ValidationError::InvalidBaseUrl {
            url: timeline.base_url.clone(),
        });
    }

    if !timeline.path.starts_with('/') {
        return Err(ValidationError::InvalidTimelinePath {
            path: timeline.path.clone(),
        });
    }

    for (field, value) in [
        ("connect_timeout", timeline.connect_timeout),
        ("request_timeout", timeline.request_timeout),
    ] {
        if value.is_zero() {
            return Err(ValidationError::ZeroTimeout {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

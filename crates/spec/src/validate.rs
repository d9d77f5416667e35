// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation helpers for app spec parsing

use crate::duration::parse_duration;
use crate::model::{AppSpec, Process};
use crate::parser::ParseError;
use regex::Regex;
use std::sync::LazyLock;

/// Lowercase slug: letters, digits, and inner hyphens
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static CRON_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z*?/,\-]+$").expect("constant regex pattern is valid")
});

/// Validate a fully name-injected spec.
pub(crate) fn validate_app(spec: &AppSpec) -> Result<(), ParseError> {
    validate_slug(&spec.name, "name")?;

    if spec.processes.is_empty() {
        return Err(ParseError::InvalidFormat {
            location: "process".to_string(),
            message: "at least one process is required".to_string(),
        });
    }

    for (name, process) in &spec.processes {
        validate_process(name, process)?;
    }

    for (i, endpoint) in spec.endpoints.iter().enumerate() {
        let location = format!("endpoints[{}]", i);
        if endpoint.host.trim().is_empty() {
            return Err(ParseError::InvalidFormat {
                location,
                message: "endpoint host is required".to_string(),
            });
        }
        if endpoint.process.is_empty() {
            return Err(ParseError::InvalidFormat {
                location,
                message: format!(
                    "endpoint '{}' has no target; no process declares a port",
                    endpoint.host
                ),
            });
        }
        let Some(target) = spec.process(&endpoint.process) else {
            return Err(ParseError::InvalidFormat {
                location,
                message: format!(
                    "references unknown process '{}'; available processes: {}",
                    endpoint.process,
                    sorted_keys(spec.processes.keys()),
                ),
            });
        };
        if !target.has_port() {
            return Err(ParseError::InvalidFormat {
                location,
                message: format!(
                    "endpoint '{}' targets process '{}' which declares no port",
                    endpoint.host, endpoint.process
                ),
            });
        }
    }

    for (i, key) in spec.secrets.iter().enumerate() {
        if key.trim().is_empty() {
            return Err(ParseError::InvalidFormat {
                location: format!("secrets[{}]", i),
                message: "secret key must not be empty".to_string(),
            });
        }
    }

    if let Some(ref pg) = spec.dependencies.postgres {
        if pg.database.trim().is_empty() {
            return Err(ParseError::InvalidFormat {
                location: "dependencies.postgres.database".to_string(),
                message: "database name is required".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_process(name: &str, process: &Process) -> Result<(), ParseError> {
    let location = format!("process.{}", name);
    validate_slug(name, &location)?;

    if process.is_scheduled() {
        if process.function.is_some() {
            return Err(ParseError::InvalidFormat {
                location,
                message: "'schedule' and 'function' are mutually exclusive".to_string(),
            });
        }
        if process.has_port() {
            return Err(ParseError::InvalidFormat {
                location,
                message: "scheduled process must not declare a port".to_string(),
            });
        }
        if let Err(e) = validate_cron(&process.schedule) {
            return Err(ParseError::InvalidFormat {
                location: format!("{}.schedule", location),
                message: e,
            });
        }
    }

    if let Some(max) = process.scaling.max {
        if max < process.scaling.min {
            return Err(ParseError::InvalidFormat {
                location: format!("{}.scaling", location),
                message: format!(
                    "max ({}) must be greater than or equal to min ({})",
                    max, process.scaling.min
                ),
            });
        }
    }

    if let Some(ref health) = process.health {
        if !health.path.starts_with('/') {
            return Err(ParseError::InvalidFormat {
                location: format!("{}.health.path", location),
                message: format!("health path must start with '/': {}", health.path),
            });
        }
        validate_duration_field(&health.interval, &format!("{}.health.interval", location))?;
        validate_duration_field(&health.timeout, &format!("{}.health.timeout", location))?;
    }

    if let Some(ref drain) = process.drain {
        validate_duration_field(&drain.timeout, &format!("{}.drain.timeout", location))?;
    }

    if let Some(ref function) = process.function {
        validate_duration_field(&function.timeout, &format!("{}.function.timeout", location))?;
    }

    if process.resources.cpu == 0 || process.resources.memory == 0 {
        return Err(ParseError::InvalidFormat {
            location: format!("{}.resources", location),
            message: "cpu and memory must be positive".to_string(),
        });
    }

    Ok(())
}

pub(crate) fn validate_slug(value: &str, location: &str) -> Result<(), ParseError> {
    if SLUG_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: format!(
                "'{}' must be lowercase letters, digits, and inner hyphens",
                value
            ),
        })
    }
}

/// Validate a five-field cron expression.
pub(crate) fn validate_cron(expr: &str) -> Result<(), String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!(
            "cron expression must have 5 fields, found {}: {}",
            fields.len(),
            expr
        ));
    }
    if let Some(bad) = fields.iter().find(|f| !CRON_FIELD_PATTERN.is_match(f)) {
        return Err(format!("invalid cron field '{}' in: {}", bad, expr));
    }
    Ok(())
}

fn validate_duration_field(value: &Option<String>, location: &str) -> Result<(), ParseError> {
    match value {
        Some(s) => parse_duration(s)
            .map(|_| ())
            .map_err(|message| ParseError::InvalidFormat {
                location: location.to_string(),
                message,
            }),
        None => Ok(()),
    }
}

pub(crate) fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    let mut keys: Vec<&str> = keys.map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(", ")
}

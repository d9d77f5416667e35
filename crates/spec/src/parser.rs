// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App spec parsing (TOML, HCL, and JSON)

use crate::model::AppSpec;
use crate::validate::validate_app;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Spec file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Hcl,
    Json,
}

impl Format {
    /// Format implied by a file extension.
    pub fn for_path(path: &Path) -> Option<Format> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(Format::Toml),
            Some("hcl") => Some(Format::Hcl),
            Some("json") => Some(Format::Json),
            _ => None,
        }
    }
}

/// Errors that can occur during spec parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid format for {location}: {message}")]
    InvalidFormat { location: String, message: String },
}

/// Errors from loading a spec file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported spec file extension: {0}")]
    UnknownFormat(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
}

/// Parse an app spec from TOML content (convenience wrapper)
pub fn parse_app_spec(content: &str) -> Result<AppSpec, ParseError> {
    parse_app_spec_with_format(content, Format::Toml)
}

/// Parse an app spec from the given content in the specified format
pub fn parse_app_spec_with_format(content: &str, format: Format) -> Result<AppSpec, ParseError> {
    // 1. Serde does the heavy lifting
    let mut spec: AppSpec = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Hcl => hcl::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };

    // 2. Name fixup — inject map keys into .name fields
    for (name, process) in &mut spec.processes {
        process.name = name.clone();
    }

    // 3. Bare endpoints bind to the first process with a port
    let default_target = spec
        .processes
        .values()
        .find(|p| p.has_port() && !p.is_scheduled())
        .map(|p| p.name.clone());
    for endpoint in &mut spec.endpoints {
        if endpoint.process.is_empty() {
            if let Some(ref target) = default_target {
                endpoint.process = target.clone();
            }
        }
    }

    // 4. Validation
    validate_app(&spec)?;

    Ok(spec)
}

/// Read and parse a spec file, recording its directory as the spec root.
pub fn load_app_spec(path: &Path) -> Result<AppSpec, LoadError> {
    let format = Format::for_path(path).ok_or_else(|| LoadError::UnknownFormat(path.into()))?;
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.into(),
        source,
    })?;
    let mut spec =
        parse_app_spec_with_format(&content, format).map_err(|source| LoadError::Parse {
            path: path.into(),
            source,
        })?;
    spec.root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    tracing::debug!(path = %path.display(), app = %spec.name, "loaded app spec");
    Ok(spec)
}

#[cfg(test)]
#[path = "parser_tests/mod.rs"]
mod tests;

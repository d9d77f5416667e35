// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{parse_app_spec, parse_app_spec_with_format, Format, ParseError};

mod defaults;
mod endpoints;
mod errors;
mod formats;

// ---------------------------------------------------------------------------
// Shared test helpers
// ---------------------------------------------------------------------------

/// Assert that a parse error's display message contains all given fragments.
fn assert_err_contains(err: &ParseError, fragments: &[&str]) {
    let msg = err.to_string();
    for frag in fragments {
        assert!(msg.contains(frag), "error should contain '{frag}': {msg}");
    }
}

/// Parse TOML and assert it fails with error containing all fragments.
fn assert_toml_err(input: &str, fragments: &[&str]) {
    assert_err_contains(&parse_app_spec(input).unwrap_err(), fragments);
}

/// Parse HCL and assert it fails with error containing all fragments.
fn assert_hcl_err(input: &str, fragments: &[&str]) {
    assert_err_contains(
        &parse_app_spec_with_format(input, Format::Hcl).unwrap_err(),
        fragments,
    );
}

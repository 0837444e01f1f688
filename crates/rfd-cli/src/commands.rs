// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations for the `rfd` CLI.
//!
//! Kept free of argument parsing so they can be tested without spawning the
//! binary.

use anyhow::{Context, Result};
use rfd_config::{ConfigWarning, DispatcherConfig, load_config, validate_config};
use rfd_dispatch::{DispatchPlan, ErrorDispatcher};
use rfd_core::RequestMetadata;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Load the configuration, falling back to defaults when `path` is `None`.
pub fn load(path: Option<&Path>) -> Result<DispatcherConfig> {
    let config = load_config(path).with_context(|| match path {
        Some(p) => format!("load config '{}'", p.display()),
        None => "load default config".to_string(),
    })?;
    debug!(target: "rfd.cli", path = ?path, "config loaded");
    Ok(config)
}

/// Plan the dispatch of `failure` for a request described by `metadata`.
pub fn explain(
    config: DispatcherConfig,
    metadata: &RequestMetadata,
    failure: Option<&str>,
) -> DispatchPlan {
    ErrorDispatcher::new(config).plan(failure, Some(metadata))
}

/// Human-readable rendering of a plan, one `key: value` per line.
pub fn format_plan(plan: &DispatchPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "embedded: {}", plan.context.embedded);
    let _ = writeln!(out, "classification: {}", plan.context.classification);
    let _ = writeln!(out, "representation: {}", plan.representation);
    let _ = writeln!(out, "template: {}", plan.template);
    match &plan.header {
        Some(h) => {
            let _ = writeln!(out, "header: {}: {}", h.name, h.value);
        }
        None => out.push_str("header: (none)\n"),
    }
    out
}

/// Load and validate a configuration, returning its warnings.
pub fn check_config(path: Option<&Path>) -> Result<Vec<ConfigWarning>> {
    let config = load(path)?;
    validate_config(&config).context("validate config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfd_core::RepresentationId;

    #[test]
    fn explain_embedded_script() {
        let meta = RequestMetadata::replay("http://a/app.js").with_referer("http://a/");
        let plan = explain(DispatcherConfig::default(), &meta, Some("x.y.Gone: bye"));
        assert_eq!(plan.representation, RepresentationId::Javascript);
        assert!(plan.header.is_none());
    }

    #[test]
    fn format_plan_lists_every_field() {
        let meta = RequestMetadata::replay("http://a/s.css").with_referer("http://a/");
        let cfg = DispatcherConfig::default().with_error_header("X-Err");
        let text = format_plan(&explain(cfg, &meta, Some("x.y.Gone: bye")));
        assert_eq!(
            text,
            "embedded: true\n\
             classification: css\n\
             representation: css\n\
             template: /WEB-INF/exception/CSSError.jsp\n\
             header: X-Err: Gone: bye\n"
        );
    }

    #[test]
    fn format_plan_without_header() {
        let text = format_plan(&explain(
            DispatcherConfig::default(),
            &RequestMetadata::query(),
            None,
        ));
        assert!(text.ends_with("header: (none)\n"));
        assert!(text.contains("representation: html\n"));
    }
}

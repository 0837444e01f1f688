// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the replay fault
//! dispatcher.
//!
//! [`DispatcherConfig`] holds the process-wide, read-only settings every
//! dispatch consults. Helpers here load it from TOML, apply `RFD_*`
//! environment overrides, merge overlays, and report [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use rfd_core::RepresentationId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use rfd_summary::DEFAULT_MAX_LENGTH as DEFAULT_MAX_ERROR_HEADER_LENGTH;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// An `RFD_*` environment variable held an unusable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvOverride {
        /// Variable name.
        var: String,
        /// What was wrong with it.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The header is enabled but every summary will be empty.
    EmptyErrorHeader {
        /// Configured header name.
        header: String,
    },
    /// Summaries may exceed what front-end servers accept in a header.
    LargeErrorHeaderLength {
        /// Configured maximum length.
        length: usize,
    },
    /// An embedded-resource stub renders through the full HTML template.
    StubUsesHtmlTemplate {
        /// The stub representation.
        representation: RepresentationId,
        /// Shared template id.
        template: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::EmptyErrorHeader { header } => {
                write!(
                    f,
                    "header '{header}' is enabled but max_error_header_length is 0"
                )
            }
            ConfigWarning::LargeErrorHeaderLength { length } => {
                write!(
                    f,
                    "max_error_header_length {length} exceeds {LARGE_HEADER_THRESHOLD}"
                )
            }
            ConfigWarning::StubUsesHtmlTemplate {
                representation,
                template,
            } => {
                write!(
                    f,
                    "{representation} failures render the HTML page '{template}'"
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Template id for the XML error document.
pub const DEFAULT_XML_TEMPLATE: &str = "/WEB-INF/exception/XMLError.jsp";
/// Template id for the full HTML error page.
pub const DEFAULT_HTML_TEMPLATE: &str = "/WEB-INF/exception/HTMLError.jsp";
/// Template id for image failures.
pub const DEFAULT_IMAGE_TEMPLATE: &str = DEFAULT_HTML_TEMPLATE;
/// Template id for the JavaScript stub.
pub const DEFAULT_JAVASCRIPT_TEMPLATE: &str = "/WEB-INF/exception/JavaScriptError.jsp";
/// Template id for the stylesheet stub.
pub const DEFAULT_CSS_TEMPLATE: &str = "/WEB-INF/exception/CSSError.jsp";

/// One template id per [`RepresentationId`].
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateTable {
    /// Query-mode XML error.
    pub xml: String,
    /// Full HTML error page.
    pub html: String,
    /// Embedded image failure.
    pub image: String,
    /// Embedded script failure.
    pub javascript: String,
    /// Embedded stylesheet failure.
    pub css: String,
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self {
            xml: DEFAULT_XML_TEMPLATE.into(),
            html: DEFAULT_HTML_TEMPLATE.into(),
            image: DEFAULT_IMAGE_TEMPLATE.into(),
            javascript: DEFAULT_JAVASCRIPT_TEMPLATE.into(),
            css: DEFAULT_CSS_TEMPLATE.into(),
        }
    }
}

impl TemplateTable {
    /// Template id for `rep`.
    pub fn get(&self, rep: RepresentationId) -> &str {
        match rep {
            RepresentationId::Xml => &self.xml,
            RepresentationId::Html => &self.html,
            RepresentationId::Image => &self.image,
            RepresentationId::Javascript => &self.javascript,
            RepresentationId::Css => &self.css,
        }
    }

    fn get_mut(&mut self, rep: RepresentationId) -> &mut String {
        match rep {
            RepresentationId::Xml => &mut self.xml,
            RepresentationId::Html => &mut self.html,
            RepresentationId::Image => &mut self.image,
            RepresentationId::Javascript => &mut self.javascript,
            RepresentationId::Css => &mut self.css,
        }
    }
}

/// Process-wide dispatcher settings.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Response header that carries the diagnostic summary. No header is
    /// emitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_header: Option<String>,

    /// Maximum summary length in characters.
    pub max_error_header_length: usize,

    /// Template id per representation.
    pub templates: TemplateTable,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            error_header: None,
            max_error_header_length: DEFAULT_MAX_ERROR_HEADER_LENGTH,
            templates: TemplateTable::default(),
        }
    }
}

impl DispatcherConfig {
    /// Enable the diagnostic header under `name`.
    pub fn with_error_header(mut self, name: impl Into<String>) -> Self {
        self.error_header = Some(name.into());
        self
    }

    /// Set the maximum summary length.
    pub fn with_max_error_header_length(mut self, length: usize) -> Self {
        self.max_error_header_length = length;
        self
    }

    /// Replace the template id for one representation.
    pub fn with_template(mut self, rep: RepresentationId, template: impl Into<String>) -> Self {
        *self.templates.get_mut(rep) = template.into();
        self
    }

    /// Template id for `rep`.
    pub fn template_for(&self, rep: RepresentationId) -> &str {
        self.templates.get(rep)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Summary lengths above this generate a warning.
const LARGE_HEADER_THRESHOLD: usize = 8_192;

/// See [`apply_env_overrides`].
pub const ENV_ERROR_HEADER: &str = "RFD_ERROR_HEADER";
/// See [`apply_env_overrides`].
pub const ENV_MAX_ERROR_HEADER_LENGTH: &str = "RFD_MAX_ERROR_HEADER_LENGTH";

const ENV_TEMPLATES: [(&str, RepresentationId); 5] = [
    ("RFD_TEMPLATE_XML", RepresentationId::Xml),
    ("RFD_TEMPLATE_HTML", RepresentationId::Html),
    ("RFD_TEMPLATE_IMAGE", RepresentationId::Image),
    ("RFD_TEMPLATE_JAVASCRIPT", RepresentationId::Javascript),
    ("RFD_TEMPLATE_CSS", RepresentationId::Css),
];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`DispatcherConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`DispatcherConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<DispatcherConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => DispatcherConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`DispatcherConfig`].
pub fn parse_toml(content: &str) -> Result<DispatcherConfig, ConfigError> {
    toml::from_str::<DispatcherConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `RFD_ERROR_HEADER` (an empty value disables the header)
/// - `RFD_MAX_ERROR_HEADER_LENGTH`
/// - `RFD_TEMPLATE_XML`, `RFD_TEMPLATE_HTML`, `RFD_TEMPLATE_IMAGE`,
///   `RFD_TEMPLATE_JAVASCRIPT`, `RFD_TEMPLATE_CSS`
pub fn apply_env_overrides(config: &mut DispatcherConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_from<F>(config: &mut DispatcherConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_ERROR_HEADER) {
        config.error_header = if val.is_empty() { None } else { Some(val) };
    }
    if let Some(val) = lookup(ENV_MAX_ERROR_HEADER_LENGTH) {
        config.max_error_header_length =
            val.trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnvOverride {
                    var: ENV_MAX_ERROR_HEADER_LENGTH.into(),
                    reason: e.to_string(),
                })?;
    }
    for (var, rep) in ENV_TEMPLATES {
        if let Some(val) = lookup(var) {
            *config.templates.get_mut(rep) = val;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Whether `name` is a legal HTTP header field name (an RFC 9110 token).
pub fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty template ids, malformed header names) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &DispatcherConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    for rep in RepresentationId::ALL {
        if config.template_for(rep).trim().is_empty() {
            errors.push(format!("template for '{rep}' must not be empty"));
        }
    }

    match &config.error_header {
        Some(name) if !is_valid_header_name(name) => {
            errors.push(format!("error_header '{name}' is not a valid header name"));
        }
        Some(name) if config.max_error_header_length == 0 => {
            warnings.push(ConfigWarning::EmptyErrorHeader {
                header: name.clone(),
            });
        }
        Some(_) => {}
        None => warnings.push(ConfigWarning::MissingOptionalField {
            field: "error_header".into(),
            hint: "failure summaries will not reach front-end logs".into(),
        }),
    }

    if config.max_error_header_length > LARGE_HEADER_THRESHOLD {
        warnings.push(ConfigWarning::LargeErrorHeaderLength {
            length: config.max_error_header_length,
        });
    }

    let html = config.template_for(RepresentationId::Html);
    for rep in RepresentationId::ALL.into_iter().filter(|r| r.is_embedded_stub()) {
        if config.template_for(rep) == html {
            warnings.push(ConfigWarning::StubUsesHtmlTemplate {
                representation: rep,
                template: html.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// An overlay value equal to the built-in default counts as unset, so a
/// partial overlay parsed from TOML only replaces what it spells out.
pub fn merge_configs(base: DispatcherConfig, overlay: DispatcherConfig) -> DispatcherConfig {
    let defaults = TemplateTable::default();
    let mut templates = base.templates;
    for rep in RepresentationId::ALL {
        let candidate = overlay.templates.get(rep);
        if candidate != defaults.get(rep) {
            *templates.get_mut(rep) = candidate.to_string();
        }
    }
    let max_error_header_length =
        if overlay.max_error_header_length != DEFAULT_MAX_ERROR_HEADER_LENGTH {
            overlay.max_error_header_length
        } else {
            base.max_error_header_length
        };
    DispatcherConfig {
        error_header: overlay.error_header.or(base.error_header),
        max_error_header_length,
        templates,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    // -- 1. Defaults -----------------------------------------------------------

    #[test]
    fn default_config_has_original_templates() {
        let cfg = DispatcherConfig::default();
        assert_eq!(cfg.template_for(RepresentationId::Xml), DEFAULT_XML_TEMPLATE);
        assert_eq!(cfg.template_for(RepresentationId::Html), DEFAULT_HTML_TEMPLATE);
        assert_eq!(cfg.template_for(RepresentationId::Image), DEFAULT_HTML_TEMPLATE);
        assert_eq!(
            cfg.template_for(RepresentationId::Javascript),
            DEFAULT_JAVASCRIPT_TEMPLATE
        );
        assert_eq!(cfg.template_for(RepresentationId::Css), DEFAULT_CSS_TEMPLATE);
        assert_eq!(cfg.error_header, None);
        assert_eq!(cfg.max_error_header_length, 300);
    }

    #[test]
    fn default_config_is_valid_with_warnings() {
        let warnings = validate_config(&DispatcherConfig::default()).expect("valid");
        assert!(warnings.iter().any(
            |w| matches!(w, ConfigWarning::MissingOptionalField { field, .. } if field == "error_header")
        ));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ConfigWarning::StubUsesHtmlTemplate {
                representation: RepresentationId::Image,
                ..
            }
        )));
    }

    // -- 2. Parsing ------------------------------------------------------------

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(parse_toml("").unwrap(), DispatcherConfig::default());
    }

    #[test]
    fn partial_templates_keep_other_defaults() {
        let cfg = parse_toml(
            r#"
            error_header = "X-Archive-Wayback-Runtime-Error"
            max_error_header_length = 120

            [templates]
            image = "/WEB-INF/exception/ImageError.jsp"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.error_header.as_deref(),
            Some("X-Archive-Wayback-Runtime-Error")
        );
        assert_eq!(cfg.max_error_header_length, 120);
        assert_eq!(
            cfg.template_for(RepresentationId::Image),
            "/WEB-INF/exception/ImageError.jsp"
        );
        assert_eq!(cfg.template_for(RepresentationId::Css), DEFAULT_CSS_TEMPLATE);
    }

    #[test]
    fn negative_length_is_parse_error() {
        let err = parse_toml("max_error_header_length = -1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse_toml("templates = [not valid").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = DispatcherConfig::default()
            .with_error_header("X-Err")
            .with_template(RepresentationId::Css, "css.tmpl");
        let s = toml::to_string(&cfg).unwrap();
        assert_eq!(parse_toml(&s).unwrap(), cfg);
    }

    // -- 3. Env overrides ------------------------------------------------------

    #[test]
    fn overrides_replace_values() {
        let mut cfg = DispatcherConfig::default();
        apply_overrides_from(
            &mut cfg,
            lookup(&[
                (ENV_ERROR_HEADER, "X-Err"),
                (ENV_MAX_ERROR_HEADER_LENGTH, " 64 "),
                ("RFD_TEMPLATE_JAVASCRIPT", "js.tmpl"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.error_header.as_deref(), Some("X-Err"));
        assert_eq!(cfg.max_error_header_length, 64);
        assert_eq!(cfg.template_for(RepresentationId::Javascript), "js.tmpl");
        assert_eq!(cfg.template_for(RepresentationId::Xml), DEFAULT_XML_TEMPLATE);
    }

    #[test]
    fn empty_header_override_disables_header() {
        let mut cfg = DispatcherConfig::default().with_error_header("X-Err");
        apply_overrides_from(&mut cfg, lookup(&[(ENV_ERROR_HEADER, "")])).unwrap();
        assert_eq!(cfg.error_header, None);
    }

    #[test]
    fn bad_length_override_is_error() {
        let mut cfg = DispatcherConfig::default();
        let err = apply_overrides_from(&mut cfg, lookup(&[(ENV_MAX_ERROR_HEADER_LENGTH, "lots")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidEnvOverride { var, .. } => {
                assert_eq!(var, ENV_MAX_ERROR_HEADER_LENGTH);
            }
            other => panic!("expected InvalidEnvOverride, got {other:?}"),
        }
    }

    // -- 4. Validation ---------------------------------------------------------

    #[test]
    fn empty_template_is_rejected() {
        let cfg = DispatcherConfig::default().with_template(RepresentationId::Css, "  ");
        match validate_config(&cfg).unwrap_err() {
            ConfigError::ValidationError { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("'css'")));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_header_name_is_rejected() {
        for name in ["", "X Err", "X-Err:", "Fehler-ä"] {
            let cfg = DispatcherConfig::default().with_error_header(name);
            assert!(
                matches!(
                    validate_config(&cfg),
                    Err(ConfigError::ValidationError { .. })
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn header_name_tokens() {
        assert!(is_valid_header_name("X-Archive-Wayback-Runtime-Error"));
        assert!(is_valid_header_name("x_err.v1"));
        assert!(!is_valid_header_name("x\r\nerr"));
    }

    #[test]
    fn zero_length_with_header_warns() {
        let cfg = DispatcherConfig::default()
            .with_error_header("X-Err")
            .with_max_error_header_length(0);
        let warnings = validate_config(&cfg).unwrap();
        assert!(warnings.contains(&ConfigWarning::EmptyErrorHeader {
            header: "X-Err".into()
        }));
    }

    #[test]
    fn large_length_warns() {
        let cfg = DispatcherConfig::default().with_max_error_header_length(10_000);
        let warnings = validate_config(&cfg).unwrap();
        assert!(warnings.contains(&ConfigWarning::LargeErrorHeaderLength { length: 10_000 }));
    }

    #[test]
    fn distinct_templates_and_header_have_no_warnings() {
        let cfg = DispatcherConfig::default()
            .with_error_header("X-Err")
            .with_template(RepresentationId::Image, "/WEB-INF/exception/ImageError.jsp");
        assert!(validate_config(&cfg).unwrap().is_empty());
    }

    // -- 5. Merging ------------------------------------------------------------

    #[test]
    fn merge_overlay_wins() {
        let base = DispatcherConfig::default()
            .with_error_header("X-Base")
            .with_template(RepresentationId::Css, "base.css");
        let overlay = DispatcherConfig::default()
            .with_error_header("X-Overlay")
            .with_max_error_header_length(50);
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.error_header.as_deref(), Some("X-Overlay"));
        assert_eq!(merged.max_error_header_length, 50);
        assert_eq!(merged.template_for(RepresentationId::Css), "base.css");
    }

    #[test]
    fn merge_default_overlay_preserves_base() {
        let base = DispatcherConfig::default()
            .with_error_header("X-Base")
            .with_max_error_header_length(80)
            .with_template(RepresentationId::Xml, "base.xml");
        let merged = merge_configs(base.clone(), DispatcherConfig::default());
        assert_eq!(merged, base);
    }

    // -- 6. Files --------------------------------------------------------------

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfd.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "max_error_header_length = 42").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.max_error_header_length, 42);
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/rfd.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    // -- 7. Display ------------------------------------------------------------

    #[test]
    fn warning_display() {
        let w = ConfigWarning::StubUsesHtmlTemplate {
            representation: RepresentationId::Image,
            template: "page.jsp".into(),
        };
        let s = w.to_string();
        assert!(s.contains("image"));
        assert!(s.contains("page.jsp"));
        assert!(
            ConfigWarning::LargeErrorHeaderLength { length: 9000 }
                .to_string()
                .contains("9000")
        );
    }

    #[test]
    fn snapshot_default_config() {
        insta::assert_json_snapshot!(DispatcherConfig::default(), @r###"
        {
          "max_error_header_length": 300,
          "templates": {
            "xml": "/WEB-INF/exception/XMLError.jsp",
            "html": "/WEB-INF/exception/HTMLError.jsp",
            "image": "/WEB-INF/exception/HTMLError.jsp",
            "javascript": "/WEB-INF/exception/JavaScriptError.jsp",
            "css": "/WEB-INF/exception/CSSError.jsp"
          }
        }
        "###);
    }
}

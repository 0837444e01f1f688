// SPDX-License-Identifier: MIT OR Apache-2.0
//! rfd-core
//!
//! Shared vocabulary for the replay fault dispatcher: the request-scoped
//! [`RequestMetadata`] handed over by the replay/query pipeline, the
//! [`Classification`] inferred from it, and the [`RepresentationId`] that names
//! which error template renders the failure.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// FailureReport
// ---------------------------------------------------------------------------

/// A failure described only by its category name and optional detail.
///
/// Displays as `kind` or `kind: message`, the same shape a dotted exception
/// name followed by its message has in the upstream pipeline's logs.
///
/// ```
/// use rfd_core::FailureReport;
///
/// let f = FailureReport::new("org.archive.wayback.exception.ResourceNotInArchiveException")
///     .with_message("http://x.example/ not found");
/// assert_eq!(
///     f.to_string(),
///     "org.archive.wayback.exception.ResourceNotInArchiveException: http://x.example/ not found"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailureReport {
    /// Category name, possibly namespace-qualified with dots.
    pub kind: String,
    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FailureReport {
    /// Create a report with no detail message.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
        }
    }

    /// Attach a detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {msg}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

impl std::error::Error for FailureReport {}

// ---------------------------------------------------------------------------
// RequestMetadata
// ---------------------------------------------------------------------------

/// Request-scoped signals attached to a failed request.
///
/// Built once by the upstream pipeline and only ever read afterwards. The
/// default value describes a query-mode request with no referer and no URL,
/// which dispatches to the full HTML error page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestMetadata {
    /// URL of the page that embedded this request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer_url: Option<String>,

    /// URL of the archived resource that was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,

    /// `true` for resource replay, `false` for query/search mode.
    #[serde(default)]
    pub replay_request: bool,

    /// Query-mode response was requested as XML.
    #[serde(default)]
    pub xml_mode: bool,

    /// Upstream knows the request was made from an image context.
    #[serde(default)]
    pub image_context: bool,

    /// Upstream knows the request was made from a script context.
    #[serde(default)]
    pub script_context: bool,

    /// Upstream knows the request was made from a stylesheet context.
    #[serde(default)]
    pub style_context: bool,
}

impl RequestMetadata {
    /// Metadata for a replay-mode request of `request_url`.
    pub fn replay(request_url: impl Into<String>) -> Self {
        Self {
            request_url: Some(request_url.into()),
            replay_request: true,
            ..Self::default()
        }
    }

    /// Metadata for a query-mode request.
    pub fn query() -> Self {
        Self::default()
    }

    /// Set the referer of the embedding page.
    pub fn with_referer(mut self, referer_url: impl Into<String>) -> Self {
        self.referer_url = Some(referer_url.into());
        self
    }

    /// Set the requested URL.
    pub fn with_request_url(mut self, request_url: impl Into<String>) -> Self {
        self.request_url = Some(request_url.into());
        self
    }

    /// Request an XML error body (meaningful in query mode only).
    pub fn with_xml_mode(mut self, xml_mode: bool) -> Self {
        self.xml_mode = xml_mode;
        self
    }

    /// Mark the request as made from an image context.
    pub fn with_image_context(mut self, on: bool) -> Self {
        self.image_context = on;
        self
    }

    /// Mark the request as made from a script context.
    pub fn with_script_context(mut self, on: bool) -> Self {
        self.script_context = on;
        self
    }

    /// Mark the request as made from a stylesheet context.
    pub fn with_style_context(mut self, on: bool) -> Self {
        self.style_context = on;
        self
    }

    /// Referer URL, treating an empty string as absent.
    pub fn referer(&self) -> Option<&str> {
        self.referer_url.as_deref().filter(|r| !r.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Embedded-resource type inferred for a failed request.
///
/// [`Classification::None`] covers both "not an embedded sub-resource" and
/// "could not tell".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No recognised embedded type.
    #[default]
    None,
    /// Script resource.
    Javascript,
    /// Stylesheet resource.
    Css,
    /// Image resource.
    Image,
}

impl Classification {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Javascript => "javascript",
            Self::Css => "css",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RepresentationId
// ---------------------------------------------------------------------------

/// Which failure-response variant to render.
///
/// Carries no content; the dispatcher maps it to a template id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationId {
    /// Machine-readable XML error (query mode).
    Xml,
    /// Full human-facing HTML error page.
    Html,
    /// Silent JavaScript stub.
    Javascript,
    /// Empty stylesheet stub.
    Css,
    /// Image stub.
    Image,
}

impl RepresentationId {
    /// Every representation, in declaration order.
    pub const ALL: [RepresentationId; 5] = [
        Self::Xml,
        Self::Html,
        Self::Javascript,
        Self::Css,
        Self::Image,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Javascript => "javascript",
            Self::Css => "css",
            Self::Image => "image",
        }
    }

    /// Whether this is one of the stubs served to embedded sub-resources.
    pub fn is_embedded_stub(&self) -> bool {
        matches!(self, Self::Javascript | Self::Css | Self::Image)
    }
}

impl fmt::Display for RepresentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// SPDX-License-Identifier: MIT OR Apache-2.0
//! rfd-classify
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Decides what kind of failure response a request should get.
//!
//! [`classify`] reads the request's metadata and reports whether it was an
//! embedded sub-resource and, if so, what type it looks like. [`select`] turns
//! that into a [`RepresentationId`].

use rfd_core::{Classification, RepresentationId, RequestMetadata};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// URL suffixes that mark an image, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif", "png", "bmp", "tiff", "tif"];

/// How a rule inspects the request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSuffix {
    /// URL ends with `.` followed by one of these extensions, any case.
    AnyExtensionIgnoreCase(&'static [&'static str]),
    /// URL ends with exactly this text.
    Exact(&'static str),
}

impl UrlSuffix {
    /// Whether `url` carries this suffix.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::AnyExtensionIgnoreCase(exts) => url
                .rsplit_once('.')
                .is_some_and(|(_, ext)| exts.iter().any(|e| ext.eq_ignore_ascii_case(e))),
            Self::Exact(suffix) => url.ends_with(suffix),
        }
    }
}

/// One row of the classification table: an explicit upstream flag, then a
/// URL-suffix fallback, both yielding the same classification.
#[derive(Debug, Clone, Copy)]
pub struct ContextRule {
    /// Result when the rule matches.
    pub classification: Classification,
    /// Explicit context flag set upstream.
    pub flag: fn(&RequestMetadata) -> bool,
    /// Suffix inference used when the flag is not set.
    pub suffix: UrlSuffix,
}

impl ContextRule {
    /// Whether this rule claims the request.
    pub fn matches(&self, metadata: &RequestMetadata) -> bool {
        (self.flag)(metadata)
            || metadata
                .request_url
                .as_deref()
                .is_some_and(|url| self.suffix.matches(url))
    }
}

/// Classification rules in priority order: image, then script, then style.
///
/// The first rule that matches wins, so an explicit image flag outranks a
/// `.js` URL and an explicit script flag outranks a `.css` URL.
pub const CONTEXT_RULES: [ContextRule; 3] = [
    ContextRule {
        classification: Classification::Image,
        flag: |m| m.image_context,
        suffix: UrlSuffix::AnyExtensionIgnoreCase(IMAGE_EXTENSIONS),
    },
    ContextRule {
        classification: Classification::Javascript,
        flag: |m| m.script_context,
        suffix: UrlSuffix::Exact(".js"),
    },
    ContextRule {
        classification: Classification::Css,
        flag: |m| m.style_context,
        suffix: UrlSuffix::Exact(".css"),
    },
];

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The request came from another page (it has a non-empty referer).
    pub embedded: bool,
    /// Inferred or explicit sub-resource type.
    pub classification: Classification,
}

/// Classify a failed request.
///
/// Without metadata the request is treated as direct and unclassified.
pub fn classify(metadata: Option<&RequestMetadata>) -> RequestContext {
    let Some(metadata) = metadata else {
        return RequestContext::default();
    };
    RequestContext {
        embedded: metadata.referer().is_some(),
        classification: classify_resource(metadata),
    }
}

/// Run the rule table alone, ignoring the referer.
pub fn classify_resource(metadata: &RequestMetadata) -> Classification {
    CONTEXT_RULES
        .iter()
        .find(|rule| rule.matches(metadata))
        .map_or(Classification::None, |rule| rule.classification)
}

// ---------------------------------------------------------------------------
// select
// ---------------------------------------------------------------------------

/// Pick the failure representation.
///
/// Query-mode requests get [`RepresentationId::Xml`] when they asked for XML
/// and the full page otherwise, however they were embedded. Embedded replay
/// requests of a known type get the matching stub. Everything else, including
/// embedded requests of unknown type, gets the full [`RepresentationId::Html`]
/// page.
pub fn select(
    metadata: Option<&RequestMetadata>,
    embedded: bool,
    classification: Classification,
) -> RepresentationId {
    if let Some(m) = metadata.filter(|m| !m.replay_request) {
        return if m.xml_mode {
            RepresentationId::Xml
        } else {
            RepresentationId::Html
        };
    }
    if embedded {
        match classification {
            Classification::Javascript => return RepresentationId::Javascript,
            Classification::Css => return RepresentationId::Css,
            Classification::Image => return RepresentationId::Image,
            // Falls back to the full page even though it may break the
            // embedding document; kept for compatibility.
            Classification::None => {}
        }
    }
    RepresentationId::Html
}

/// [`classify`] followed by [`select`].
pub fn resolve(metadata: Option<&RequestMetadata>) -> (RequestContext, RepresentationId) {
    let ctx = classify(metadata);
    let rep = select(metadata, ctx.embedded, ctx.classification);
    (ctx, rep)
}

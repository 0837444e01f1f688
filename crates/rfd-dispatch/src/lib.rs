// SPDX-License-Identifier: MIT OR Apache-2.0
//! rfd-dispatch
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The failure-response dispatcher for archived-content replay.
//!
//! Given a failure and the metadata of the request it belongs to,
//! [`ErrorDispatcher`] optionally puts a diagnostic summary in a response
//! header, works out which representation keeps the embedding page intact
//! (silent JavaScript, empty CSS, an image stub, an XML document or the full
//! HTML page), and hands the matching template id to an external
//! [`Renderer`].
//!
//! ```
//! use rfd_config::DispatcherConfig;
//! use rfd_core::{FailureReport, RepresentationId, RequestMetadata};
//! use rfd_dispatch::ErrorDispatcher;
//!
//! let dispatcher = ErrorDispatcher::new(DispatcherConfig::default());
//! let meta = RequestMetadata::replay("http://a/style.css").with_referer("http://a/");
//! let failure = FailureReport::new("ResourceNotInArchiveException");
//! let plan = dispatcher.plan(Some(&failure), Some(&meta));
//! assert_eq!(plan.representation, RepresentationId::Css);
//! ```

mod render;
mod sink;

pub use render::{RenderContext, Renderer};
pub use sink::HeaderSink;

use rfd_classify::{RequestContext, classify, select};
use rfd_config::DispatcherConfig;
use rfd_core::{RepresentationId, RequestMetadata};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// The diagnostic header a dispatch will set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticHeader {
    /// Header name from the configuration.
    pub name: String,
    /// Summarized failure text.
    pub value: String,
}

/// What a dispatch will do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchPlan {
    /// Header to set, when one is configured and a failure is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<DiagnosticHeader>,
    /// Embedding and classification of the request.
    pub context: RequestContext,
    /// Chosen representation.
    pub representation: RepresentationId,
    /// Template id configured for the representation.
    pub template: String,
}

/// Chooses and renders failure responses.
///
/// Holds only the immutable [`DispatcherConfig`]; share one instance across
/// threads by reference or `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ErrorDispatcher {
    config: DispatcherConfig,
}

impl ErrorDispatcher {
    /// Create a dispatcher around a finished configuration.
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Work out the header, representation and template for a failure.
    pub fn plan<F>(&self, failure: Option<&F>, metadata: Option<&RequestMetadata>) -> DispatchPlan
    where
        F: fmt::Display + ?Sized,
    {
        let header = self.config.error_header.as_ref().and_then(|name| {
            rfd_summary::summarize(failure, self.config.max_error_header_length).map(|value| {
                DiagnosticHeader {
                    name: name.clone(),
                    value,
                }
            })
        });
        let context = classify(metadata);
        let representation = select(metadata, context.embedded, context.classification);
        DispatchPlan {
            header,
            context,
            representation,
            template: self.config.template_for(representation).to_string(),
        }
    }

    /// Emit the failure response.
    ///
    /// Sets the diagnostic header (at most once, before rendering), then calls
    /// `renderer` exactly once. The renderer's error is returned as is; the
    /// dispatch itself cannot fail.
    pub fn dispatch<F, H, R>(
        &self,
        failure: Option<&F>,
        metadata: Option<&RequestMetadata>,
        headers: &mut H,
        renderer: &R,
    ) -> Result<R::Output, R::Error>
    where
        F: fmt::Display + ?Sized,
        H: HeaderSink + ?Sized,
        R: Renderer<F> + ?Sized,
    {
        let plan = self.plan(failure, metadata);
        if let Some(header) = &plan.header {
            headers.set_header(&header.name, &header.value);
        }
        debug!(
            target: "rfd.dispatch",
            representation = %plan.representation,
            template = %plan.template,
            embedded = plan.context.embedded,
            classification = %plan.context.classification,
            header = plan.header.is_some(),
            "dispatching failure response"
        );
        renderer.render(&RenderContext {
            failure,
            metadata,
            request: plan.context,
            representation: plan.representation,
            template: &plan.template,
        })
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! The boundary with the external template renderer.

use rfd_classify::RequestContext;
use rfd_core::{RepresentationId, RequestMetadata};

/// Everything a renderer needs to produce the failure response.
#[derive(Debug)]
pub struct RenderContext<'a, F: ?Sized> {
    /// The failure being reported, if the caller had one.
    pub failure: Option<&'a F>,
    /// Request metadata, untouched.
    pub metadata: Option<&'a RequestMetadata>,
    /// Embedding and classification computed for the request.
    pub request: RequestContext,
    /// Chosen representation.
    pub representation: RepresentationId,
    /// Template id configured for `representation`.
    pub template: &'a str,
}

// Manual impls: derives would demand `F: Clone`.
impl<F: ?Sized> Clone for RenderContext<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ?Sized> Copy for RenderContext<'_, F> {}

/// Produces the failure response body for a chosen template.
///
/// The dispatcher calls [`render`](Renderer::render) exactly once per
/// dispatch and hands back whatever it returns, errors included.
pub trait Renderer<F: ?Sized> {
    /// Rendered response.
    type Output;
    /// Rendering failure.
    type Error;

    /// Render the failure response described by `ctx`.
    fn render(&self, ctx: &RenderContext<'_, F>) -> Result<Self::Output, Self::Error>;
}

impl<F, G, O, E> Renderer<F> for G
where
    F: ?Sized,
    G: Fn(&RenderContext<'_, F>) -> Result<O, E>,
{
    type Output = O;
    type Error = E;

    fn render(&self, ctx: &RenderContext<'_, F>) -> Result<O, E> {
        self(ctx)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Response header sinks.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Somewhere the dispatcher can set a response header.
///
/// Setting a name twice replaces the earlier value. Sinks that cannot carry a
/// given name or value drop it; the dispatcher never fails because of a
/// header.
pub trait HeaderSink {
    /// Set `name` to `value`.
    fn set_header(&mut self, name: &str, value: &str);
}

impl<H: HeaderSink + ?Sized> HeaderSink for &mut H {
    fn set_header(&mut self, name: &str, value: &str) {
        (**self).set_header(name, value);
    }
}

impl HeaderSink for BTreeMap<String, String> {
    fn set_header(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl HeaderSink for HashMap<String, String> {
    fn set_header(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl HeaderSink for HeaderMap {
    fn set_header(&mut self, name: &str, value: &str) {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                warn!(target: "rfd.dispatch", header = name, error = %e, "skipping invalid header name");
                return;
            }
        };
        // Bytes rather than str so non-ASCII summaries survive as obs-text.
        match HeaderValue::from_bytes(value.as_bytes()) {
            Ok(v) => {
                self.insert(name, v);
            }
            Err(e) => {
                warn!(target: "rfd.dispatch", header = %name, error = %e, "skipping invalid header value");
            }
        }
    }
}

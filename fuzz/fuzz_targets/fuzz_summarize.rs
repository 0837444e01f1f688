// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the diagnostic-header summarizer.
//!
//! Checks that the summary never panics, never exceeds the requested length,
//! never contains a newline, and is stable when summarized again.
#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    max: u16,
}

fuzz_target!(|input: Input| {
    let max = usize::from(input.max);
    let summary = rfd_summary::summarize_text(&input.text, max);

    assert!(summary.chars().count() <= max);
    assert!(!summary.contains('\n'));
    assert_eq!(rfd_summary::summarize_text(&summary, max), summary);
    assert_eq!(rfd_summary::summarize(Some(&input.text), max), Some(summary));
});

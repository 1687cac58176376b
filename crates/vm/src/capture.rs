//! Capture log and span reconstruction.
//!
//! The engine's capture reference is the length of the log. Choice points
//! save it and backtracking truncates back to it, so events recorded on an
//! abandoned branch disappear with the branch.

use crate::error::MatchError;
use pegvm_common::CaptureKind;

/// One CAPTURE instruction executed on the surviving path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CaptureEvent {
    pub kind: CaptureKind,
    pub position: usize,
    /// Instruction index of the CAPTURE, for error reports.
    pub at: usize,
}

/// A captured range of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureSpan {
    pub start: usize,
    pub end: usize,
    /// Number of captures enclosing this one.
    pub depth: usize,
}

impl CaptureSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Pair OPEN/CLOSE events into spans, ordered by where each capture opened.
///
/// Captures still open when the match ends are dropped.
pub(crate) fn resolve(log: &[CaptureEvent]) -> Result<Vec<CaptureSpan>, MatchError> {
    let mut spans: Vec<(CaptureSpan, bool)> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for event in log {
        match event.kind {
            CaptureKind::Open => {
                let span = CaptureSpan {
                    start: event.position,
                    end: event.position,
                    depth: open.len(),
                };
                open.push(spans.len());
                spans.push((span, false));
            }
            CaptureKind::Close => {
                let idx = open
                    .pop()
                    .ok_or(MatchError::UnbalancedCapture { at: event.at })?;
                spans[idx].0.end = event.position;
                spans[idx].1 = true;
            }
        }
    }

    Ok(spans
        .into_iter()
        .filter_map(|(span, closed)| closed.then_some(span))
        .collect())
}

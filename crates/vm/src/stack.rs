//! The execution stack: call-return frames and choice points in one LIFO.
//!
//! The engine never recurses on the host stack. Every `Call` and every
//! `Choice` becomes a frame here, and failure recovery unwinds this stack
//! until it finds a choice point or runs out of frames.

use thiserror::Error;
use tracing::trace;

/// Frames are allocated in multiples of this many entries.
pub const STACK_CHUNK: usize = 100;

/// One frame on the execution stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEntry {
    /// Pushed by `Call`, consumed by `Return`.
    Return {
        /// Instruction index to resume at.
        resume: usize,
    },
    /// Pushed by `Choice`: the state to restore if the current branch fails.
    Backtrack {
        /// Instruction index of the alternative branch.
        alternative: usize,
        /// Input position to restore.
        position: usize,
        /// Capture reference to restore.
        capture: usize,
    },
}

impl StackEntry {
    pub fn kind(&self) -> FrameKind {
        match self {
            StackEntry::Return { .. } => FrameKind::Return,
            StackEntry::Backtrack { .. } => FrameKind::Backtrack,
        }
    }
}

/// The variant of a [`StackEntry`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Return,
    Backtrack,
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Return => f.write_str("return"),
            FrameKind::Backtrack => f.write_str("backtrack"),
        }
    }
}

/// A push was refused because the configured ceiling was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("execution stack limit of {limit} frames reached")]
pub struct StackLimitReached {
    pub limit: usize,
}

/// An unbounded (or optionally capped) LIFO of [`StackEntry`].
///
/// A stack is exclusively borrowed by one match for its whole duration;
/// run matches concurrently by giving each its own stack.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStack {
    entries: Vec<StackEntry>,
    max_depth: Option<usize>,
    peak: usize,
}

impl ExecutionStack {
    /// An empty, unbounded stack. Nothing is allocated until the first push.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty stack that refuses to grow past `max_depth` frames.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    /// Drop all frames, keeping the allocation and the ceiling.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.peak = 0;
    }

    /// [`clear`](Self::clear), then install a new ceiling.
    pub fn reset(&mut self, max_depth: Option<usize>) {
        self.clear();
        self.max_depth = max_depth;
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn push_return(&mut self, resume: usize) -> Result<(), StackLimitReached> {
        self.push(StackEntry::Return { resume })
    }

    pub fn push_backtrack(
        &mut self,
        alternative: usize,
        position: usize,
        capture: usize,
    ) -> Result<(), StackLimitReached> {
        self.push(StackEntry::Backtrack {
            alternative,
            position,
            capture,
        })
    }

    fn push(&mut self, entry: StackEntry) -> Result<(), StackLimitReached> {
        if let Some(limit) = self.max_depth {
            if self.entries.len() >= limit {
                return Err(StackLimitReached { limit });
            }
        }
        self.ensure();
        self.entries.push(entry);
        self.peak = self.peak.max(self.entries.len());
        Ok(())
    }

    /// Grow by at least one chunk, doubling once past the first chunk.
    fn ensure(&mut self) {
        if self.entries.len() == self.entries.capacity() {
            let extra = self.entries.capacity().max(STACK_CHUNK);
            self.entries.reserve_exact(extra);
            trace!(capacity = self.entries.capacity(), "execution stack grown");
        }
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    /// Kind of the top frame, or `None` when empty.
    pub fn peek_kind(&self) -> Option<FrameKind> {
        self.entries.last().map(StackEntry::kind)
    }

    /// Mutable access to the top frame. Never changes the depth.
    pub fn top_mut(&mut self) -> Option<&mut StackEntry> {
        self.entries.last_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frames currently allocated.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Deepest the stack has been since creation or the last reset.
    pub fn peak(&self) -> usize {
        self.peak
    }
}

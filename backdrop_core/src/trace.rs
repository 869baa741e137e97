// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for surface groups.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`SurfaceGroup`](crate::group::SurfaceGroup) operations call as they run.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Every event carries the group's display, token, and sequence number. The
//! sequence number increases by one per traced operation on a group, so
//! events from one group can be ordered without a clock.
//!
//! # Crate features
//!
//! - `trace`: Enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): Gates [`MemberDispatchEvent`] and the
//!   corresponding per-member `TraceSink` method.

#[cfg(feature = "trace-rich")]
use crate::host::DispatchError;
use crate::id::{DisplayId, SurfaceId, TokenId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which group operation produced a [`BroadcastEvent`] or
/// per-member record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupOp {
    /// [`set_hidden`](crate::group::SurfaceGroup::set_hidden).
    Hide,
    /// [`broadcast_command`](crate::group::SurfaceGroup::broadcast_command).
    Command,
    /// [`update_offsets`](crate::group::SurfaceGroup::update_offsets).
    Offsets,
    /// [`update_visibility`](crate::group::SurfaceGroup::update_visibility).
    Visibility,
    /// [`update_layers`](crate::group::SurfaceGroup::update_layers).
    Layers,
    /// [`start_animation`](crate::group::SurfaceGroup::start_animation).
    Animation,
}

impl GroupOp {
    /// Short lowercase name for log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Command => "command",
            Self::Offsets => "offsets",
            Self::Visibility => "visibility",
            Self::Layers => "layers",
            Self::Animation => "animation",
        }
    }
}

/// What happened to a group's membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipChange {
    /// A member was appended.
    Added,
    /// A member was removed.
    Removed,
    /// An add was refused (group exiting or duplicate member).
    Rejected,
}

/// Outcome of one member's part in a broadcast.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The member accepted the update.
    Delivered,
    /// The member's client could not be reached; the broadcast continued.
    Failed(DispatchError),
    /// The offset policy reported no change for this member.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a member is added, removed, or refused.
#[derive(Clone, Copy, Debug)]
pub struct MembershipEvent {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// The member concerned.
    pub surface: SurfaceId,
    /// What happened.
    pub change: MembershipChange,
    /// Member count after the change.
    pub members: u32,
}

/// Emitted once, when a group begins exiting.
#[derive(Clone, Copy, Debug)]
pub struct ExitEvent {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// Members still attached when the exit began.
    pub members: u32,
}

/// Emitted after every member has been hidden or re-shown.
#[derive(Clone, Copy, Debug)]
pub struct HideEvent<'a> {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// New group hidden state.
    pub hidden: bool,
    /// Caller-supplied reason.
    pub reason: &'a str,
    /// Members visited.
    pub members: u32,
}

/// Emitted after a broadcast has visited every member.
#[derive(Clone, Copy, Debug)]
pub struct BroadcastEvent {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// Which operation ran.
    pub op: GroupOp,
    /// Members visited.
    pub members: u32,
    /// The member that received `synchronous = true`, if any.
    pub synchronous_member: Option<SurfaceId>,
    /// Members whose dispatch failed and was skipped.
    pub failures: u32,
}

/// Emitted when a visibility update flips the group's hidden flag.
///
/// Every flip also requests a layout pass from the owning display.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityEvent {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// New group hidden state.
    pub hidden: bool,
}

/// A per-member record inside a broadcast.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct MemberDispatchEvent {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Sequence number of the enclosing broadcast.
    pub seq: u64,
    /// Which operation ran.
    pub op: GroupOp,
    /// The member visited.
    pub surface: SurfaceId,
    /// Whether this member was asked to be synchronous.
    pub synchronous: bool,
    /// What happened.
    pub outcome: DispatchOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from surface group operations.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when membership changes or an add is refused.
    fn on_membership(&mut self, e: &MembershipEvent) {
        _ = e;
    }

    /// Called when a group begins exiting.
    fn on_exit(&mut self, e: &ExitEvent) {
        _ = e;
    }

    /// Called after a hide pass.
    fn on_hide(&mut self, e: &HideEvent<'_>) {
        _ = e;
    }

    /// Called after a broadcast completes.
    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        _ = e;
    }

    /// Called when a visibility update flips the group's hidden flag.
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        _ = e;
    }

    /// Called for each member visited by a broadcast (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_member_dispatch(&mut self, e: &MemberDispatchEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`MembershipEvent`].
    #[inline]
    pub fn membership(&mut self, e: &MembershipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_membership(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ExitEvent`].
    #[inline]
    pub fn exit(&mut self, e: &ExitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_exit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HideEvent`].
    #[inline]
    pub fn hide(&mut self, e: &HideEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hide(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BroadcastEvent`].
    #[inline]
    pub fn broadcast(&mut self, e: &BroadcastEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_broadcast(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`VisibilityEvent`].
    #[inline]
    pub fn visibility(&mut self, e: &VisibilityEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_visibility(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MemberDispatchEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn member_dispatch(&mut self, e: &MemberDispatchEvent) {
        if let Some(s) = &mut self.sink {
            s.on_member_dispatch(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_broadcast() -> BroadcastEvent {
        BroadcastEvent {
            display: DisplayId(0),
            token: TokenId(3),
            seq: 12,
            op: GroupOp::Command,
            members: 3,
            synchronous_member: Some(SurfaceId(9)),
            failures: 1,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_broadcast(&sample_broadcast());
        sink.on_hide(&HideEvent {
            display: DisplayId(0),
            token: TokenId(3),
            seq: 13,
            hidden: true,
            reason: "keyguard",
            members: 3,
        });
        sink.on_exit(&ExitEvent {
            display: DisplayId(0),
            token: TokenId(3),
            seq: 14,
            members: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.broadcast(&sample_broadcast());
        tracer.visibility(&VisibilityEvent {
            display: DisplayId(0),
            token: TokenId(3),
            seq: 1,
            hidden: false,
        });
    }

    #[test]
    fn op_names_are_distinct() {
        let ops = [
            GroupOp::Hide,
            GroupOp::Command,
            GroupOp::Offsets,
            GroupOp::Visibility,
            GroupOp::Layers,
            GroupOp::Animation,
        ];
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            seqs: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_broadcast(&mut self, e: &BroadcastEvent) {
                self.seqs.push(e.seq);
            }
        }

        let mut sink = RecordingSink { seqs: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.broadcast(&sample_broadcast());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.seqs, &[12]);
    }
}

// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for backdrop
//! diagnostics.
//!
//! This crate provides [`TraceSink`](backdrop_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`FanOut`]: forwards every event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;

use backdrop_core::trace::{
    BroadcastEvent, ExitEvent, HideEvent, MemberDispatchEvent, MembershipEvent, TraceSink,
    VisibilityEvent,
};

/// A [`TraceSink`] that forwards every event to two sinks, `A` first.
#[derive(Debug)]
pub struct FanOut<A, B> {
    /// First receiver.
    pub first: A,
    /// Second receiver.
    pub second: B,
}

impl<A, B> FanOut<A, B> {
    /// Pairs two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Splits the pair back into its sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for FanOut<A, B> {
    fn on_membership(&mut self, e: &MembershipEvent) {
        self.first.on_membership(e);
        self.second.on_membership(e);
    }

    fn on_exit(&mut self, e: &ExitEvent) {
        self.first.on_exit(e);
        self.second.on_exit(e);
    }

    fn on_hide(&mut self, e: &HideEvent<'_>) {
        self.first.on_hide(e);
        self.second.on_hide(e);
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        self.first.on_broadcast(e);
        self.second.on_broadcast(e);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.first.on_visibility(e);
        self.second.on_visibility(e);
    }

    fn on_member_dispatch(&mut self, e: &MemberDispatchEvent) {
        self.first.on_member_dispatch(e);
        self.second.on_member_dispatch(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use backdrop_core::id::{DisplayId, TokenId};

    #[test]
    fn fan_out_reaches_both_sinks() {
        let mut both = FanOut::new(RecorderSink::new(), RecorderSink::new());
        both.on_exit(&ExitEvent {
            display: DisplayId(0),
            token: TokenId(2),
            seq: 5,
            members: 1,
        });
        let (a, b) = both.into_inner();
        assert_eq!(decode(a.as_bytes()).count(), 1);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}

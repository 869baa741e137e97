// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Each line
//! starts with a bracketed tag followed by the group header
//! (`display=… token=… seq=…`).

use std::io::Write;

use backdrop_core::id::SurfaceId;
use backdrop_core::trace::{
    BroadcastEvent, DispatchOutcome, ExitEvent, HideEvent, MemberDispatchEvent,
    MembershipChange, MembershipEvent, TraceSink, VisibilityEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn change_sign(change: MembershipChange) -> &'static str {
    match change {
        MembershipChange::Added => "+",
        MembershipChange::Removed => "-",
        MembershipChange::Rejected => "!",
    }
}

fn sync_member(id: Option<SurfaceId>) -> String {
    id.map_or_else(|| "none".to_owned(), |id| id.to_string())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_membership(&mut self, e: &MembershipEvent) {
        let _ = writeln!(
            self.writer,
            "[member] display={} token={} seq={} {}{} members={}",
            e.display.0,
            e.token.0,
            e.seq,
            change_sign(e.change),
            e.surface,
            e.members,
        );
    }

    fn on_exit(&mut self, e: &ExitEvent) {
        let _ = writeln!(
            self.writer,
            "[exit] display={} token={} seq={} members={}",
            e.display.0, e.token.0, e.seq, e.members,
        );
    }

    fn on_hide(&mut self, e: &HideEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[hide] display={} token={} seq={} hidden={} reason={:?} members={}",
            e.display.0, e.token.0, e.seq, e.hidden, e.reason, e.members,
        );
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        let _ = writeln!(
            self.writer,
            "[{}] display={} token={} seq={} members={} sync={} failures={}",
            e.op.as_str(),
            e.display.0,
            e.token.0,
            e.seq,
            e.members,
            sync_member(e.synchronous_member),
            e.failures,
        );
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        let _ = writeln!(
            self.writer,
            "[visibility] display={} token={} seq={} hidden={} (layout requested)",
            e.display.0, e.token.0, e.seq, e.hidden,
        );
    }

    fn on_member_dispatch(&mut self, e: &MemberDispatchEvent) {
        let outcome = match e.outcome {
            DispatchOutcome::Delivered => "delivered".to_owned(),
            DispatchOutcome::Failed(err) => format!("failed: {err}"),
            DispatchOutcome::Unchanged => "unchanged".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "  [{}:member] {} sync={} {}",
            e.op.as_str(),
            e.surface,
            e.synchronous,
            outcome,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::host::DispatchError;
    use backdrop_core::id::{DisplayId, TokenId};
    use backdrop_core::trace::GroupOp;

    fn render(f: impl FnOnce(&mut PrettyPrintSink<Vec<u8>>)) -> String {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        f(&mut sink);
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn broadcast_line() {
        let out = render(|s| {
            s.on_broadcast(&BroadcastEvent {
                display: DisplayId(0),
                token: TokenId(7),
                seq: 4,
                op: GroupOp::Command,
                members: 3,
                synchronous_member: Some(SurfaceId(3)),
                failures: 1,
            });
        });
        assert_eq!(
            out,
            "[command] display=0 token=7 seq=4 members=3 sync=#3 failures=1\n"
        );
    }

    #[test]
    fn membership_and_hide_lines() {
        let out = render(|s| {
            s.on_membership(&MembershipEvent {
                display: DisplayId(1),
                token: TokenId(2),
                seq: 0,
                surface: SurfaceId(9),
                change: MembershipChange::Added,
                members: 1,
            });
            s.on_hide(&HideEvent {
                display: DisplayId(1),
                token: TokenId(2),
                seq: 1,
                hidden: true,
                reason: "keyguard",
                members: 1,
            });
        });
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "[member] display=1 token=2 seq=0 +#9 members=1");
        assert_eq!(
            lines[1],
            "[hide] display=1 token=2 seq=1 hidden=true reason=\"keyguard\" members=1"
        );
    }

    #[test]
    fn member_dispatch_failure_is_indented() {
        let out = render(|s| {
            s.on_member_dispatch(&MemberDispatchEvent {
                display: DisplayId(0),
                token: TokenId(7),
                seq: 4,
                op: GroupOp::Command,
                surface: SurfaceId(2),
                synchronous: false,
                outcome: DispatchOutcome::Failed(DispatchError::Unreachable),
            });
        });
        assert_eq!(
            out,
            "  [command:member] #2 sync=false failed: member client is unreachable\n"
        );
    }
}

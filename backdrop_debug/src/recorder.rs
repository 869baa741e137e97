// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each introduced by a one-byte tag.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Every record starts with the group header (display `u32`, token `u32`,
//! sequence `u64`). Hide records end with the reason as a `u32` length and
//! UTF-8 bytes; all other records are fixed-size.

use backdrop_core::host::DispatchError;
use backdrop_core::id::{DisplayId, SurfaceId, TokenId};
use backdrop_core::trace::{
    BroadcastEvent, DispatchOutcome, ExitEvent, GroupOp, HideEvent, MemberDispatchEvent,
    MembershipChange, MembershipEvent, TraceSink, VisibilityEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_MEMBERSHIP: u8 = 1;
const TAG_EXIT: u8 = 2;
const TAG_HIDE: u8 = 3;
const TAG_BROADCAST: u8 = 4;
const TAG_VISIBILITY: u8 = 5;
const TAG_MEMBER_DISPATCH: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_header(&mut self, tag: u8, display: DisplayId, token: TokenId, seq: u64) {
        self.write_u8(tag);
        self.write_u32(display.0);
        self.write_u32(token.0);
        self.write_u64(seq);
    }

    fn write_option_surface(&mut self, v: Option<SurfaceId>) {
        match v {
            Some(id) => {
                self.write_u8(1);
                self.write_u32(id.0);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }

    fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&bytes[..len as usize]);
    }

    fn write_op(&mut self, op: GroupOp) {
        self.write_u8(match op {
            GroupOp::Hide => 0,
            GroupOp::Command => 1,
            GroupOp::Offsets => 2,
            GroupOp::Visibility => 3,
            GroupOp::Layers => 4,
            GroupOp::Animation => 5,
        });
    }

    fn write_change(&mut self, change: MembershipChange) {
        self.write_u8(match change {
            MembershipChange::Added => 0,
            MembershipChange::Removed => 1,
            MembershipChange::Rejected => 2,
        });
    }

    fn write_outcome(&mut self, outcome: DispatchOutcome) {
        self.write_u8(match outcome {
            DispatchOutcome::Delivered => 0,
            DispatchOutcome::Failed(DispatchError::Unreachable) => 1,
            DispatchOutcome::Failed(DispatchError::Detached) => 2,
            DispatchOutcome::Unchanged => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_membership(&mut self, e: &MembershipEvent) {
        self.write_header(TAG_MEMBERSHIP, e.display, e.token, e.seq);
        self.write_u32(e.surface.0);
        self.write_change(e.change);
        self.write_u32(e.members);
    }

    fn on_exit(&mut self, e: &ExitEvent) {
        self.write_header(TAG_EXIT, e.display, e.token, e.seq);
        self.write_u32(e.members);
    }

    fn on_hide(&mut self, e: &HideEvent<'_>) {
        self.write_header(TAG_HIDE, e.display, e.token, e.seq);
        self.write_bool(e.hidden);
        self.write_u32(e.members);
        self.write_str(e.reason);
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        self.write_header(TAG_BROADCAST, e.display, e.token, e.seq);
        self.write_op(e.op);
        self.write_u32(e.members);
        self.write_option_surface(e.synchronous_member);
        self.write_u32(e.failures);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.write_header(TAG_VISIBILITY, e.display, e.token, e.seq);
        self.write_bool(e.hidden);
    }

    fn on_member_dispatch(&mut self, e: &MemberDispatchEvent) {
        self.write_header(TAG_MEMBER_DISPATCH, e.display, e.token, e.seq);
        self.write_op(e.op);
        self.write_u32(e.surface.0);
        self.write_bool(e.synchronous);
        self.write_outcome(e.outcome);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// An owned copy of a [`HideEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HideRecord {
    /// Owning display.
    pub display: DisplayId,
    /// Group token.
    pub token: TokenId,
    /// Group sequence number.
    pub seq: u64,
    /// New group hidden state.
    pub hidden: bool,
    /// Caller-supplied reason.
    pub reason: String,
    /// Members visited.
    pub members: u32,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`MembershipEvent`].
    Membership(MembershipEvent),
    /// An [`ExitEvent`].
    Exit(ExitEvent),
    /// A [`HideEvent`].
    Hide(HideRecord),
    /// A [`BroadcastEvent`].
    Broadcast(BroadcastEvent),
    /// A [`VisibilityEvent`].
    Visibility(VisibilityEvent),
    /// A [`MemberDispatchEvent`].
    MemberDispatch(MemberDispatchEvent),
}

impl RecordedEvent {
    /// Sequence number of the recorded event.
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::Membership(e) => e.seq,
            Self::Exit(e) => e.seq,
            Self::Hide(e) => e.seq,
            Self::Broadcast(e) => e.seq,
            Self::Visibility(e) => e.seq,
            Self::MemberDispatch(e) => e.seq,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

struct Header {
    display: DisplayId,
    token: TokenId,
    seq: u64,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        if self.remaining() < len {
            return None;
        }
        let s = core::str::from_utf8(&self.data[self.pos..self.pos + len]).ok()?;
        self.pos += len;
        Some(s.to_owned())
    }

    fn read_header(&mut self) -> Option<Header> {
        Some(Header {
            display: DisplayId(self.read_u32()?),
            token: TokenId(self.read_u32()?),
            seq: self.read_u64()?,
        })
    }

    fn read_option_surface(&mut self) -> Option<Option<SurfaceId>> {
        let present = self.read_u8()?;
        let id = self.read_u32()?;
        Some((present != 0).then_some(SurfaceId(id)))
    }

    fn read_op(&mut self) -> Option<GroupOp> {
        Some(match self.read_u8()? {
            0 => GroupOp::Hide,
            1 => GroupOp::Command,
            2 => GroupOp::Offsets,
            3 => GroupOp::Visibility,
            4 => GroupOp::Layers,
            5 => GroupOp::Animation,
            _ => return None,
        })
    }

    fn read_change(&mut self) -> Option<MembershipChange> {
        Some(match self.read_u8()? {
            0 => MembershipChange::Added,
            1 => MembershipChange::Removed,
            2 => MembershipChange::Rejected,
            _ => return None,
        })
    }

    fn read_outcome(&mut self) -> Option<DispatchOutcome> {
        Some(match self.read_u8()? {
            0 => DispatchOutcome::Delivered,
            1 => DispatchOutcome::Failed(DispatchError::Unreachable),
            2 => DispatchOutcome::Failed(DispatchError::Detached),
            3 => DispatchOutcome::Unchanged,
            _ => return None,
        })
    }

    fn decode_membership(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        Some(RecordedEvent::Membership(MembershipEvent {
            display: h.display,
            token: h.token,
            seq: h.seq,
            surface: SurfaceId(self.read_u32()?),
            change: self.read_change()?,
            members: self.read_u32()?,
        }))
    }

    fn decode_exit(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        Some(RecordedEvent::Exit(ExitEvent {
            display: h.display,
            token: h.token,
            seq: h.seq,
            members: self.read_u32()?,
        }))
    }

    fn decode_hide(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        let hidden = self.read_bool()?;
        let members = self.read_u32()?;
        let reason = self.read_str()?;
        Some(RecordedEvent::Hide(HideRecord {
            display: h.display,
            token: h.token,
            seq: h.seq,
            hidden,
            reason,
            members,
        }))
    }

    fn decode_broadcast(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        Some(RecordedEvent::Broadcast(BroadcastEvent {
            display: h.display,
            token: h.token,
            seq: h.seq,
            op: self.read_op()?,
            members: self.read_u32()?,
            synchronous_member: self.read_option_surface()?,
            failures: self.read_u32()?,
        }))
    }

    fn decode_visibility(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        Some(RecordedEvent::Visibility(VisibilityEvent {
            display: h.display,
            token: h.token,
            seq: h.seq,
            hidden: self.read_bool()?,
        }))
    }

    fn decode_member_dispatch(&mut self) -> Option<RecordedEvent> {
        let h = self.read_header()?;
        Some(RecordedEvent::MemberDispatch(MemberDispatchEvent {
            display: h.display,
            token: h.token,
            seq: h.seq,
            op: self.read_op()?,
            surface: SurfaceId(self.read_u32()?),
            synchronous: self.read_bool()?,
            outcome: self.read_outcome()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let event = match tag {
            TAG_MEMBERSHIP => self.decode_membership(),
            TAG_EXIT => self.decode_exit(),
            TAG_HIDE => self.decode_hide(),
            TAG_BROADCAST => self.decode_broadcast(),
            TAG_VISIBILITY => self.decode_visibility(),
            TAG_MEMBER_DISPATCH => self.decode_member_dispatch(),
            _ => None, // unknown tag → stop iteration
        };
        if event.is_none() {
            // Never resume inside a bad record.
            self.pos = self.data.len();
        }
        event
    }
}

impl core::iter::FusedIterator for DecodeIter<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: DisplayId = DisplayId(1);
    const TOKEN: TokenId = TokenId(4);

    fn sample_broadcast() -> BroadcastEvent {
        BroadcastEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 9,
            op: GroupOp::Offsets,
            members: 3,
            synchronous_member: Some(SurfaceId(12)),
            failures: 0,
        }
    }

    #[test]
    fn broadcast_survives_recording() {
        let mut rec = RecorderSink::new();
        let orig = sample_broadcast();
        rec.on_broadcast(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::Broadcast(e) => {
                assert_eq!(e.display, orig.display);
                assert_eq!(e.token, orig.token);
                assert_eq!(e.seq, orig.seq);
                assert_eq!(e.op, orig.op);
                assert_eq!(e.members, orig.members);
                assert_eq!(e.synchronous_member, orig.synchronous_member);
                assert_eq!(e.failures, orig.failures);
            }
            other => panic!("expected Broadcast, got {other:?}"),
        }
    }

    #[test]
    fn hide_keeps_reason_text() {
        let mut rec = RecorderSink::new();
        rec.on_hide(&HideEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 3,
            hidden: true,
            reason: "keyguard occluded",
            members: 2,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::Hide(h)] => {
                assert_eq!(h.reason, "keyguard occluded");
                assert!(h.hidden);
                assert_eq!(h.members, 2);
            }
            other => panic!("expected one Hide, got {other:?}"),
        }
    }

    #[test]
    fn mixed_stream_preserves_order() {
        let mut rec = RecorderSink::new();
        rec.on_membership(&MembershipEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 0,
            surface: SurfaceId(5),
            change: MembershipChange::Added,
            members: 1,
        });
        rec.on_member_dispatch(&MemberDispatchEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 1,
            op: GroupOp::Command,
            surface: SurfaceId(5),
            synchronous: true,
            outcome: DispatchOutcome::Failed(DispatchError::Detached),
        });
        rec.on_visibility(&VisibilityEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 2,
            hidden: false,
        });
        rec.on_exit(&ExitEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 3,
            members: 1,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        let seqs: Vec<_> = events.iter().map(RecordedEvent::seq).collect();
        assert_eq!(seqs, [0, 1, 2, 3]);
        match &events[1] {
            RecordedEvent::MemberDispatch(e) => {
                assert_eq!(e.outcome, DispatchOutcome::Failed(DispatchError::Detached));
                assert!(e.synchronous);
            }
            other => panic!("expected MemberDispatch, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_broadcast(&sample_broadcast());
        rec.on_broadcast(&sample_broadcast());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn decoding_stays_stopped_after_truncation() {
        // A hide reason whose bytes happen to form a whole broadcast record.
        let mut inner = RecorderSink::new();
        inner.on_broadcast(&sample_broadcast());
        let mut reason = String::from_utf8(inner.into_bytes()).unwrap();
        reason.push('!');

        let mut rec = RecorderSink::new();
        rec.on_exit(&ExitEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 1,
            members: 3,
        });
        rec.on_hide(&HideEvent {
            display: DISPLAY,
            token: TOKEN,
            seq: 2,
            hidden: false,
            reason: &reason,
            members: 3,
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 1];

        let mut iter = decode(cut);
        assert!(matches!(iter.next(), Some(RecordedEvent::Exit(_))));
        assert!(iter.next().is_none(), "truncated hide decoded");
        assert!(
            iter.next().is_none(),
            "decoder resumed inside the truncated hide record"
        );
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_broadcast(&sample_broadcast());
        let mut bytes = rec.into_bytes();
        bytes.push(0xEE);
        bytes.extend_from_slice(&[0; 16]);
        assert_eq!(decode(&bytes).count(), 1);
    }

    #[test]
    fn empty_input() {
        assert_eq!(decode(&[]).count(), 0);
    }
}

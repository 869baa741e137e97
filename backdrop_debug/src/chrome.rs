// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Groups carry no clock, so the exported timeline uses each event's group
//! sequence number as its timestamp. Displays map to processes and group
//! tokens map to threads.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Membership(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.change),
                    "cat": "Membership",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "t",
                    "args": {
                        "surface": e.surface.0,
                        "members": e.members,
                    }
                }));
            }
            RecordedEvent::Exit(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Exit",
                    "cat": "Lifecycle",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "p",
                    "args": {
                        "members": e.members,
                    }
                }));
            }
            RecordedEvent::Hide(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": if e.hidden { "Hide" } else { "Show" },
                    "cat": "Broadcast",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "t",
                    "args": {
                        "reason": e.reason,
                        "members": e.members,
                    }
                }));
            }
            RecordedEvent::Broadcast(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.op.as_str(),
                    "cat": "Broadcast",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "t",
                    "args": {
                        "members": e.members,
                        "synchronous_member": e.synchronous_member.map(|id| id.0),
                        "failures": e.failures,
                    }
                }));
            }
            RecordedEvent::Visibility(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "VisibilityFlip",
                    "cat": "Lifecycle",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "t",
                    "args": {
                        "hidden": e.hidden,
                    }
                }));
            }
            RecordedEvent::MemberDispatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{}:member", e.op.as_str()),
                    "cat": "Rich",
                    "ts": e.seq,
                    "pid": e.display.0,
                    "tid": e.token.0,
                    "s": "t",
                    "args": {
                        "surface": e.surface.0,
                        "synchronous": e.synchronous,
                        "outcome": format!("{:?}", e.outcome),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use backdrop_core::id::{DisplayId, SurfaceId, TokenId};
    use backdrop_core::trace::{
        BroadcastEvent, GroupOp, HideEvent, MembershipChange, MembershipEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_membership(&MembershipEvent {
            display: DisplayId(0),
            token: TokenId(7),
            seq: 0,
            surface: SurfaceId(1),
            change: MembershipChange::Added,
            members: 1,
        });
        rec.on_hide(&HideEvent {
            display: DisplayId(0),
            token: TokenId(7),
            seq: 1,
            hidden: true,
            reason: "keyguard",
            members: 1,
        });
        rec.on_broadcast(&BroadcastEvent {
            display: DisplayId(0),
            token: TokenId(7),
            seq: 2,
            op: GroupOp::Offsets,
            members: 1,
            synchronous_member: None,
            failures: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["name"], "Added");
        assert_eq!(parsed[0]["tid"], 7);

        assert_eq!(parsed[1]["name"], "Hide");
        assert_eq!(parsed[1]["args"]["reason"], "keyguard");

        assert_eq!(parsed[2]["name"], "offsets");
        assert_eq!(parsed[2]["ts"], 2);
        assert!(parsed[2]["args"]["synchronous_member"].is_null());
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}

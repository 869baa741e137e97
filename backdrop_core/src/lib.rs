// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface groups for wallpaper and other background layers.
//!
//! `backdrop_core` models the set of render targets that make up one
//! display's wallpaper as a single [`SurfaceGroup`](group::SurfaceGroup) and
//! forwards visibility, offset, animation, and client commands to every
//! member. It is `no_std` compatible (with `alloc`) and owns no window tree,
//! animator, or IPC transport of its own; those are reached through the
//! traits in [`host`].
//!
//! # Architecture
//!
//! ```text
//!   Host compositor
//!       │ (holds the display lock)
//!       ▼
//!   SurfaceGroup::{set_hidden, broadcast_command, update_offsets,
//!                  update_visibility, update_layers, start_animation}
//!       │                        │                       │
//!       ▼                        ▼                       ▼
//!   SurfaceHandle (×N,     OffsetPolicy            DisplayContext
//!   newest first)          (ParallaxPolicy)        (layout, attach/detach)
//!       │
//!       ▼
//!   Tracer ──► TraceSink
//! ```
//!
//! **[`group`]**: The broadcaster. Reverse-insertion iteration, at most one
//! synchronous member per command/offset broadcast, monotonic exit.
//!
//! **[`host`]**: [`SurfaceHandle`](host::SurfaceHandle),
//! [`DisplayContext`](host::DisplayContext), and
//! [`OffsetPolicy`](host::OffsetPolicy) contracts.
//!
//! **[`offset`]**: Parallax offset policy for oversized wallpapers.
//!
//! **[`command`]**: Client commands and their payloads.
//!
//! **[`animation`]**: Transform/opacity animation values.
//!
//! **[`id`]**: Display, token, and surface identifiers.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! group instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-member
//!   dispatch events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod command;
pub mod group;
pub mod host;
pub mod id;
pub mod offset;
pub mod trace;

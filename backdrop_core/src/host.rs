// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts between a [`SurfaceGroup`](crate::group::SurfaceGroup) and the
//! host compositor.
//!
//! The group owns no window tree, animator, or transport of its own. Each
//! collaborator is reached through one of the traits below:
//!
//! - **[`SurfaceHandle`]**: One member render target. Implemented by the
//!   host's window type (or a proxy to a client process).
//!
//! - **[`DisplayContext`]**: The display that owns the group. Supplies the
//!   logical display size and accepts layout invalidation and group
//!   registration.
//!
//! - **[`OffsetPolicy`]**: Decides each member's wallpaper offset. See
//!   [`ParallaxPolicy`](crate::offset::ParallaxPolicy) for the stock
//!   implementation.
//!
//! # Locking
//!
//! Every group operation takes `&mut self` and the collaborators by `&mut`.
//! Callers that share a group across threads wrap the owning display in
//! their own lock; the group never locks internally.

use core::fmt;

use kurbo::{Point, Size};

use crate::animation::AnimationSpec;
use crate::command::Command;
use crate::id::{SurfaceId, TokenId};

/// Failure delivering a command to one member's client.
///
/// Broadcasts swallow these per member and keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchError {
    /// The client did not answer (dead process, full transport buffer).
    Unreachable,
    /// The member's client connection is already torn down.
    Detached,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => f.write_str("member client is unreachable"),
            Self::Detached => f.write_str("member client is detached"),
        }
    }
}

impl core::error::Error for DispatchError {}

/// One render target owned by a surface group.
pub trait SurfaceHandle {
    /// Stable identity of this member.
    fn id(&self) -> SurfaceId;

    /// Hides or re-shows the surface without telling the client.
    ///
    /// `reason` is a short human-readable tag for diagnostics.
    fn hide_surface(&mut self, hidden: bool, reason: &str);

    /// Tells the client whether it is visible.
    fn set_visible(&mut self, visible: bool);

    /// Forwards a command to the client.
    ///
    /// When `synchronous` is set the implementation should wait (bounded by
    /// its transport) for the client to acknowledge.
    fn dispatch_command(
        &mut self,
        command: &Command,
        synchronous: bool,
    ) -> Result<(), DispatchError>;

    /// Recomputes the surface's shown position from its frame and current
    /// offset, returning the new position.
    fn compute_shown_position(&mut self) -> Point;

    /// Moves the surface to `position` directly, without a layout pass.
    fn set_offset(&mut self, position: Point);

    /// Hands `animation` to the member's animator.
    fn set_animation(&mut self, animation: &AnimationSpec);

    /// Shifts the member's animation layer by `adjustment`.
    fn adjust_anim_layer(&mut self, adjustment: i32);

    /// Whether the surface is meant to be visible but has not drawn yet.
    fn is_visible_and_not_yet_rendered(&self) -> bool;
}

/// The display context that owns one or more surface groups.
pub trait DisplayContext {
    /// Logical size of the display, in pixels.
    fn display_size(&self) -> Size;

    /// Requests a layout pass before the next frame.
    fn mark_layout_needed(&mut self);

    /// Registers a newly created group.
    fn attach_group(&mut self, token: TokenId);

    /// Deregisters a group that has begun exiting.
    fn detach_group(&mut self, token: TokenId);
}

/// Decides the wallpaper offset of each member.
pub trait OffsetPolicy<H: ?Sized> {
    /// Updates `member`'s offset for a display of `display_size`.
    ///
    /// Returns `true` if the offset changed. `synchronous` asks the policy to
    /// wait for the client to acknowledge the new offset.
    fn try_update_offset(&mut self, member: &mut H, display_size: Size, synchronous: bool) -> bool;
}

impl<H: ?Sized, P: OffsetPolicy<H> + ?Sized> OffsetPolicy<H> for &mut P {
    fn try_update_offset(&mut self, member: &mut H, display_size: Size, synchronous: bool) -> bool {
        (**self).try_update_offset(member, display_size, synchronous)
    }
}

// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface group: one display's wallpaper members and the broadcasts
//! that drive them.
//!
//! # Iteration order
//!
//! Members are stored in insertion order. Every broadcast visits them in
//! **reverse** insertion order, so the most recently added member is
//! addressed first.
//!
//! # Synchronous dispatch
//!
//! Command and offset broadcasts hand `synchronous = true` to at most one
//! member and clear it for everyone after:
//!
//! - [`broadcast_command`](SurfaceGroup::broadcast_command) clears it after
//!   the first member that *accepted* the dispatch. A member whose client is
//!   unreachable is skipped and the next one keeps the flag.
//! - [`update_offsets`](SurfaceGroup::update_offsets) clears it after the
//!   first member whose offset *changed*. Members the policy leaves alone do
//!   not consume it.
//!
//! # Lifecycle
//!
//! [`SurfaceGroup::new`] registers the group with its display.
//! [`begin_exit`](SurfaceGroup::begin_exit) deregisters it and closes it to
//! new members; `exiting` never resets.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::animation::AnimationSpec;
use crate::command::Command;
use crate::host::{DisplayContext, OffsetPolicy, SurfaceHandle};
use crate::id::{DisplayId, SurfaceId, TokenId};
#[cfg(feature = "trace-rich")]
use crate::trace::{DispatchOutcome, MemberDispatchEvent};
use crate::trace::{
    BroadcastEvent, ExitEvent, GroupOp, HideEvent, MembershipChange, MembershipEvent, Tracer,
    VisibilityEvent,
};

/// Why a group refused a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupError {
    /// The group has begun exiting and accepts no new members.
    Exiting,
    /// A member with this id is already in the group.
    DuplicateMember(SurfaceId),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exiting => f.write_str("surface group is exiting"),
            Self::DuplicateMember(id) => write!(f, "surface {id} is already a member"),
        }
    }
}

impl core::error::Error for GroupError {}

/// A member handle the group refused, handed back to the caller.
pub struct Rejected<H> {
    /// The refused handle.
    pub handle: H,
    /// Why it was refused.
    pub error: GroupError,
}

impl<H> fmt::Debug for Rejected<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for Rejected<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<H> core::error::Error for Rejected<H> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The wallpaper members of one display, driven as a unit.
pub struct SurfaceGroup<H> {
    display: DisplayId,
    token: TokenId,
    members: Vec<H>,
    hidden: bool,
    exiting: bool,
    seq: u64,
}

impl<H> fmt::Debug for SurfaceGroup<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceGroup")
            .field("display", &self.display)
            .field("token", &self.token)
            .field("members", &self.members.len())
            .field("hidden", &self.hidden)
            .field("exiting", &self.exiting)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for SurfaceGroup<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurfaceGroup{{display={} token={}}}",
            self.display.0, self.token.0
        )
    }
}

impl<H: SurfaceHandle> SurfaceGroup<H> {
    /// Creates an empty, visible group and attaches it to `display_ctx`.
    pub fn new(display: DisplayId, token: TokenId, display_ctx: &mut impl DisplayContext) -> Self {
        display_ctx.attach_group(token);
        Self {
            display,
            token,
            members: Vec::new(),
            hidden: false,
            exiting: false,
            seq: 0,
        }
    }

    // -- Accessors --

    /// Display this group belongs to.
    #[must_use]
    pub const fn display(&self) -> DisplayId {
        self.display
    }

    /// Token identifying this group on its display.
    #[must_use]
    pub const fn token(&self) -> TokenId {
        self.token
    }

    /// Group-level hidden flag.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether [`begin_exit`](Self::begin_exit) has run.
    #[must_use]
    pub const fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[H] {
        &self.members
    }

    /// Member ids in insertion order.
    pub fn member_ids(&self) -> impl Iterator<Item = SurfaceId> {
        self.members.iter().map(SurfaceHandle::id)
    }

    /// Whether a member with `id` is present.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    /// Mutable access to the member with `id`.
    pub fn member_mut(&mut self, id: SurfaceId) -> Option<&mut H> {
        self.members.iter_mut().find(|m| m.id() == id)
    }

    /// Sequence number the next traced operation will carry.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    // -- Membership --

    /// Appends `handle` as the newest member.
    ///
    /// # Errors
    ///
    /// Returns the handle in a [`Rejected`] if the group is exiting
    /// ([`GroupError::Exiting`]) or already holds a member with the same id
    /// ([`GroupError::DuplicateMember`]). Membership is unchanged on error.
    pub fn add_member(&mut self, handle: H, tracer: &mut Tracer<'_>) -> Result<(), Rejected<H>> {
        let surface = handle.id();
        let error = if self.exiting {
            Some(GroupError::Exiting)
        } else if self.contains(surface) {
            Some(GroupError::DuplicateMember(surface))
        } else {
            None
        };

        let seq = self.next_seq();
        let result = match error {
            Some(error) => Err(Rejected { handle, error }),
            None => {
                self.members.push(handle);
                Ok(())
            }
        };
        tracer.membership(&MembershipEvent {
            display: self.display,
            token: self.token,
            seq,
            surface,
            change: if result.is_ok() {
                MembershipChange::Added
            } else {
                MembershipChange::Rejected
            },
            members: self.member_count(),
        });
        result
    }

    /// Removes the member with `id` and hands it back.
    ///
    /// Returns `None`, and changes nothing, if no such member exists.
    pub fn remove_member(&mut self, id: SurfaceId, tracer: &mut Tracer<'_>) -> Option<H> {
        let pos = self.members.iter().position(|m| m.id() == id)?;
        let handle = self.members.remove(pos);
        let seq = self.next_seq();
        tracer.membership(&MembershipEvent {
            display: self.display,
            token: self.token,
            seq,
            surface: id,
            change: MembershipChange::Removed,
            members: self.member_count(),
        });
        Some(handle)
    }

    /// Starts tearing the group down.
    ///
    /// Closes the group to new members and detaches it from `display_ctx`.
    /// Calling this again does nothing. Existing members stay until the
    /// caller removes them.
    pub fn begin_exit(&mut self, display_ctx: &mut impl DisplayContext, tracer: &mut Tracer<'_>) {
        if self.exiting {
            return;
        }
        self.exiting = true;
        display_ctx.detach_group(self.token);
        let seq = self.next_seq();
        tracer.exit(&ExitEvent {
            display: self.display,
            token: self.token,
            seq,
            members: self.member_count(),
        });
    }

    // -- Broadcasts --

    /// Hides (or re-shows) every member's surface, then records `hidden` as
    /// the group state.
    pub fn set_hidden(&mut self, hidden: bool, reason: &str, tracer: &mut Tracer<'_>) {
        let seq = self.next_seq();
        for member in self.members.iter_mut().rev() {
            member.hide_surface(hidden, reason);
            #[cfg(feature = "trace-rich")]
            tracer.member_dispatch(&MemberDispatchEvent {
                display: self.display,
                token: self.token,
                seq,
                op: GroupOp::Hide,
                surface: member.id(),
                synchronous: false,
                outcome: DispatchOutcome::Delivered,
            });
        }
        self.hidden = hidden;
        tracer.hide(&HideEvent {
            display: self.display,
            token: self.token,
            seq,
            hidden,
            reason,
            members: self.member_count(),
        });
    }

    /// Dispatches `command` to every member's client.
    ///
    /// If `synchronous` is set, only the first member (in broadcast order)
    /// that accepts the dispatch is asked to be synchronous. Dispatch errors
    /// are skipped; the broadcast always reaches every member.
    pub fn broadcast_command(
        &mut self,
        command: &Command,
        synchronous: bool,
        tracer: &mut Tracer<'_>,
    ) {
        let seq = self.next_seq();
        let mut sync = synchronous;
        let mut synchronous_member = None;
        let mut failures = 0_u32;

        for member in self.members.iter_mut().rev() {
            let asked = sync;
            let result = member.dispatch_command(command, asked);
            match result {
                Ok(()) => {
                    if asked {
                        synchronous_member = Some(member.id());
                    }
                    // Only one member is synchronous per broadcast.
                    sync = false;
                }
                Err(_) => failures += 1,
            }
            #[cfg(feature = "trace-rich")]
            tracer.member_dispatch(&MemberDispatchEvent {
                display: self.display,
                token: self.token,
                seq,
                op: GroupOp::Command,
                surface: member.id(),
                synchronous: asked,
                outcome: match result {
                    Ok(()) => DispatchOutcome::Delivered,
                    Err(e) => DispatchOutcome::Failed(e),
                },
            });
        }

        tracer.broadcast(&BroadcastEvent {
            display: self.display,
            token: self.token,
            seq,
            op: GroupOp::Command,
            members: self.member_count(),
            synchronous_member,
            failures,
        });
    }

    /// Asks `policy` to update each member's offset for a display of
    /// `display_size`, and moves every member whose offset changed.
    ///
    /// If `synchronous` is set, only the first member whose offset changed
    /// is asked to be synchronous.
    pub fn update_offsets<P>(
        &mut self,
        policy: &mut P,
        display_size: Size,
        synchronous: bool,
        tracer: &mut Tracer<'_>,
    ) where
        P: OffsetPolicy<H> + ?Sized,
    {
        let seq = self.next_seq();
        let mut sync = synchronous;
        let mut synchronous_member = None;

        for member in self.members.iter_mut().rev() {
            let asked = sync;
            let changed = policy.try_update_offset(member, display_size, asked);
            if changed {
                // The offset is applied directly; no layout pass needed.
                let position = member.compute_shown_position();
                member.set_offset(position);
                if asked {
                    synchronous_member = Some(member.id());
                }
                sync = false;
            }
            #[cfg(feature = "trace-rich")]
            tracer.member_dispatch(&MemberDispatchEvent {
                display: self.display,
                token: self.token,
                seq,
                op: GroupOp::Offsets,
                surface: member.id(),
                synchronous: asked,
                outcome: if changed {
                    DispatchOutcome::Delivered
                } else {
                    DispatchOutcome::Unchanged
                },
            });
        }

        tracer.broadcast(&BroadcastEvent {
            display: self.display,
            token: self.token,
            seq,
            op: GroupOp::Offsets,
            members: self.member_count(),
            synchronous_member,
            failures: 0,
        });
    }

    /// Pushes `visible` to every member.
    ///
    /// If the group's hidden flag disagrees with `visible`, it is flipped and
    /// `display_ctx` is asked for a layout pass, since showing or hiding the
    /// wallpaper changes its effective size. When becoming visible, each
    /// member's offset is refreshed first (never synchronously).
    pub fn update_visibility<C, P>(
        &mut self,
        display_ctx: &mut C,
        policy: &mut P,
        visible: bool,
        tracer: &mut Tracer<'_>,
    ) where
        C: DisplayContext + ?Sized,
        P: OffsetPolicy<H> + ?Sized,
    {
        self.refresh_visibility(display_ctx, policy, visible, None, tracer);
    }

    /// Like [`update_visibility`](Self::update_visibility), and also shifts
    /// every member's animation layer by `anim_layer_adjustment`.
    pub fn update_layers<C, P>(
        &mut self,
        display_ctx: &mut C,
        policy: &mut P,
        visible: bool,
        anim_layer_adjustment: i32,
        tracer: &mut Tracer<'_>,
    ) where
        C: DisplayContext + ?Sized,
        P: OffsetPolicy<H> + ?Sized,
    {
        self.refresh_visibility(
            display_ctx,
            policy,
            visible,
            Some(anim_layer_adjustment),
            tracer,
        );
    }

    /// Hands `animation` to every member's animator.
    pub fn start_animation(&mut self, animation: &AnimationSpec, tracer: &mut Tracer<'_>) {
        let seq = self.next_seq();
        for member in self.members.iter_mut().rev() {
            member.set_animation(animation);
            #[cfg(feature = "trace-rich")]
            tracer.member_dispatch(&MemberDispatchEvent {
                display: self.display,
                token: self.token,
                seq,
                op: GroupOp::Animation,
                surface: member.id(),
                synchronous: false,
                outcome: DispatchOutcome::Delivered,
            });
        }
        tracer.broadcast(&BroadcastEvent {
            display: self.display,
            token: self.token,
            seq,
            op: GroupOp::Animation,
            members: self.member_count(),
            synchronous_member: None,
            failures: 0,
        });
    }

    // -- Queries --

    /// Whether any member should be visible but has not drawn yet.
    ///
    /// Hosts use this to hold a transition until the wallpaper is ready.
    #[must_use]
    pub fn has_visible_unrendered_member(&self) -> bool {
        self.members
            .iter()
            .rev()
            .any(SurfaceHandle::is_visible_and_not_yet_rendered)
    }

    // -- Internals --

    fn refresh_visibility<C, P>(
        &mut self,
        display_ctx: &mut C,
        policy: &mut P,
        visible: bool,
        anim_layer_adjustment: Option<i32>,
        tracer: &mut Tracer<'_>,
    ) where
        C: DisplayContext + ?Sized,
        P: OffsetPolicy<H> + ?Sized,
    {
        let seq = self.next_seq();
        let op = if anim_layer_adjustment.is_some() {
            GroupOp::Layers
        } else {
            GroupOp::Visibility
        };

        if self.hidden == visible {
            self.hidden = !visible;
            display_ctx.mark_layout_needed();
            tracer.visibility(&VisibilityEvent {
                display: self.display,
                token: self.token,
                seq,
                hidden: self.hidden,
            });
        }

        let display_size = display_ctx.display_size();
        for member in self.members.iter_mut().rev() {
            if visible {
                policy.try_update_offset(member, display_size, false);
            }
            member.set_visible(visible);
            if let Some(adjustment) = anim_layer_adjustment {
                member.adjust_anim_layer(adjustment);
            }
            #[cfg(feature = "trace-rich")]
            tracer.member_dispatch(&MemberDispatchEvent {
                display: self.display,
                token: self.token,
                seq,
                op,
                surface: member.id(),
                synchronous: false,
                outcome: DispatchOutcome::Delivered,
            });
        }

        tracer.broadcast(&BroadcastEvent {
            display: self.display,
            token: self.token,
            seq,
            op,
            members: self.member_count(),
            synchronous_member: None,
            failures: 0,
        });
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn member_count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }
}

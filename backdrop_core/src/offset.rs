// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallax wallpaper offsets.
//!
//! A wallpaper surface is usually larger than the display so that it can
//! scroll behind the launcher. [`ParallaxPolicy`] maps a normalized scroll
//! position (`0.0` = left/top edge, `1.0` = right/bottom edge) onto a pixel
//! offset for each member:
//!
//! ```text
//!   excess = frame_size - display_size
//!   offset = excess > 0 ? -(excess * position) : 0
//! ```
//!
//! Members that are no larger than the display along an axis are pinned at
//! `0` on that axis.

#[cfg(not(feature = "std"))]
#[cfg_attr(
    test,
    allow(unused_imports, reason = "test builds link std, whose inherent float methods win")
)]
use kurbo::common::FloatFuncs as _;
use kurbo::{Size, Vec2};

use crate::host::OffsetPolicy;

/// A member whose wallpaper offset can be read and written.
pub trait Scrollable {
    /// Size of the member's frame, in pixels.
    fn frame_size(&self) -> Size;

    /// Offset currently applied to the member.
    fn scroll_offset(&self) -> Vec2;

    /// Stores a new offset and forwards it to the client.
    ///
    /// With `synchronous` set, the implementation waits (bounded by its
    /// transport) for the client to acknowledge.
    fn set_scroll_offset(&mut self, offset: Vec2, synchronous: bool);
}

/// Configuration for [`ParallaxPolicy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxConfig {
    /// Scroll position the policy starts at, per axis in `[0, 1]`.
    pub initial_position: Vec2,
    /// Distance between launcher pages in normalized units, if paged.
    ///
    /// When set, [`ParallaxPolicy::set_page`] snaps the position to
    /// multiples of this step.
    pub step: Option<Vec2>,
    /// Round offsets to whole pixels.
    pub snap_to_pixels: bool,
}

impl ParallaxConfig {
    /// Centered wallpaper, no paging.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            initial_position: Vec2::new(0.5, 0.5),
            step: None,
            snap_to_pixels: true,
        }
    }

    /// Wallpaper pinned at its top-left corner.
    #[must_use]
    pub const fn pinned() -> Self {
        Self {
            initial_position: Vec2::ZERO,
            step: None,
            snap_to_pixels: true,
        }
    }

    /// Horizontal paging across `pages` launcher pages.
    ///
    /// Fewer than two pages behaves like [`pinned`](Self::pinned) with a
    /// zero step.
    #[must_use]
    pub fn pages(pages: u32) -> Self {
        let step_x = if pages > 1 {
            1.0 / f64::from(pages - 1)
        } else {
            0.0
        };
        Self {
            initial_position: Vec2::new(0.0, 0.5),
            step: Some(Vec2::new(step_x, 0.0)),
            snap_to_pixels: true,
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self::centered()
    }
}

/// [`OffsetPolicy`] that scrolls oversized wallpapers with a normalized
/// position.
#[derive(Clone, Debug)]
pub struct ParallaxPolicy {
    config: ParallaxConfig,
    position: Vec2,
}

impl ParallaxPolicy {
    /// Creates a policy at the configured initial position.
    #[must_use]
    pub fn new(config: ParallaxConfig) -> Self {
        Self {
            position: clamp_unit(config.initial_position),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ParallaxConfig {
        &self.config
    }

    /// Current normalized position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves to `position`, clamped to `[0, 1]` per axis.
    ///
    /// Offsets are not pushed until the group's next
    /// [`update_offsets`](crate::group::SurfaceGroup::update_offsets).
    pub fn set_position(&mut self, position: Vec2) {
        self.position = clamp_unit(position);
    }

    /// Moves to launcher page `page` along the configured step.
    ///
    /// Without a step this leaves the position unchanged.
    pub fn set_page(&mut self, page: u32) {
        if let Some(step) = self.config.step {
            let page = f64::from(page);
            let x = if step.x > 0.0 { step.x * page } else { self.position.x };
            let y = if step.y > 0.0 { step.y * page } else { self.position.y };
            self.set_position(Vec2::new(x, y));
        }
    }

    /// Offset for a frame of `frame` shown on a display of `display`.
    #[must_use]
    pub fn offset_for(&self, frame: Size, display: Size) -> Vec2 {
        let x = axis_offset(frame.width - display.width, self.position.x);
        let y = axis_offset(frame.height - display.height, self.position.y);
        let offset = Vec2::new(x, y);
        if self.config.snap_to_pixels {
            Vec2::new(offset.x.round(), offset.y.round())
        } else {
            offset
        }
    }
}

impl Default for ParallaxPolicy {
    fn default() -> Self {
        Self::new(ParallaxConfig::default())
    }
}

impl<H: Scrollable + ?Sized> OffsetPolicy<H> for ParallaxPolicy {
    fn try_update_offset(&mut self, member: &mut H, display_size: Size, synchronous: bool) -> bool {
        let offset = self.offset_for(member.frame_size(), display_size);
        if member.scroll_offset() == offset {
            return false;
        }
        member.set_scroll_offset(offset, synchronous);
        true
    }
}

fn axis_offset(excess: f64, position: f64) -> f64 {
    if excess > 0.0 {
        // `0.0 - x` keeps a zero offset positive.
        0.0 - excess * position
    } else {
        0.0
    }
}

fn clamp_unit(v: Vec2) -> Vec2 {
    let clamp = |c: f64| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
    Vec2::new(clamp(v.x), clamp(v.y))
}

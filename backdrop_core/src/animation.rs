// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation descriptions applied to every member of a group.
//!
//! An [`AnimationSpec`] is a value, not a running animation: the host's
//! animator owns the clock and calls [`AnimationSpec::sample`] with the
//! fraction of the duration that has elapsed.

use core::time::Duration;

use kurbo::Affine;

/// A transform and opacity sampled from an [`AnimationSpec`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Transform to apply on top of the member's shown position.
    pub transform: Affine,
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f32,
}

/// Linear transform/opacity animation between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    /// Transform at the start of the animation.
    pub from: Affine,
    /// Transform at the end of the animation.
    pub to: Affine,
    /// Opacity at the start of the animation.
    pub from_opacity: f32,
    /// Opacity at the end of the animation.
    pub to_opacity: f32,
    /// Total running time.
    pub duration: Duration,
}

impl AnimationSpec {
    /// An animation that changes nothing and finishes immediately.
    pub const NONE: Self = Self {
        from: Affine::IDENTITY,
        to: Affine::IDENTITY,
        from_opacity: 1.0,
        to_opacity: 1.0,
        duration: Duration::ZERO,
    };

    /// Opacity-only fade between `from` and `to`.
    #[must_use]
    pub const fn fade(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from: Affine::IDENTITY,
            to: Affine::IDENTITY,
            from_opacity: from,
            to_opacity: to,
            duration,
        }
    }

    /// Transform-only animation at full opacity.
    #[must_use]
    pub const fn transform(from: Affine, to: Affine, duration: Duration) -> Self {
        Self {
            from,
            to,
            from_opacity: 1.0,
            to_opacity: 1.0,
            duration,
        }
    }

    /// Samples the animation at `fraction` of its duration.
    ///
    /// `fraction` is clamped to `[0, 1]`; NaN samples the start.
    #[must_use]
    pub fn sample(&self, fraction: f64) -> AnimationFrame {
        let t = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let a = self.from.as_coeffs();
        let b = self.to.as_coeffs();
        let mut coeffs = [0.0; 6];
        for (out, (x, y)) in coeffs.iter_mut().zip(a.iter().zip(b.iter())) {
            *out = x + (y - x) * t;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "opacity interpolation only needs f32 precision"
        )]
        let t32 = t as f32;
        AnimationFrame {
            transform: Affine::new(coeffs),
            opacity: self.from_opacity + (self.to_opacity - self.from_opacity) * t32,
        }
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_midpoint() {
        let spec = AnimationSpec::fade(0.0, 1.0, Duration::from_millis(200));
        let frame = spec.sample(0.5);
        assert_eq!(frame.opacity, 0.5);
        assert_eq!(frame.transform, Affine::IDENTITY);
    }

    #[test]
    fn translation_interpolates() {
        let spec = AnimationSpec::transform(
            Affine::translate((0.0, 0.0)),
            Affine::translate((100.0, -40.0)),
            Duration::from_millis(300),
        );
        let frame = spec.sample(0.25);
        assert_eq!(frame.transform, Affine::translate((25.0, -10.0)));
        assert_eq!(frame.opacity, 1.0);
    }

    #[test]
    fn fraction_is_clamped() {
        let spec = AnimationSpec::fade(0.2, 0.8, Duration::from_millis(100));
        assert!((spec.sample(-3.0).opacity - 0.2).abs() < 1e-6, "below range");
        assert!((spec.sample(7.0).opacity - 0.8).abs() < 1e-6, "above range");
        assert!((spec.sample(f64::NAN).opacity - 0.2).abs() < 1e-6, "NaN");
    }
}

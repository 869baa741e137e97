// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated wallpaper group lifecycle that exercises the tracing and
//! diagnostics pipeline.
//!
//! Builds a group of three wallpaper surfaces on a phone-sized display,
//! scrolls it across five launcher pages, sends client commands (one of
//! which reaches a dead client), animates, hides for the keyguard, and
//! exits. Events go to both a
//! [`PrettyPrintSink`](backdrop_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](backdrop_debug::recorder::RecorderSink); the recording
//! is then exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use kurbo::{Affine, Point, Size, Vec2};

use backdrop_core::animation::AnimationSpec;
use backdrop_core::command::{Command, Extras};
use backdrop_core::group::SurfaceGroup;
use backdrop_core::host::{DispatchError, DisplayContext, SurfaceHandle};
use backdrop_core::id::{DisplayId, SurfaceId, TokenId};
use backdrop_core::offset::{ParallaxConfig, ParallaxPolicy, Scrollable};
use backdrop_core::trace::Tracer;

use backdrop_debug::FanOut;
use backdrop_debug::pretty::PrettyPrintSink;
use backdrop_debug::recorder::RecorderSink;

const DISPLAY_SIZE: Size = Size::new(1080.0, 1920.0);
const PAGES: u32 = 5;

/// A wallpaper surface that remembers what it was told.
#[derive(Debug)]
struct DemoSurface {
    id: SurfaceId,
    frame: Point,
    size: Size,
    scroll: Vec2,
    shown: Point,
    hidden: bool,
    visible: bool,
    anim_layer: i32,
    client_alive: bool,
    drawn: bool,
}

impl DemoSurface {
    fn new(id: u32, size: Size) -> Self {
        Self {
            id: SurfaceId(id),
            frame: Point::ORIGIN,
            size,
            scroll: Vec2::ZERO,
            shown: Point::ORIGIN,
            hidden: false,
            visible: false,
            anim_layer: 0,
            client_alive: true,
            drawn: false,
        }
    }
}

impl SurfaceHandle for DemoSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn hide_surface(&mut self, hidden: bool, _reason: &str) {
        self.hidden = hidden;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.drawn = false;
        }
    }

    fn dispatch_command(
        &mut self,
        _command: &Command,
        _synchronous: bool,
    ) -> Result<(), DispatchError> {
        if self.client_alive {
            Ok(())
        } else {
            Err(DispatchError::Unreachable)
        }
    }

    fn compute_shown_position(&mut self) -> Point {
        self.frame + self.scroll
    }

    fn set_offset(&mut self, position: Point) {
        self.shown = position;
    }

    fn set_animation(&mut self, _animation: &AnimationSpec) {}

    fn adjust_anim_layer(&mut self, adjustment: i32) {
        self.anim_layer = adjustment;
    }

    fn is_visible_and_not_yet_rendered(&self) -> bool {
        self.visible && !self.drawn
    }
}

impl Scrollable for DemoSurface {
    fn frame_size(&self) -> Size {
        self.size
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: Vec2, _synchronous: bool) {
        self.scroll = offset;
    }
}

#[derive(Debug, Default)]
struct DemoDisplay {
    layout_requests: u32,
    groups: Vec<TokenId>,
}

impl DisplayContext for DemoDisplay {
    fn display_size(&self) -> Size {
        DISPLAY_SIZE
    }

    fn mark_layout_needed(&mut self) {
        self.layout_requests += 1;
    }

    fn attach_group(&mut self, token: TokenId) {
        self.groups.push(token);
    }

    fn detach_group(&mut self, token: TokenId) {
        self.groups.retain(|t| *t != token);
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut sinks = FanOut::new(pretty, RecorderSink::new());

    // -- display + policy --------------------------------------------------
    let mut display = DemoDisplay::default();
    let mut policy = ParallaxPolicy::new(ParallaxConfig::pages(PAGES));

    {
        let mut tracer = Tracer::new(&mut sinks);
        let mut group = SurfaceGroup::new(DisplayId(0), TokenId(1), &mut display);

        // 1. Membership: a wide wallpaper, a display-sized one, a lock screen
        // copy. Adding the same surface twice is refused.
        for (id, width) in [(1, 2160.0), (2, 1080.0), (3, 2160.0)] {
            let surface = DemoSurface::new(id, Size::new(width, DISPLAY_SIZE.height));
            if let Err(rejected) = group.add_member(surface, &mut tracer) {
                println!("unexpected rejection: {rejected}");
            }
        }
        if let Err(rejected) = group.add_member(DemoSurface::new(3, DISPLAY_SIZE), &mut tracer) {
            println!("refused: {rejected}");
        }

        // 2. Show the group. Offsets are refreshed on the way in.
        group.update_visibility(&mut display, &mut policy, true, &mut tracer);
        for member in group.members() {
            println!("  {} shown at {:?}", member.id, member.shown);
        }

        // 3. Scroll across the launcher pages, waiting on the first member
        // that actually moves.
        for page in 0..PAGES {
            policy.set_page(page);
            group.update_offsets(&mut policy, display.display_size(), true, &mut tracer);
        }

        // 4. Client commands. Surface 3's client has died; the sync flag
        // passes to the next member.
        if let Some(dead) = group.member_mut(SurfaceId(3)) {
            dead.client_alive = false;
        }
        let tap = Command::new("android.wallpaper.tap", 540, 960, 0)
            .with_extras(Extras::new().with("pressure", 0.8).with("source", "touch"));
        group.broadcast_command(&tap, true, &mut tracer);
        let waking = Command::new("android.wallpaper.wakingup", 0, 0, 0);
        group.broadcast_command(&waking, false, &mut tracer);

        // 5. Zoom-in animation, then restack above the launcher.
        let zoom = AnimationSpec::transform(
            Affine::scale(1.1),
            Affine::IDENTITY,
            Duration::from_millis(300),
        );
        group.start_animation(&zoom, &mut tracer);
        group.update_layers(&mut display, &mut policy, true, 2, &mut tracer);
        println!(
            "  waiting on first draw: {}",
            group.has_visible_unrendered_member()
        );

        // 6. Keyguard occludes the wallpaper.
        group.set_hidden(true, "keyguard", &mut tracer);
        group.update_visibility(&mut display, &mut policy, false, &mut tracer);
        for member in group.members() {
            println!(
                "  {} hidden={} anim_layer={}",
                member.id, member.hidden, member.anim_layer
            );
        }

        // 7. Exit and drain.
        group.begin_exit(&mut display, &mut tracer);
        let ids: Vec<_> = group.member_ids().collect();
        for id in ids {
            let _ = group.remove_member(id, &mut tracer);
        }
        println!("{group} exiting={} members={}", group.is_exiting(), group.len());
    }

    println!(
        "display: {} layout requests, {} attached groups",
        display.layout_requests,
        display.groups.len()
    );

    // -- export Chrome trace -----------------------------------------------
    let (_, recorder) = sinks.into_inner();
    let path = "group_trace.json";
    let file = File::create(path).expect("failed to create group_trace.json");
    let mut writer = BufWriter::new(file);
    backdrop_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}

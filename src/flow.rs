//! Frame-driven overlay flows.
//!
//! An [`OverlayFlow`] is fed the host window's events and is stepped once per
//! display refresh. The host owns the event loop; a flow only reacts.
//!
//! # Lifecycle
//!
//! 1. `on_window_events()` for every winit window event, in arrival order
//! 2. `on_frame()` once per redraw

use rand::{Rng, SeedableRng, rngs::StdRng};
use winit::event::{MouseButton, WindowEvent};

use crate::effects::{
    blood_splatter::ParticleSystem,
    clock::{Clock, FrameTimer, InstantClock},
    scheduler::{EffectEvent, GlitchScheduler, JumpScareScheduler},
    surface::SplatterSurface,
};

pub trait OverlayFlow {
    /// Handle window events (mouse, resizing, etc.).
    fn on_window_events(&mut self, event: &WindowEvent);

    /// Advance and redraw. Called once per displayed frame.
    fn on_frame(&mut self);
}

/// Spawns blood bursts where the user clicks and animates them on a surface.
#[derive(Debug)]
pub struct SplatterFlow<S, R = StdRng, C = InstantClock> {
    particles: ParticleSystem<R, C>,
    timer: FrameTimer<C>,
    surface: S,
    cursor: (f32, f32),
}

impl<S: SplatterSurface> SplatterFlow<S> {
    pub fn new(surface: S) -> Self {
        Self::with_rng_and_clock(surface, StdRng::from_entropy(), InstantClock::new())
    }
}

impl<S: SplatterSurface, R: Rng, C: Clock + Clone> SplatterFlow<S, R, C> {
    pub fn with_rng_and_clock(surface: S, rng: R, clock: C) -> Self {
        Self {
            particles: ParticleSystem::with_rng_and_clock(rng, clock.clone()),
            timer: FrameTimer::new(clock),
            surface,
            cursor: (0.0, 0.0),
        }
    }

    pub fn particles(&self) -> &ParticleSystem<R, C> {
        &self.particles
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: SplatterSurface, R: Rng, C: Clock + Clone> OverlayFlow for SplatterFlow<S, R, C> {
    fn on_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let (MouseButton::Left, true) = (button, state.is_pressed()) {
                    let (x, y) = self.cursor;
                    self.particles.spawn_burst(x, y);
                }
            }
            WindowEvent::Resized(size) => self.surface.resize(size.width, size.height),
            _ => {}
        }
    }

    fn on_frame(&mut self) {
        let delta = self.timer.delta_ms();
        self.particles.tick(delta);
        self.particles.render(&mut self.surface);
    }
}

/// Drives the periodic glitch and jump-scare overlays from a clock.
#[derive(Debug)]
pub struct ScreenEffectsFlow<R = StdRng, C = InstantClock> {
    glitch: GlitchScheduler<R>,
    jump_scare: JumpScareScheduler<R>,
    clock: C,
}

impl ScreenEffectsFlow {
    pub fn new() -> Self {
        Self::with_rng_and_clock(StdRng::from_entropy(), StdRng::from_entropy(), InstantClock::new())
    }
}

impl Default for ScreenEffectsFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng, C: Clock> ScreenEffectsFlow<R, C> {
    pub fn with_rng_and_clock(glitch_rng: R, scare_rng: R, clock: C) -> Self {
        let now = clock.now_ms();
        Self {
            glitch: GlitchScheduler::new(glitch_rng, now),
            jump_scare: JumpScareScheduler::new(scare_rng, now),
            clock,
        }
    }

    pub fn is_glitching(&self) -> bool {
        self.glitch.is_glitching()
    }

    /// Glyph of the jump scare on screen, if any.
    pub fn jump_scare(&self) -> Option<&'static str> {
        self.jump_scare.glyph()
    }
}

impl<R: Rng, C: Clock> OverlayFlow for ScreenEffectsFlow<R, C> {
    fn on_window_events(&mut self, _: &WindowEvent) {}

    fn on_frame(&mut self) {
        let now = self.clock.now_ms();
        if let Some(EffectEvent::Started) = self.glitch.update(now) {
            log::debug!("Glitch at {now:.0} ms");
        }
        if let Some(EffectEvent::Started) = self.jump_scare.update(now) {
            log::debug!("Jump scare {:?} at {now:.0} ms", self.jump_scare.glyph());
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::{
        dpi::{PhysicalPosition, PhysicalSize},
        event::{DeviceId, ElementState},
    };

    use crate::effects::{
        blood_splatter::LIFETIME_MS,
        clock::ManualClock,
        scheduler::{GLITCH_DURATION_MS, JUMP_SCARE_INTERVAL_MS},
        surface::ImageSurface,
    };

    use super::*;

    fn device() -> DeviceId {
        DeviceId::dummy()
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn mouse(button: MouseButton, state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    fn splatter() -> (SplatterFlow<ImageSurface, StdRng, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let flow = SplatterFlow::with_rng_and_clock(
            ImageSurface::new(800, 600),
            StdRng::seed_from_u64(21),
            clock.clone(),
        );
        (flow, clock)
    }

    #[test]
    fn left_click_bursts_at_cursor() {
        let (mut flow, _) = splatter();
        flow.on_window_events(&cursor_moved(500.0, 300.0));
        flow.on_window_events(&mouse(MouseButton::Left, ElementState::Pressed));

        let particles = flow.particles().particles();
        assert!((20..40).contains(&particles.len()));
        assert!(particles.iter().all(|p| (p.x, p.y) == (500.0, 300.0)));
    }

    #[test]
    fn release_and_other_buttons_are_ignored() {
        let (mut flow, _) = splatter();
        flow.on_window_events(&mouse(MouseButton::Left, ElementState::Released));
        flow.on_window_events(&mouse(MouseButton::Right, ElementState::Pressed));
        assert!(flow.particles().is_empty());
    }

    #[test]
    fn frames_animate_then_clear_the_overlay() {
        let (mut flow, clock) = splatter();
        flow.on_window_events(&cursor_moved(400.0, 300.0));
        flow.on_window_events(&mouse(MouseButton::Left, ElementState::Pressed));

        clock.advance(16.0);
        flow.on_frame();
        assert!(flow.surface().painted_pixels() > 0);
        assert!(flow.particles().particles().iter().any(|p| p.x != 400.0));

        clock.advance(LIFETIME_MS);
        flow.on_frame();
        assert!(flow.particles().is_empty());
        assert_eq!(flow.surface().painted_pixels(), 0);
    }

    #[test]
    fn resize_follows_the_window() {
        let (mut flow, _) = splatter();
        flow.on_window_events(&WindowEvent::Resized(PhysicalSize::new(1024, 768)));
        assert_eq!(flow.surface().width(), 1024);
        assert_eq!(flow.surface().height(), 768);
    }

    #[test]
    fn screen_effects_follow_the_clock() {
        let clock = ManualClock::new(0.0);
        let mut flow = ScreenEffectsFlow::with_rng_and_clock(
            StdRng::seed_from_u64(1),
            StdRng::seed_from_u64(2),
            clock.clone(),
        );
        flow.on_frame();
        assert!(!flow.is_glitching());
        assert_eq!(flow.jump_scare(), None);

        // a glitch always fires within the first 15 s
        let mut glitched = false;
        while clock.now_ms() < 15_000.0 + GLITCH_DURATION_MS {
            clock.advance(10.0);
            flow.on_frame();
            glitched |= flow.is_glitching();
        }
        assert!(glitched);
        assert_eq!(flow.jump_scare(), None);

        let mut scared = false;
        while clock.now_ms() < JUMP_SCARE_INTERVAL_MS.end {
            clock.advance(10.0);
            flow.on_frame();
            scared |= flow.jump_scare().is_some();
        }
        assert!(scared);
    }
}

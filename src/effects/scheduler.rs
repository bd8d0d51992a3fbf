//! Randomly timed overlay effects.

use std::ops::Range;

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectEvent {
    Started,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Waiting { until_ms: f64 },
    Active { until_ms: f64 },
}

/// Alternates between waiting a random interval and being active for a fixed time.
#[derive(Debug)]
pub struct EffectScheduler<R> {
    interval_ms: Range<f64>,
    duration_ms: f64,
    phase: Phase,
    rng: R,
}

impl<R: Rng> EffectScheduler<R> {
    pub fn new(interval_ms: Range<f64>, duration_ms: f64, mut rng: R, now_ms: f64) -> Self {
        let until_ms = now_ms + rng.gen_range(interval_ms.clone());
        Self {
            interval_ms,
            duration_ms,
            phase: Phase::Waiting { until_ms },
            rng,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// When the current phase ends.
    pub fn next_transition_ms(&self) -> f64 {
        match self.phase {
            Phase::Waiting { until_ms } | Phase::Active { until_ms } => until_ms,
        }
    }

    /// Moves the state machine to `now_ms`, reporting at most one transition.
    pub fn update(&mut self, now_ms: f64) -> Option<EffectEvent> {
        match self.phase {
            Phase::Waiting { until_ms } if now_ms >= until_ms => {
                self.phase = Phase::Active {
                    until_ms: now_ms + self.duration_ms,
                };
                Some(EffectEvent::Started)
            }
            Phase::Active { until_ms } if now_ms >= until_ms => {
                self.phase = Phase::Waiting {
                    until_ms: now_ms + self.rng.gen_range(self.interval_ms.clone()),
                };
                Some(EffectEvent::Ended)
            }
            _ => None,
        }
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.rng.gen_range(0..items.len())])
    }
}

pub const GLITCH_INTERVAL_MS: Range<f64> = 8_000.0..15_000.0;
pub const GLITCH_DURATION_MS: f64 = 200.0;

/// Short screen glitches every 8 to 15 seconds.
#[derive(Debug)]
pub struct GlitchScheduler<R> {
    inner: EffectScheduler<R>,
}

impl<R: Rng> GlitchScheduler<R> {
    pub fn new(rng: R, now_ms: f64) -> Self {
        Self {
            inner: EffectScheduler::new(GLITCH_INTERVAL_MS, GLITCH_DURATION_MS, rng, now_ms),
        }
    }

    pub fn is_glitching(&self) -> bool {
        self.inner.is_active()
    }

    pub fn update(&mut self, now_ms: f64) -> Option<EffectEvent> {
        self.inner.update(now_ms)
    }
}

pub const JUMP_SCARE_INTERVAL_MS: Range<f64> = 30_000.0..60_000.0;
pub const JUMP_SCARE_DURATION_MS: f64 = 500.0;
pub const JUMP_SCARE_GLYPHS: [&str; 5] = ["💀", "👻", "🧟", "👹", "😱"];

/// Full-screen jump scares every 30 to 60 seconds, each showing a random glyph.
#[derive(Debug)]
pub struct JumpScareScheduler<R> {
    inner: EffectScheduler<R>,
    glyph: Option<&'static str>,
}

impl<R: Rng> JumpScareScheduler<R> {
    pub fn new(rng: R, now_ms: f64) -> Self {
        Self {
            inner: EffectScheduler::new(JUMP_SCARE_INTERVAL_MS, JUMP_SCARE_DURATION_MS, rng, now_ms),
            glyph: None,
        }
    }

    /// The glyph on screen, if a scare is showing.
    pub fn glyph(&self) -> Option<&'static str> {
        self.glyph
    }

    pub fn update(&mut self, now_ms: f64) -> Option<EffectEvent> {
        let event = self.inner.update(now_ms)?;
        self.glyph = match event {
            EffectEvent::Started => self.inner.choose(&JUMP_SCARE_GLYPHS).copied(),
            EffectEvent::Ended => None,
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn first_glitch_waits_within_interval() {
        for seed in 0..20 {
            let glitch = GlitchScheduler::new(StdRng::seed_from_u64(seed), 1_000.0);
            let at = glitch.inner.next_transition_ms() - 1_000.0;
            assert!(GLITCH_INTERVAL_MS.contains(&at), "{at}");
        }
    }

    #[test]
    fn glitch_cycle() {
        let mut glitch = GlitchScheduler::new(StdRng::seed_from_u64(42), 0.0);
        let start = glitch.inner.next_transition_ms();

        assert_eq!(glitch.update(start - 1.0), None);
        assert!(!glitch.is_glitching());
        assert_eq!(glitch.update(start), Some(EffectEvent::Started));
        assert!(glitch.is_glitching());
        assert_eq!(glitch.update(start + GLITCH_DURATION_MS - 1.0), None);
        assert_eq!(glitch.update(start + GLITCH_DURATION_MS), Some(EffectEvent::Ended));
        assert!(!glitch.is_glitching());

        let gap = glitch.inner.next_transition_ms() - (start + GLITCH_DURATION_MS);
        assert!(GLITCH_INTERVAL_MS.contains(&gap));
    }

    #[test]
    fn same_seed_same_schedule() {
        let a = JumpScareScheduler::new(StdRng::seed_from_u64(9), 0.0);
        let b = JumpScareScheduler::new(StdRng::seed_from_u64(9), 0.0);
        assert_eq!(a.inner.next_transition_ms(), b.inner.next_transition_ms());
    }

    #[test]
    fn jump_scare_shows_a_glyph_while_active() {
        let mut scare = JumpScareScheduler::new(StdRng::seed_from_u64(3), 0.0);
        assert_eq!(scare.glyph(), None);

        let start = scare.inner.next_transition_ms();
        assert!(JUMP_SCARE_INTERVAL_MS.contains(&start));
        assert_eq!(scare.update(start), Some(EffectEvent::Started));
        let glyph = scare.glyph().unwrap();
        assert!(JUMP_SCARE_GLYPHS.contains(&glyph));

        assert_eq!(scare.update(start + JUMP_SCARE_DURATION_MS), Some(EffectEvent::Ended));
        assert_eq!(scare.glyph(), None);
    }

    #[test]
    fn late_update_reports_one_transition_at_a_time() {
        let mut glitch = GlitchScheduler::new(StdRng::seed_from_u64(1), 0.0);
        let far = 1_000_000.0;
        assert_eq!(glitch.update(far), Some(EffectEvent::Started));
        assert_eq!(glitch.update(far), None);
        assert_eq!(glitch.update(far + GLITCH_DURATION_MS), Some(EffectEvent::Ended));
    }
}

//! Playback of a model's animation clips with crossfading.

use std::sync::Arc;

use crate::data_structures::{animation::AnimationClip, instance::Instance};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Action {
    clip: usize,
    time: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Crossfade {
    from: Action,
    elapsed: f32,
}

/// Mixer over the clips of one loaded model.
///
/// Starts on the first clip whose name mentions "idle", or the first clip at all.
#[derive(Debug)]
pub struct AnimationController {
    clips: Arc<[AnimationClip]>,
    current: Option<Action>,
    fade: Option<Crossfade>,
    crossfade_secs: f32,
}

impl AnimationController {
    pub fn new(clips: Arc<[AnimationClip]>, crossfade_secs: f32) -> Self {
        let initial = clips
            .iter()
            .position(|clip| clip.name.to_lowercase().contains("idle"))
            .or(if clips.is_empty() { None } else { Some(0) });
        if let Some(idx) = initial {
            log::debug!("Auto-playing animation {}", clips[idx].name);
        }
        Self {
            clips,
            current: initial.map(|clip| Action { clip, time: 0.0 }),
            fade: None,
            crossfade_secs,
        }
    }

    pub fn available_animations(&self) -> Vec<&str> {
        self.clips.iter().map(|clip| clip.name.as_str()).collect()
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.current.map(|action| self.clips[action.clip].name.as_str())
    }

    pub fn is_crossfading(&self) -> bool {
        self.fade.is_some()
    }

    /// Switches to `name`, fading out whatever was playing. Returns `false` for unknown clips.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(clip) = self.clips.iter().position(|clip| clip.name == name) else {
            log::warn!("Animation {name:?} not found");
            return false;
        };
        match self.current {
            Some(current) if current.clip == clip => {}
            Some(current) if self.crossfade_secs > 0.0 => {
                self.fade = Some(Crossfade {
                    from: current,
                    elapsed: 0.0,
                });
                self.current = Some(Action { clip, time: 0.0 });
            }
            _ => {
                self.fade = None;
                self.current = Some(Action { clip, time: 0.0 });
            }
        }
        true
    }

    fn advance(&self, action: &mut Action, dt: f32) {
        let duration = self.clips[action.clip].duration;
        action.time = if duration > 0.0 {
            (action.time + dt) % duration
        } else {
            0.0
        };
    }

    /// Advances every active action by `dt` seconds; clips loop.
    pub fn update(&mut self, dt: f32) {
        if let Some(mut current) = self.current {
            self.advance(&mut current, dt);
            self.current = Some(current);
        }
        if let Some(mut fade) = self.fade {
            self.advance(&mut fade.from, dt);
            fade.elapsed += dt;
            self.fade = (fade.elapsed < self.crossfade_secs).then_some(fade);
        }
    }

    /// `(clip name, weight)` of every action that currently contributes to the pose.
    pub fn weights(&self) -> Vec<(&str, f32)> {
        let Some(current) = self.current else {
            return Vec::new();
        };
        let name = |action: Action| self.clips[action.clip].name.as_str();
        match self.fade {
            Some(fade) => {
                let t = (fade.elapsed / self.crossfade_secs).clamp(0.0, 1.0);
                vec![(name(fade.from), 1.0 - t), (name(current), t)]
            }
            None => vec![(name(current), 1.0)],
        }
    }

    pub fn current_time(&self) -> Option<f32> {
        self.current.map(|action| action.time)
    }

    /// Blended local pose of `node` given its rest transform.
    pub fn sample(&self, node: &str, rest: Instance) -> Instance {
        let Some(current) = self.current else {
            return rest;
        };
        let pose = |action: Action| self.clips[action.clip].sample(node, action.time, rest);
        match self.fade {
            Some(fade) => {
                let t = (fade.elapsed / self.crossfade_secs).clamp(0.0, 1.0);
                pose(fade.from).blend(&pose(current), t)
            }
            None => pose(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::data_structures::animation::{Keyframes, Track};

    use super::*;

    fn slide(name: &str, to: f32) -> AnimationClip {
        AnimationClip::new(
            name,
            vec![Track {
                target: "root".into(),
                timestamps: vec![0.0, 2.0],
                keyframes: Keyframes::Translation(vec![[to, 0.0, 0.0].into(), [to, 0.0, 0.0].into()]),
            }],
        )
    }

    fn controller() -> AnimationController {
        let clips: Arc<[AnimationClip]> =
            vec![slide("Walk", 1.0), slide("Zombie_Idle", 0.0), slide("Attack", 10.0)].into();
        AnimationController::new(clips, 0.3)
    }

    #[test]
    fn idle_is_preferred_on_start() {
        let controller = controller();
        assert_eq!(controller.current_animation(), Some("Zombie_Idle"));
        assert_eq!(controller.available_animations(), ["Walk", "Zombie_Idle", "Attack"]);
    }

    #[test]
    fn first_clip_without_idle_and_nothing_without_clips() {
        let clips: Arc<[AnimationClip]> = vec![slide("Run", 1.0), slide("Walk", 2.0)].into();
        assert_eq!(AnimationController::new(clips, 0.3).current_animation(), Some("Run"));

        let none = AnimationController::new(Vec::new().into(), 0.3);
        assert_eq!(none.current_animation(), None);
        assert!(none.weights().is_empty());
        let rest = Instance::from(cgmath::Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(none.sample("root", rest), rest);
    }

    #[test]
    fn unknown_clip_changes_nothing() {
        let mut controller = controller();
        assert!(!controller.play("Dance"));
        assert_eq!(controller.current_animation(), Some("Zombie_Idle"));
    }

    #[test]
    fn switching_crossfades_over_the_configured_time() {
        let mut controller = controller();
        assert!(controller.play("Attack"));
        assert!(controller.is_crossfading());
        assert_eq!(controller.weights(), vec![("Zombie_Idle", 1.0), ("Attack", 0.0)]);

        controller.update(0.15);
        let weights = controller.weights();
        assert!((weights[1].1 - 0.5).abs() < 1e-5);
        let x = controller.sample("root", Instance::new()).position.x;
        assert!((x - 5.0).abs() < 1e-4);

        controller.update(0.2);
        assert!(!controller.is_crossfading());
        assert_eq!(controller.weights(), vec![("Attack", 1.0)]);
        assert_eq!(controller.sample("root", Instance::new()).position.x, 10.0);
    }

    #[test]
    fn replaying_current_clip_keeps_time() {
        let mut controller = controller();
        controller.update(0.5);
        controller.play("Zombie_Idle");
        assert!(!controller.is_crossfading());
        assert_eq!(controller.current_time(), Some(0.5));
    }

    #[test]
    fn clips_loop() {
        let mut controller = controller();
        controller.update(2.5);
        assert!((controller.current_time().unwrap() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zero_crossfade_switches_immediately() {
        let clips: Arc<[AnimationClip]> = vec![slide("Idle", 0.0), slide("Attack", 10.0)].into();
        let mut controller = AnimationController::new(clips, 0.0);
        controller.play("Attack");
        assert!(!controller.is_crossfading());
        assert_eq!(controller.weights(), vec![("Attack", 1.0)]);
    }
}

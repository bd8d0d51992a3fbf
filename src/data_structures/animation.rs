//! Skeletal/node animation data as read from glTF.
//!
//! A clip is owned by the model cache and handed out behind an `Arc`; nothing
//! in here mutates clip data after parsing.

use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::instance::Instance;

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    /// Morph target weights, flattened (`targets` values per keyframe).
    Weights(Vec<f32>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
            Keyframes::Weights(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One animated property of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub target: String,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Track {
    /// Index of the keyframe at or before `time` and the blend factor to the next one.
    fn locate(&self, time: f32) -> Option<(usize, usize, f32)> {
        let last = self.timestamps.len().checked_sub(1)?;
        if time <= self.timestamps[0] {
            return Some((0, 0, 0.0));
        }
        if time >= self.timestamps[last] {
            return Some((last, last, 0.0));
        }
        let next = self.timestamps.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.timestamps[next] - self.timestamps[prev];
        let t = if span > 0.0 {
            (time - self.timestamps[prev]) / span
        } else {
            0.0
        };
        Some((prev, next, t))
    }

    /// Applies the interpolated value at `time` onto `pose`. Weight tracks are ignored.
    pub fn apply(&self, time: f32, pose: &mut Instance) {
        let Some((prev, next, t)) = self.locate(time) else {
            return;
        };
        match &self.keyframes {
            Keyframes::Translation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    pose.position = a.lerp(*b, t);
                }
            }
            Keyframes::Rotation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    let b = if a.dot(*b) < 0.0 { -*b } else { *b };
                    pose.rotation = a.nlerp(b, t);
                }
            }
            Keyframes::Scale(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    pose.scale = a.lerp(*b, t);
                }
            }
            Keyframes::Weights(_) => {}
        }
    }
}

/// A named, timed keyframe sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .filter_map(|track| track.timestamps.last().copied())
            .fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    pub fn targets(&self, node: &str) -> bool {
        self.tracks.iter().any(|track| track.target == node)
    }

    /// Pose of `node` at `time`, starting from its rest transform `rest`.
    pub fn sample(&self, node: &str, time: f32, rest: Instance) -> Instance {
        let mut pose = rest;
        self.tracks
            .iter()
            .filter(|track| track.target == node)
            .for_each(|track| track.apply(time, &mut pose));
        pose
    }
}

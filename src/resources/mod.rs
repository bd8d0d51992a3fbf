//! Asset fetching and parsing.
//!
//! The loader only talks to an [`AssetParser`]: give it a URL and a progress
//! sink, get back a scene graph plus animation clips or an error. The shipped
//! implementation is [`gltf::GltfParser`]; tests substitute their own.

use std::future::Future;

use crate::data_structures::{animation::AnimationClip, scene_graph::SceneNode};

pub mod fetch;
pub mod gltf;

/// Byte-level transfer progress of a single asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
    /// Always within `[0, 100]`; `0` while the total size is unknown.
    pub percent: f32,
}

impl LoadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percent = if total > 0 {
            (loaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0) as f32
        } else {
            0.0
        };
        Self {
            loaded,
            total,
            percent,
        }
    }
}

/// A freshly parsed asset, not yet post-processed by the loader.
#[derive(Clone, Debug)]
pub struct ParsedAsset {
    pub scene: SceneNode,
    pub animations: Vec<AnimationClip>,
}

pub trait AssetParser {
    /// Fetches and parses `url`, reporting transfer progress zero or more times.
    fn parse(
        &self,
        url: &str,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> impl Future<Output = anyhow::Result<ParsedAsset>>;
}

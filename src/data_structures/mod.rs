//! Data structures shared by the loader and its consumers.
//!
//! - `instance` holds the local transformation of a node
//! - `scene_graph` is the renderable tree: groups, meshes, geometry and materials
//! - `animation` contains animation clips, tracks and keyframe sampling

pub mod animation;
pub mod instance;
pub mod scene_graph;

//! necromorph-studio
//!
//! The engine side of a horror model viewer that runs natively and on WASM.
//! It loads glTF models into a small scene graph, caches them per URL with
//! single-flight deduplication, and falls back to a red wireframe box when a
//! model cannot be loaded. On top of that sit 2D overlay effects: click-driven
//! blood splatter and randomly timed glitches and jump scares.
//!
//! High-level modules
//! - `context`: runtime configuration and logging setup
//! - `error`: load errors surfaced to callers
//! - `data_structures`: scene graph, transforms and animation clips
//! - `resources`: asset fetching and the glTF parser
//! - `loader`: cached model loading with fallbacks
//! - `animation_controller`: clip playback and crossfading
//! - `manifest`: the models shipped with the viewer
//! - `carousel`: next/previous model selection
//! - `effects`: particle simulation, raster surface and effect schedulers
//! - `flow`: window-event driven overlay flows
//!

pub mod animation_controller;
pub mod carousel;
pub mod context;
pub mod data_structures;
pub mod effects;
pub mod error;
pub mod flow;
pub mod loader;
pub mod manifest;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;

pub use context::{Config, PerformanceMode, init_logging};
pub use error::LoadError;
pub use loader::{LoadResult, ModelCache, ModelLoader, create_fallback_model, validate_url};
pub use resources::gltf::GltfParser;

/// Runs `fut` on a current-thread runtime inside a `LocalSet`, where loads are spawned.
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) fn run_local<F: std::future::Future>(fut: F) -> F::Output {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    tokio::task::LocalSet::new().block_on(&runtime, fut)
}

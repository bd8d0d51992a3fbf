//! Model loading with caching, single-flight de-duplication and fallbacks.
//!
//! [`ModelLoader::load_with_animations`] never fails. Whatever goes wrong (bad
//! URL, network error, broken file) the caller receives a [`LoadResult`] with a
//! renderable scene: either the real model or a red wireframe placeholder that
//! carries the reason it is there.
//!
//! Successful loads are kept in a [`ModelCache`] for the lifetime of the cache
//! object. Every caller gets a private deep copy of the cached scene, so one
//! consumer disposing its geometry cannot affect another. Animation clips are
//! shared read-only behind an `Arc`.
//!
//! Concurrent first-time loads of the same URL share one parse. Failures are
//! not cached; the next request retries.
//!
//! Loads are spawned onto the thread-local executor so that abandoned ones
//! still finish: `wasm_bindgen_futures` in the browser, and natively the
//! enclosing `tokio::task::LocalSet`. Native callers must await loads inside one.

use std::{collections::HashMap, future::Future, sync::Arc};

use futures::{
    FutureExt, StreamExt,
    future::{LocalBoxFuture, Shared},
    stream::FuturesUnordered,
};
use parking_lot::Mutex;

use crate::{
    data_structures::{
        animation::AnimationClip,
        scene_graph::{Geometry, Material, Mesh, SceneNode},
    },
    error::LoadError,
    resources::{AssetParser, LoadProgress, ParsedAsset},
};

const VALID_EXTENSIONS: [&str; 2] = [".glb", ".gltf"];
pub const DEFAULT_FALLBACK_ERROR: &str = "Failed to load model";

pub type ProgressFn = Box<dyn FnMut(LoadProgress)>;

/// `true` iff `url` is non-empty and ends in `.glb` or `.gltf`, ignoring case.
pub fn validate_url(url: Option<&str>) -> bool {
    let Some(url) = url.filter(|url| !url.is_empty()) else {
        log::error!("Model URL is required and must be a non-empty string");
        return false;
    };
    let lower = url.to_ascii_lowercase();
    if !VALID_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        log::error!("Invalid model format for {url:?}. Use .glb or .gltf files");
        return false;
    }
    true
}

/// A fresh placeholder: one red wireframe box under a group.
///
/// Nothing is shared between calls; each invocation allocates its own geometry
/// and material.
pub fn create_fallback_model() -> SceneNode {
    let geometry = Geometry::cuboid(1.0, 2.0, 1.0);
    let material = Material::new("fallback", [1.0, 0.0, 0.0, 1.0])
        .with_wireframe(true)
        // #8b0000
        .with_emissive([0x8b as f32 / 255.0, 0.0, 0.0], 0.5);
    let mut mesh = Mesh::new(geometry, material);
    mesh.cast_shadow = true;
    mesh.receive_shadow = true;
    SceneNode::group("fallback").with_child(SceneNode::mesh("fallback_mesh", vec![mesh]))
}

/// Placeholder scene plus the reason it replaced the requested model.
#[derive(Clone, Debug)]
pub struct Fallback {
    pub scene: SceneNode,
    pub error: String,
    pub original_url: Option<String>,
}

impl Fallback {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            scene: create_fallback_model(),
            error: error.into(),
            original_url: None,
        }
    }

    pub fn for_url(url: impl Into<String>, error: &LoadError) -> Self {
        Self {
            original_url: Some(url.into()),
            ..Self::new(error.to_string())
        }
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_ERROR)
    }
}

#[derive(Clone, Debug)]
pub struct LoadedModel {
    pub scene: SceneNode,
    pub animations: Arc<[AnimationClip]>,
}

/// Outcome of a load: always something that can be rendered.
#[derive(Clone, Debug)]
pub enum LoadResult {
    Loaded(LoadedModel),
    Fallback(Fallback),
}

impl LoadResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadResult::Fallback(_))
    }

    pub fn scene(&self) -> &SceneNode {
        match self {
            LoadResult::Loaded(model) => &model.scene,
            LoadResult::Fallback(fallback) => &fallback.scene,
        }
    }

    pub fn scene_mut(&mut self) -> &mut SceneNode {
        match self {
            LoadResult::Loaded(model) => &mut model.scene,
            LoadResult::Fallback(fallback) => &mut fallback.scene,
        }
    }

    /// Fallbacks have no animations.
    pub fn animations(&self) -> &[AnimationClip] {
        match self {
            LoadResult::Loaded(model) => &model.animations,
            LoadResult::Fallback(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadResult::Loaded(_) => None,
            LoadResult::Fallback(fallback) => Some(&fallback.error),
        }
    }

    pub fn into_scene(self) -> SceneNode {
        match self {
            LoadResult::Loaded(model) => model.scene,
            LoadResult::Fallback(fallback) => fallback.scene,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    scene: SceneNode,
    animations: Arc<[AnimationClip]>,
}

impl CacheEntry {
    fn checkout(&self) -> LoadedModel {
        LoadedModel {
            scene: self.scene.clone(),
            animations: self.animations.clone(),
        }
    }
}

type InFlight = Shared<LocalBoxFuture<'static, Result<Arc<CacheEntry>, LoadError>>>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cached_models: usize,
    pub urls: Vec<String>,
}

/// Successfully loaded models keyed by URL (case-sensitive, as given).
///
/// Entries never expire; [`ModelCache::clear`] is the only way to drop them.
#[derive(Default)]
pub struct ModelCache {
    entries: Mutex<HashMap<String, Arc<CacheEntry>>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, url: &str) -> Option<Arc<CacheEntry>> {
        self.entries.lock().get(url).cloned()
    }

    fn insert(&self, url: String, entry: Arc<CacheEntry>) {
        self.entries.lock().insert(url, entry);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every cached model. Loads already in flight still complete and insert.
    pub fn clear(&self) {
        self.entries.lock().clear();
        log::info!("Model cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut urls: Vec<String> = entries.keys().cloned().collect();
        urls.sort();
        CacheStats {
            cached_models: entries.len(),
            urls,
        }
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("cached", &self.len())
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

/// Flags meshes for shadows and warns about empty scenes.
fn post_process(url: &str, asset: ParsedAsset) -> CacheEntry {
    let ParsedAsset {
        mut scene,
        animations,
    } = asset;
    if scene.mesh_count() == 0 {
        log::warn!("Model {url} has no meshes");
    }
    scene.set_shadows(true, true);
    log::info!("Model loaded successfully: {url}");
    log::info!("Animations: {}", animations.len());
    CacheEntry {
        scene,
        animations: animations.into(),
    }
}

pub struct ModelLoader<P> {
    parser: Arc<P>,
    cache: Arc<ModelCache>,
}

impl<P> Clone for ModelLoader<P> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<P: AssetParser + 'static> ModelLoader<P> {
    /// A loader with its own private cache.
    pub fn new(parser: P) -> Self {
        Self::with_cache(parser, Arc::new(ModelCache::new()))
    }

    /// A loader sharing `cache` with whoever else holds it.
    pub fn with_cache(parser: P, cache: Arc<ModelCache>) -> Self {
        Self {
            parser: Arc::new(parser),
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Loads `url` with its animation clips. Never fails; see [`LoadResult`].
    ///
    /// `on_progress` only fires for the caller that actually starts the transfer.
    pub async fn load_with_animations(
        &self,
        url: &str,
        on_progress: Option<ProgressFn>,
    ) -> LoadResult {
        if !validate_url(Some(url)) {
            log::error!("Invalid model URL: {url}");
            return LoadResult::Fallback(Fallback::for_url(
                url,
                &LoadError::InvalidUrl(url.to_string()),
            ));
        }

        if let Some(entry) = self.cache.get(url) {
            log::debug!("Loading model from cache: {url}");
            return LoadResult::Loaded(entry.checkout());
        }

        match self.in_flight(url, on_progress).await {
            Ok(entry) => LoadResult::Loaded(entry.checkout()),
            Err(error) => {
                log::error!("Failed to load model {url}: {error}");
                LoadResult::Fallback(Fallback::for_url(url, &error))
            }
        }
    }

    /// Scene-only variant of [`ModelLoader::load_with_animations`].
    pub async fn load(&self, url: &str, on_progress: Option<ProgressFn>) -> SceneNode {
        self.load_with_animations(url, on_progress).await.into_scene()
    }

    /// Loads every URL concurrently. `on_progress(completed, total)` fires once per
    /// finished attempt, success or not, with a strictly increasing `completed`.
    pub async fn preload<S: AsRef<str>>(
        &self,
        urls: &[S],
        mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
    ) {
        let total = urls.len();
        let mut pending: FuturesUnordered<_> = urls
            .iter()
            .map(|url| self.load_with_animations(url.as_ref(), None))
            .collect();
        let mut completed = 0;
        while let Some(result) = pending.next().await {
            completed += 1;
            if let Some(err) = result.error() {
                log::error!("Failed to preload model: {err}");
            }
            if let Some(on_progress) = on_progress.as_mut() {
                on_progress(completed, total);
            }
        }
    }

    /// Joins the running load of `url` or starts one.
    ///
    /// A started load is also handed to the local executor, so it runs to
    /// completion and fills the cache even if every caller stops waiting.
    fn in_flight(&self, url: &str, on_progress: Option<ProgressFn>) -> InFlight {
        let mut in_flight = self.cache.in_flight.lock();
        if let Some(running) = in_flight.get(url) {
            log::debug!("Joining in-flight load of {url}");
            return running.clone();
        }

        log::info!("Loading model: {url}");
        let parser = self.parser.clone();
        // weak, the cache owns this future through `in_flight`
        let cache = Arc::downgrade(&self.cache);
        let owned_url = url.to_string();
        let fut = async move {
            let mut on_progress = on_progress;
            let mut report = |progress: LoadProgress| {
                if let Some(callback) = on_progress.as_mut() {
                    callback(progress);
                }
            };
            let parsed = parser.parse(&owned_url, &mut report).await;
            let result = match parsed {
                Ok(asset) => Ok(Arc::new(post_process(&owned_url, asset))),
                Err(e) => Err(LoadError::from_anyhow(&e)),
            };
            match cache.upgrade() {
                Some(cache) => {
                    if let Ok(entry) = &result {
                        cache.insert(owned_url.clone(), entry.clone());
                    }
                    cache.in_flight.lock().remove(&owned_url);
                }
                None => log::debug!("Cache dropped while loading {owned_url}"),
            }
            result
        }
        .boxed_local()
        .shared();
        in_flight.insert(url.to_string(), fut.clone());
        drop(in_flight);

        spawn_detached(fut.clone().map(|_| ()));
        fut
    }
}

/// Drives `fut` on the current thread's executor without waiting for it.
fn spawn_detached(fut: impl Future<Output = ()> + 'static) {
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(fut);
    #[cfg(not(target_arch = "wasm32"))]
    tokio::task::spawn_local(fut);
}

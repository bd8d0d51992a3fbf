//! Error taxonomy of the model loader.
//!
//! None of these ever leave [`crate::loader::ModelLoader`] as an `Err`: they are
//! folded into a [`crate::loader::Fallback`] so the caller always gets a scene.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Missing URL or an extension other than `.glb` / `.gltf`.
    #[error("Invalid model URL {0:?}. Use .glb or .gltf files")]
    InvalidUrl(String),
    /// Network, IO or glTF parsing failure, carrying the underlying message as is.
    #[error("{0}")]
    FetchOrParse(String),
}

impl LoadError {
    pub(crate) fn from_anyhow(err: &anyhow::Error) -> Self {
        Self::FetchOrParse(format!("{err:#}"))
    }
}

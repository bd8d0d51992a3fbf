//! The models shipped with the viewer.
//!
//! Files live under `models/` in the asset root. Animations are discovered on
//! load, and the poly counts are unknown until somebody measures them.

use crate::data_structures::instance::Instance;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attribution {
    pub author: &'static str,
    pub license: &'static str,
    pub source: &'static str,
}

/// How a model is placed in the scene when shown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: [f32; 3],
    pub scale: f32,
}

impl Placement {
    pub const DEFAULT: Placement = Placement {
        position: [0.0; 3],
        scale: 1.0,
    };

    pub fn to_instance(&self) -> Instance {
        Instance::from(cgmath::Vector3::from(self.position)).with_uniform_scale(self.scale)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelEntry {
    pub id: &'static str,
    pub name: &'static str,
    /// `None` for the development placeholder, which always renders the fallback box.
    pub url: Option<&'static str>,
    pub description: &'static str,
    pub poly_count: u32,
    pub attribution: Attribution,
    pub tags: &'static [&'static str],
    pub placement: Placement,
}

const SKETCHFAB: Attribution = Attribution {
    author: "Downloaded from Sketchfab",
    license: "Check model source",
    source: "Sketchfab",
};

pub static MODEL_MANIFEST: [ModelEntry; 4] = [
    ModelEntry {
        id: "scene",
        name: "Horror Scene",
        url: Some("/models/scene/scene.gltf"),
        description: "Complete horror scene with textures",
        poly_count: 0,
        attribution: Attribution {
            author: "Custom Scene",
            license: "Custom",
            source: "Local",
        },
        tags: &["scene", "environment", "horror"],
        placement: Placement {
            position: [0.0, -2.0, 0.0],
            scale: 0.2,
        },
    },
    ModelEntry {
        id: "scary-monster",
        name: "Scary Monster",
        url: Some("/models/scary_monster.glb"),
        description: "Terrifying monster creature",
        poly_count: 0,
        attribution: SKETCHFAB,
        tags: &["monster", "scary", "horror"],
        placement: Placement::DEFAULT,
    },
    ModelEntry {
        id: "scary-guy",
        name: "Scary Guy",
        url: Some("/models/scary_guy.glb"),
        description: "Frightening humanoid figure",
        poly_count: 0,
        attribution: SKETCHFAB,
        tags: &["humanoid", "scary", "horror"],
        placement: Placement::DEFAULT,
    },
    ModelEntry {
        id: "scary",
        name: "Scary",
        url: Some("/models/scary.glb"),
        description: "Horror creature",
        poly_count: 0,
        attribution: SKETCHFAB,
        tags: &["creature", "scary", "horror"],
        placement: Placement {
            position: [0.0, 0.0, 0.0],
            scale: 0.5,
        },
    },
];

pub static PLACEHOLDER_MODEL: ModelEntry = ModelEntry {
    id: "placeholder",
    name: "Placeholder Zombie",
    url: None,
    description: "Placeholder for development",
    poly_count: 12,
    attribution: Attribution {
        author: "System",
        license: "N/A",
        source: "Generated",
    },
    tags: &["placeholder"],
    placement: Placement::DEFAULT,
};

pub fn model_by_id(id: &str) -> Option<&'static ModelEntry> {
    MODEL_MANIFEST.iter().find(|model| model.id == id)
}

pub fn all_model_ids() -> Vec<&'static str> {
    MODEL_MANIFEST.iter().map(|model| model.id).collect()
}

pub fn models_by_tag(tag: &str) -> Vec<&'static ModelEntry> {
    let tag = tag.to_lowercase();
    MODEL_MANIFEST
        .iter()
        .filter(|model| model.tags.contains(&tag.as_str()))
        .collect()
}

pub fn total_poly_count() -> u32 {
    MODEL_MANIFEST.iter().map(|model| model.poly_count).sum()
}

#[cfg(test)]
mod tests {
    use crate::loader::validate_url;

    use super::*;

    #[test]
    fn every_manifest_url_is_loadable() {
        assert!(MODEL_MANIFEST.iter().all(|model| validate_url(model.url)));
        assert!(!validate_url(PLACEHOLDER_MODEL.url));
    }

    #[test]
    fn lookups() {
        assert_eq!(model_by_id("scary-guy").map(|m| m.name), Some("Scary Guy"));
        assert!(model_by_id("placeholder").is_none());
        assert_eq!(all_model_ids(), ["scene", "scary-monster", "scary-guy", "scary"]);
        assert_eq!(models_by_tag("SCARY").len(), 3);
        assert_eq!(models_by_tag("horror").len(), 4);
        assert!(models_by_tag("cute").is_empty());
        assert_eq!(total_poly_count(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = all_model_ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MODEL_MANIFEST.len());
    }

    #[test]
    fn placement_becomes_transform() {
        let scene = model_by_id("scene").unwrap().placement.to_instance();
        assert_eq!(scene.position, cgmath::Vector3::new(0.0, -2.0, 0.0));
        assert_eq!(scene.scale, cgmath::Vector3::new(0.2, 0.2, 0.2));
    }
}

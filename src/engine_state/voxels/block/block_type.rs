//! # Material Kind Module
//!
//! This module defines the materials a voxel can be made of. Materials carry a
//! canonical lowercase name (used by configuration files and logs) and a display
//! color used by the cube renderer.

use std::fmt;

use serde::{de, Deserialize, Deserializer};

/// Enumerates every material a voxel can be made of.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Grass-topped soil, the default material
    #[default]
    Grass,
    /// Plain soil found under the grass layer
    Dirt,
    /// Bedrock-like stone that fills the lower layers
    Stone,
    /// Sand found on low-lying columns
    Sand,
    /// Wooden planks
    Wood,
}

/// Lookup from canonical material names to materials.
static MATERIAL_NAMES: phf::Map<&'static str, MaterialKind> = phf::phf_map! {
    "grass" => MaterialKind::Grass,
    "dirt" => MaterialKind::Dirt,
    "stone" => MaterialKind::Stone,
    "sand" => MaterialKind::Sand,
    "wood" => MaterialKind::Wood,
};

impl MaterialKind {
    /// Looks a material up by its canonical lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        MATERIAL_NAMES.get(name).copied()
    }

    /// Canonical lowercase name of the material.
    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Grass => "grass",
            MaterialKind::Dirt => "dirt",
            MaterialKind::Stone => "stone",
            MaterialKind::Sand => "sand",
            MaterialKind::Wood => "wood",
        }
    }

    /// Linear RGB color used when drawing the material.
    pub fn color(&self) -> [f32; 3] {
        match self {
            MaterialKind::Grass => [0.30, 0.69, 0.31],
            MaterialKind::Dirt => [0.47, 0.33, 0.28],
            MaterialKind::Stone => [0.50, 0.50, 0.52],
            MaterialKind::Sand => [0.86, 0.80, 0.55],
            MaterialKind::Wood => [0.63, 0.45, 0.25],
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MaterialKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        MaterialKind::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown material `{name}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_lookup_table() {
        assert_eq!(MATERIAL_NAMES.len(), 5);
        for (name, material) in MATERIAL_NAMES.entries() {
            assert_eq!(material.name(), *name);
            assert_eq!(MaterialKind::from_name(name), Some(*material));
        }
        assert_eq!(MaterialKind::from_name("lava"), None);
    }

    #[test]
    fn grass_is_the_default_material() {
        assert_eq!(MaterialKind::default(), MaterialKind::Grass);
    }

    #[test]
    fn deserializes_from_names() {
        let material: MaterialKind = serde_json::from_str("\"sand\"").unwrap();
        assert_eq!(material, MaterialKind::Sand);
        assert!(serde_json::from_str::<MaterialKind>("\"lava\"").is_err());
    }
}

//! Material sets.
//!
//! A material set assigns materials to every render target for one pass of
//! the job. The assignment is either one material shared by all targets or
//! an explicit per-target list.
//!
//! # Example
//!
//! ```yaml
//! material_sets:
//!   - name: steel
//!     materials: { shared: steel-brushed }
//!   - name: team-colours
//!     role: mask
//!     materials: { individual: [red-cloth, blue-cloth] }
//! ```

use serde::Deserialize;

use super::Colour;

/// How materials are assigned to render targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialAssignment {
    /// One material applied to every target.
    Shared(String),
    /// One material per target, by target index.
    Individual(Vec<String>),
}

impl MaterialAssignment {
    /// Material for the target at `index`.
    ///
    /// `Individual` lists shorter than the target list yield `None` for the
    /// trailing targets, which leave their current material untouched.
    pub fn material_at(&self, index: usize) -> Option<&str> {
        match self {
            MaterialAssignment::Shared(material) => Some(material),
            MaterialAssignment::Individual(materials) => {
                materials.get(index).map(String::as_str)
            }
        }
    }
}

/// A named material assignment for one render pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaterialSet {
    pub name: String,
    /// Role reported in sidecar `materialData` (e.g. "albedo", "normal").
    #[serde(default = "default_role")]
    pub role: String,
    /// Written as a one-key map: `{ shared: x }` or `{ individual: [..] }`.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub materials: MaterialAssignment,
    /// Flat colour used by the swatch renderer.
    #[serde(default)]
    pub swatch: Option<Colour>,
}

fn default_role() -> String {
    "albedo".to_string()
}

impl MaterialSet {
    /// A set applying one material to every target.
    pub fn shared(name: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: default_role(),
            materials: MaterialAssignment::Shared(material.into()),
            swatch: None,
        }
    }

    /// Material for the target at `index`, if any.
    pub fn material_at(&self, index: usize) -> Option<&str> {
        self.materials.material_at(index)
    }

    /// Colour for swatch frames; derived from the name when unset.
    pub fn swatch_colour(&self) -> Colour {
        self.swatch.unwrap_or_else(|| Colour::from_name(&self.name))
    }
}

//! Persona catalog: named personas grouped into named user groups.
//!
//! The catalog is static input data: it decides which groups and personas
//! exist and what baseline satisfaction/NPS each persona starts from, but it
//! carries no simulation behavior. It is loaded once per run, validated, and
//! never mutated afterwards.
//!
//! The default catalog is embedded from `data/personas.json`. Custom catalogs
//! use the same JSON shape:
//!
//! ```json
//! [
//!   {
//!     "name": "Data Expert",
//!     "role": "Builds and runs the data platform.",
//!     "personas": [
//!       { "name": "Data Engineer", "age": 36, "experience": "12 years",
//!         "satisfaction": 8, "nps": 9 }
//!     ]
//!   }
//! ]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const BUILTIN_CATALOG_JSON: &str = include_str!("../../../data/personas.json");

/// Baseline satisfaction used when a persona record omits one.
pub const DEFAULT_SATISFACTION: u8 = 5;
/// Baseline NPS used when a persona record omits one.
pub const DEFAULT_NPS: u8 = 0;

fn default_satisfaction() -> u8 {
    DEFAULT_SATISFACTION
}

fn default_nps() -> u8 {
    DEFAULT_NPS
}

/// A named user archetype with baseline satisfaction and NPS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub age: u32,
    pub experience: String,
    /// Baseline satisfaction (0–10).
    #[serde(default = "default_satisfaction")]
    pub satisfaction: u8,
    /// Baseline NPS (0–10).
    #[serde(default = "default_nps")]
    pub nps: u8,
}

/// A set of personas sharing a role description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub role: String,
    pub personas: Vec<Persona>,
}

/// Validated, ordered collection of groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PersonaCatalog {
    groups: Vec<Group>,
}

impl PersonaCatalog {
    /// The embedded default catalog (4 groups, 19 personas).
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    /// Parse and validate a catalog from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let groups: Vec<Group> = serde_json::from_str(json)?;
        Self::from_groups(groups)
    }

    /// Build a catalog from already-typed groups, enforcing its invariants.
    pub fn from_groups(groups: Vec<Group>) -> Result<Self, CatalogError> {
        if groups.is_empty() {
            return Err(CatalogError::NoGroups);
        }

        let mut group_names = HashSet::new();
        let mut persona_names = HashSet::new();
        for group in &groups {
            if !group_names.insert(group.name.as_str()) {
                return Err(CatalogError::DuplicateGroup(group.name.clone()));
            }
            if group.personas.is_empty() {
                return Err(CatalogError::EmptyGroup(group.name.clone()));
            }
            for persona in &group.personas {
                if !persona_names.insert(persona.name.as_str()) {
                    return Err(CatalogError::DuplicatePersona(persona.name.clone()));
                }
                check_baseline(persona, "satisfaction", persona.satisfaction)?;
                check_baseline(persona, "nps", persona.nps)?;
            }
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn persona(&self, group: usize, persona: usize) -> Option<&Persona> {
        self.groups.get(group)?.personas.get(persona)
    }

    /// Locate a persona by name, returning `(group_index, persona_index)`.
    pub fn find_persona(&self, name: &str) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(gi, group)| {
            group
                .personas
                .iter()
                .position(|p| p.name == name)
                .map(|pi| (gi, pi))
        })
    }

    /// Name of the group a persona belongs to.
    pub fn group_of(&self, persona_name: &str) -> Option<&str> {
        self.find_persona(persona_name)
            .map(|(gi, _)| self.groups[gi].name.as_str())
    }

    /// All personas with their group, in catalog order.
    pub fn personas(&self) -> impl Iterator<Item = (&Group, &Persona)> {
        self.groups
            .iter()
            .flat_map(|g| g.personas.iter().map(move |p| (g, p)))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn persona_count(&self) -> usize {
        self.groups.iter().map(|g| g.personas.len()).sum()
    }
}

fn check_baseline(persona: &Persona, field: &'static str, value: u8) -> Result<(), CatalogError> {
    if value > 10 {
        return Err(CatalogError::BaselineOutOfRange {
            persona: persona.name.clone(),
            field,
            value,
        });
    }
    Ok(())
}

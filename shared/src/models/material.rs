//! Stocked materials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A stocked item type, identified by its lower-cased name and unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    /// Authoritative on-hand quantity; never negative
    pub quantity: i64,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Key used to match materials regardless of name casing
    pub fn key(&self) -> MaterialKey {
        MaterialKey::new(&self.name, self.unit)
    }
}

/// Case-insensitive identity of a material
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub name: String,
    pub unit: Unit,
}

impl MaterialKey {
    pub fn new(name: &str, unit: Unit) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            unit,
        }
    }
}

//! Placements and configurations (a pegboard plus the accessories on it).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point or rotation in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vector3 {
    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// An accessory hung on the current pegboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAccessory {
    /// Catalog id of the accessory
    pub accessory_id: String,
    /// Position on the board
    pub position: Vector3,
    /// Euler rotation in radians
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vector3>,
}

impl PlacedAccessory {
    /// Creates an unrotated placement.
    pub fn new(accessory_id: impl Into<String>, position: Vector3) -> Self {
        Self {
            accessory_id: accessory_id.into(),
            position,
            rotation: None,
        }
    }

    /// Sets the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Vector3) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Snapshot of a scene: selected pegboard and placements in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Selected pegboard, `None` when nothing is selected
    #[serde(default)]
    pub pegboard_id: Option<String>,
    /// Placements in insertion order
    #[serde(default)]
    pub accessories: Vec<PlacedAccessory>,
    /// Name given when saving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Configuration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when there is nothing worth saving.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pegboard_id.is_none() && self.accessories.is_empty()
    }
}

/// A configuration stored under a name in a configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedConfiguration {
    /// Stable identifier, kept across overwrites
    pub id: Uuid,
    /// Store key
    pub name: String,
    /// Saved scene
    pub configuration: Configuration,
    /// First save
    pub created: DateTime<Utc>,
    /// Last overwrite
    pub modified: DateTime<Utc>,
}

impl SavedConfiguration {
    /// Wraps a configuration for a first save.
    pub fn new(name: impl Into<String>, configuration: Configuration) -> Self {
        let now = Utc::now();
        let name = name.into();
        let mut configuration = configuration;
        configuration.name = Some(name.clone());
        Self {
            id: Uuid::new_v4(),
            name,
            configuration,
            created: now,
            modified: now,
        }
    }

    /// Replaces the saved scene, keeping identity and creation time.
    pub fn overwrite(&mut self, configuration: Configuration) {
        let mut configuration = configuration;
        configuration.name = Some(self.name.clone());
        self.configuration = configuration;
        self.modified = Utc::now();
    }
}

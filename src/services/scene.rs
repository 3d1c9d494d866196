//! Scene state: the selected pegboard and the accessories placed on it.
//!
//! All transitions are synchronous and all-or-nothing. A rejected transition
//! returns a [`ConfiguratorError`] and leaves the scene exactly as it was.

use tracing::debug;

use crate::config::validate_max_accessories;
use crate::constants::DEFAULT_MAX_ACCESSORIES;
use crate::error::ConfiguratorError;
use crate::models::{Configuration, PlacedAccessory, ProductType, Vector3};
use crate::services::catalog::Catalog;

/// Coarse state of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    /// Nothing selected yet, or just reset
    NoPegboardSelected,
    /// A pegboard is selected (zero or more accessories placed)
    PegboardSelected,
}

/// Single source of truth for the configurator panels.
///
/// # Invariants
///
/// - Every placement references an accessory that exists in the catalog and
///   is compatible with the selected pegboard
/// - Placements only exist while a pegboard is selected
/// - The number of placements never exceeds `max_accessories`
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pegboard_id: Option<String>,
    placements: Vec<PlacedAccessory>,
    max_accessories: u32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            pegboard_id: None,
            placements: Vec::new(),
            max_accessories: DEFAULT_MAX_ACCESSORIES,
        }
    }
}

impl SceneState {
    /// Creates an empty scene with the given accessory cap (1-100).
    pub fn new(max_accessories: u32) -> Result<Self, ConfiguratorError> {
        validate_max_accessories(max_accessories)
            .map_err(|e| ConfiguratorError::validation(e.to_string()))?;

        Ok(Self {
            max_accessories,
            ..Self::default()
        })
    }

    /// Rebuilds a scene from a saved configuration.
    ///
    /// Placements are replayed through [`Self::place_accessory`], so a
    /// configuration that no longer fits the catalog is rejected rather than
    /// loaded half-way.
    pub fn from_configuration(
        configuration: &Configuration,
        catalog: &Catalog,
        max_accessories: u32,
    ) -> Result<Self, ConfiguratorError> {
        let mut scene = Self::new(max_accessories)?;

        match &configuration.pegboard_id {
            Some(pegboard_id) => {
                scene.select_pegboard(pegboard_id, catalog)?;
            }
            None if !configuration.accessories.is_empty() => {
                return Err(ConfiguratorError::NoPegboardSelected);
            }
            None => {}
        }

        for placement in &configuration.accessories {
            scene.place(placement.clone(), catalog)?;
        }

        Ok(scene)
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ScenePhase {
        if self.pegboard_id.is_some() {
            ScenePhase::PegboardSelected
        } else {
            ScenePhase::NoPegboardSelected
        }
    }

    /// Selected pegboard id.
    #[must_use]
    pub fn pegboard_id(&self) -> Option<&str> {
        self.pegboard_id.as_deref()
    }

    /// Placements in display order.
    #[must_use]
    pub fn placements(&self) -> &[PlacedAccessory] {
        &self.placements
    }

    /// Accessory cap.
    #[must_use]
    pub const fn max_accessories(&self) -> u32 {
        self.max_accessories
    }

    /// Remaining placement slots.
    #[must_use]
    pub fn remaining_slots(&self) -> usize {
        (self.max_accessories as usize).saturating_sub(self.placements.len())
    }

    /// Snapshot suitable for pricing and persistence.
    #[must_use]
    pub fn to_configuration(&self) -> Configuration {
        Configuration {
            pegboard_id: self.pegboard_id.clone(),
            accessories: self.placements.clone(),
            name: None,
        }
    }

    /// Selects (or replaces) the pegboard.
    ///
    /// Valid in any phase. Placements whose accessory does not fit the new
    /// pegboard are dropped and returned to the caller.
    pub fn select_pegboard(
        &mut self,
        pegboard_id: &str,
        catalog: &Catalog,
    ) -> Result<Vec<PlacedAccessory>, ConfiguratorError> {
        catalog.get_typed(pegboard_id, ProductType::Pegboard)?;

        let (kept, removed): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.placements)
                .into_iter()
                .partition(|placement| {
                    catalog
                        .find(&placement.accessory_id)
                        .is_some_and(|accessory| accessory.is_compatible_with(pegboard_id))
                });

        if !removed.is_empty() {
            debug!(
                pegboard = pegboard_id,
                removed = removed.len(),
                "Dropped accessories incompatible with new pegboard"
            );
        }

        self.placements = kept;
        self.pegboard_id = Some(pegboard_id.to_string());
        Ok(removed)
    }

    /// Appends an accessory placement.
    pub fn place_accessory(
        &mut self,
        accessory_id: &str,
        position: Vector3,
        catalog: &Catalog,
    ) -> Result<usize, ConfiguratorError> {
        self.place(PlacedAccessory::new(accessory_id, position), catalog)
    }

    /// Appends a fully specified placement (with rotation). Returns its index.
    pub fn place(
        &mut self,
        placement: PlacedAccessory,
        catalog: &Catalog,
    ) -> Result<usize, ConfiguratorError> {
        let index = self.placements.len();
        self.place_at(index, placement, catalog)
    }

    /// Inserts a placement at `index` (shifting later ones back).
    ///
    /// `index == len` appends. Used to undo a removal in place.
    pub fn place_at(
        &mut self,
        index: usize,
        placement: PlacedAccessory,
        catalog: &Catalog,
    ) -> Result<usize, ConfiguratorError> {
        self.check_placement(&placement, catalog)?;

        if index > self.placements.len() {
            return Err(ConfiguratorError::OutOfRange {
                index,
                len: self.placements.len(),
            });
        }

        self.placements.insert(index, placement);
        Ok(index)
    }

    fn check_placement(
        &self,
        placement: &PlacedAccessory,
        catalog: &Catalog,
    ) -> Result<(), ConfiguratorError> {
        let pegboard_id = self
            .pegboard_id
            .as_deref()
            .ok_or(ConfiguratorError::NoPegboardSelected)?;

        let accessory = catalog.get_typed(&placement.accessory_id, ProductType::Accessory)?;

        if !accessory.is_compatible_with(pegboard_id) {
            debug!(
                accessory = accessory.id.as_str(),
                pegboard = pegboard_id,
                "Rejected incompatible accessory"
            );
            return Err(ConfiguratorError::IncompatibleProduct {
                accessory_id: accessory.id.clone(),
                pegboard_id: pegboard_id.to_string(),
            });
        }

        if self.placements.len() >= self.max_accessories as usize {
            return Err(ConfiguratorError::LimitExceeded {
                max: self.max_accessories,
            });
        }

        if !placement.position.is_finite()
            || placement.rotation.is_some_and(|r| !r.is_finite())
        {
            return Err(ConfiguratorError::validation(
                "placement coordinates must be finite numbers",
            ));
        }

        Ok(())
    }

    /// Removes the placement at `index` and returns it.
    pub fn remove_accessory(&mut self, index: usize) -> Result<PlacedAccessory, ConfiguratorError> {
        if index >= self.placements.len() {
            return Err(ConfiguratorError::OutOfRange {
                index,
                len: self.placements.len(),
            });
        }
        Ok(self.placements.remove(index))
    }

    /// Clears the pegboard and every placement.
    pub fn reset(&mut self) {
        self.pegboard_id = None;
        self.placements.clear();
    }
}

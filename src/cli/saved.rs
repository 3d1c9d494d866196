//! Saved configuration commands.

use crate::cli::common::{
    load_settings, open_catalog, open_persistence, print_json, CliError, CliResult,
};
use crate::constants::APP_BINARY_NAME;
use crate::models::{PlacedAccessory, SavedConfiguration, Vector3};
use crate::services::scene::SceneState;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Manage saved configurations
#[derive(Debug, Clone, Args)]
pub struct SavedArgs {
    /// Saved configuration subcommand
    #[command(subcommand)]
    pub command: SavedCommand,
}

/// Saved configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum SavedCommand {
    /// List saved configurations, newest first
    List(ListSavedArgs),
    /// Show one saved configuration
    Show(ShowSavedArgs),
    /// Delete a saved configuration
    Delete(DeleteSavedArgs),
    /// Build a configuration and save it
    Save(SaveArgs),
}

/// List saved configurations, newest first
#[derive(Debug, Clone, Args)]
pub struct ListSavedArgs {
    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show one saved configuration
#[derive(Debug, Clone, Args)]
pub struct ShowSavedArgs {
    /// Configuration name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Delete a saved configuration
#[derive(Debug, Clone, Args)]
pub struct DeleteSavedArgs {
    /// Configuration name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Build a configuration and save it
#[derive(Debug, Clone, Args)]
pub struct SaveArgs {
    /// Configuration name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Pegboard ID
    #[arg(long, value_name = "ID")]
    pub pegboard: String,

    /// Accessory placement as ID or ID@x,y,z (repeatable)
    #[arg(long = "accessory", value_name = "ID@X,Y,Z")]
    pub accessories: Vec<String>,

    /// Catalog JSON file (defaults to the configured catalog)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output the saved record as JSON
    #[arg(long)]
    pub json: bool,
}

// JSON response types
#[derive(Debug, Serialize)]
struct SavedSummary {
    id: String,
    name: String,
    pegboard_id: Option<String>,
    accessory_count: usize,
    created: String,
    modified: String,
}

#[derive(Debug, Serialize)]
struct ListSavedResponse {
    configurations: Vec<SavedSummary>,
    count: usize,
}

impl From<&SavedConfiguration> for SavedSummary {
    fn from(saved: &SavedConfiguration) -> Self {
        Self {
            id: saved.id.to_string(),
            name: saved.name.clone(),
            pegboard_id: saved.configuration.pegboard_id.clone(),
            accessory_count: saved.configuration.accessories.len(),
            created: saved.created.to_rfc3339(),
            modified: saved.modified.to_rfc3339(),
        }
    }
}

impl SavedArgs {
    /// Execute the saved command
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            SavedCommand::List(args) => args.execute(),
            SavedCommand::Show(args) => args.execute(),
            SavedCommand::Delete(args) => args.execute(),
            SavedCommand::Save(args) => args.execute(),
        }
    }
}

impl ListSavedArgs {
    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let persistence = open_persistence(self.dir.as_deref(), &settings)?;
        let saved = persistence
            .list()
            .map_err(|e| CliError::from_service("Failed to list configurations", &e))?;

        let response = ListSavedResponse {
            count: saved.len(),
            configurations: saved.iter().map(SavedSummary::from).collect(),
        };

        if self.json {
            return print_json(&response);
        }

        if response.count == 0 {
            println!(
                "No saved configurations. Create one with `{APP_BINARY_NAME} saved save`."
            );
            return Ok(());
        }

        println!("Saved configurations ({}):", response.count);
        println!();
        for entry in &response.configurations {
            println!(
                "  {:<24} {:<16} {:>3} accessories  {}",
                entry.name,
                entry.pegboard_id.as_deref().unwrap_or("-"),
                entry.accessory_count,
                entry.modified
            );
        }

        Ok(())
    }
}

impl ShowSavedArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let persistence = open_persistence(self.dir.as_deref(), &settings)?;
        let saved = persistence
            .load(&self.name)
            .map_err(|e| CliError::from_service("Failed to load configuration", &e))?;

        if self.json {
            return print_json(&saved);
        }

        println!("{} ({})", saved.name, saved.id);
        println!(
            "  Pegboard: {}",
            saved.configuration.pegboard_id.as_deref().unwrap_or("-")
        );
        println!("  Created:  {}", saved.created.to_rfc3339());
        println!("  Modified: {}", saved.modified.to_rfc3339());
        println!("  Accessories ({}):", saved.configuration.accessories.len());
        for (index, placement) in saved.configuration.accessories.iter().enumerate() {
            let p = placement.position;
            println!(
                "    {index:>3}. {:<16} at ({}, {}, {})",
                placement.accessory_id, p.x, p.y, p.z
            );
        }

        Ok(())
    }
}

impl DeleteSavedArgs {
    /// Execute the delete command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let persistence = open_persistence(self.dir.as_deref(), &settings)?;
        persistence
            .delete(&self.name)
            .map_err(|e| CliError::from_service("Failed to delete configuration", &e))?;

        println!("Configuration '{}' deleted.", self.name);
        Ok(())
    }
}

impl SaveArgs {
    /// Execute the save command
    pub fn execute(&self) -> CliResult<()> {
        let placements = self
            .accessories
            .iter()
            .map(|arg| parse_placement(arg))
            .collect::<CliResult<Vec<_>>>()?;

        let settings = load_settings()?;
        let catalog = open_catalog(self.catalog.as_deref(), &settings)?;

        let mut scene = SceneState::new(settings.general.max_accessories)?;
        scene.select_pegboard(&self.pegboard, &catalog)?;
        for placement in placements {
            scene.place(placement, &catalog)?;
        }

        let persistence = open_persistence(self.dir.as_deref(), &settings)?;
        let saved = persistence
            .save(&self.name, &scene.to_configuration())
            .map_err(|e| CliError::from_service("Failed to save configuration", &e))?;

        if self.json {
            return print_json(&saved);
        }

        println!(
            "Configuration '{}' saved ({} accessories).",
            saved.name,
            saved.configuration.accessories.len()
        );
        Ok(())
    }
}

/// Parses `ID` or `ID@x,y,z` into an unrotated placement.
fn parse_placement(arg: &str) -> CliResult<PlacedAccessory> {
    let (id, coords) = match arg.rsplit_once('@') {
        Some((id, coords)) => (id.trim(), Some(coords)),
        None => (arg.trim(), None),
    };

    if id.is_empty() {
        return Err(CliError::validation(format!(
            "Invalid accessory '{arg}': missing accessory ID"
        )));
    }

    let position = match coords {
        None => Vector3::default(),
        Some(coords) => {
            let values = coords
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    CliError::validation(format!("Invalid accessory '{arg}': {e}"))
                })?;
            match values.as_slice() {
                [x, y, z] => Vector3::new(*x, *y, *z),
                _ => {
                    return Err(CliError::validation(format!(
                        "Invalid accessory '{arg}': expected ID@x,y,z"
                    )))
                }
            }
        }
    };

    Ok(PlacedAccessory::new(id, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_placement() {
        let placement = parse_placement("A1@1.5,-2,0").unwrap();
        assert_eq!(placement.accessory_id, "A1");
        assert_eq!(placement.position, Vector3::new(1.5, -2.0, 0.0));

        let origin = parse_placement("hook").unwrap();
        assert_eq!(origin.position, Vector3::default());
    }

    #[test]
    fn test_parse_placement_rejects_bad_coordinates() {
        assert!(parse_placement("A1@1,2").is_err());
        assert!(parse_placement("A1@x,y,z").is_err());
        assert!(parse_placement("@1,2,3").is_err());
    }
}

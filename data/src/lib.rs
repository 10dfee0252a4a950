pub mod chart;
pub mod city;
pub mod config;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

pub use city::{City, CityStore};
pub use config::sidebar::{self, Sidebar};
pub use config::state::State;
pub use config::theme::{ChartColors, Theme};

use ::log::{info, warn};

pub const SAVED_STATE_PATH: &str = "saved-state.json";
pub const LOG_FILE_PATH: &str = "heatline.log";

#[derive(thiserror::Error, Debug, Clone)]
pub enum InternalError {
    #[error("Storage error: {0}")]
    Storage(String),
}

pub fn write_json_to_file(json: &str, file_name: &str) -> std::io::Result<()> {
    let path = data_path(Some(file_name));

    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid state file path")
    })?;

    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn read_from_file(file_name: &str) -> Result<State, Box<dyn std::error::Error>> {
    let path = data_path(Some(file_name));

    let mut file = File::open(&path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    match serde_json::from_str(&contents) {
        Ok(state) => Ok(state),
        Err(e) => {
            drop(file);

            let backup_path = data_path(Some(&backup_file_name(file_name)));

            if let Err(rename_err) = std::fs::rename(&path, &backup_path) {
                warn!(
                    "Failed to backup corrupted state file '{}' to '{}': {}",
                    path.display(),
                    backup_path.display(),
                    rename_err
                );
            } else {
                info!(
                    "Backed up corrupted state file to '{}'. It can be restored manually.",
                    backup_path.display()
                );
            }

            Err(Box::new(e))
        }
    }
}

fn backup_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(pos) => format!("{}_old{}", &file_name[..pos], &file_name[pos..]),
        None => format!("{file_name}_old"),
    }
}

/// Loads the persisted state, falling back to defaults when it is missing or unreadable.
pub fn load_state() -> State {
    match read_from_file(SAVED_STATE_PATH) {
        Ok(state) => {
            info!("Loaded saved state with {} cities", state.cities.len());
            state
        }
        Err(e) => {
            warn!("Using default state, couldn't read {SAVED_STATE_PATH}: {e}");
            State::default()
        }
    }
}

pub fn save_state(state: &State) -> Result<(), InternalError> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| InternalError::Storage(format!("Failed to serialize state: {e}")))?;

    write_json_to_file(&json, SAVED_STATE_PATH)
        .map_err(|e| InternalError::Storage(format!("Failed to write state: {e}")))?;

    info!("Saved state to {SAVED_STATE_PATH}");
    Ok(())
}

pub fn open_data_folder() -> Result<(), InternalError> {
    let pathbuf = data_path(None);

    if !pathbuf.exists() {
        return Err(InternalError::Storage(format!(
            "Data folder does not exist: {pathbuf:?}"
        )));
    }

    open::that(&pathbuf).map_err(|err| {
        InternalError::Storage(format!(
            "Failed to open data folder: {pathbuf:?}, error: {err}"
        ))
    })?;

    info!("Opened data folder: {pathbuf:?}");
    Ok(())
}

pub fn data_path(path_name: Option<&str>) -> PathBuf {
    let base = match std::env::var("HEATLINE_DATA_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("heatline"),
    };

    match path_name {
        Some(path_name) => base.join(path_name),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_name_keeps_extension() {
        assert_eq!(backup_file_name("saved-state.json"), "saved-state_old.json");
        assert_eq!(backup_file_name("state"), "state_old");
    }
}

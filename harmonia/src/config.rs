use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use harmonia_core::Settings;
use log::info;

/// Loads settings from a JSON file, or the defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let settings: Settings = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
            info!("Loaded settings from {}", path.display());
            settings
        }
        None => Settings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_path() {
        assert_eq!(load(None).unwrap(), Settings::default());
    }

    #[test]
    fn reads_and_validates_file() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("harmonia-settings-{}.json", std::process::id()));
        fs::write(&good, r#"{ "keyboard_base": 60 }"#).unwrap();
        assert_eq!(load(Some(&good)).unwrap().keyboard_base, 60);

        fs::write(&good, r#"{ "analysis_window": 1000 }"#).unwrap();
        assert!(load(Some(&good)).is_err());
        fs::remove_file(&good).unwrap();

        assert!(load(Some(Path::new("/nonexistent/harmonia.json"))).is_err());
    }
}

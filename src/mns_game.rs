// Preset catalog and user preferences
// Handles the fixed difficulty presets and configuration persistence

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Named board configuration offered in the difficulty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str, // Stable identifier, also used in the config file
    pub width: usize,
    pub height: usize,
    pub mine_count: usize,
}

/// Presets ordered from easiest to hardest
pub const PRESETS: [Preset; 6] = [
    Preset { name: "Easy", width: 7, height: 7, mine_count: 7 },
    Preset { name: "Medium", width: 18, height: 12, mine_count: 25 },
    Preset { name: "Hard", width: 18, height: 18, mine_count: 65 },
    Preset { name: "Very Hard", width: 25, height: 25, mine_count: 150 },
    Preset { name: "Extreme", width: 32, height: 32, mine_count: 270 },
    Preset { name: "Insane", width: 50, height: 50, mine_count: 750 },
];

impl Preset {
    /// Preset at `index`, clamped to the last one
    pub fn by_index(index: usize) -> Preset {
        PRESETS[index.min(PRESETS.len() - 1)]
    }

    /// Position of the preset with the given stable name
    pub fn index_of(name: &str) -> Option<usize> {
        PRESETS.iter().position(|p| p.name == name)
    }
}

/// The preset remembered between runs
/// Stored by name so the config file stays readable and survives reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresetChoice(pub usize);

impl PresetChoice {
    pub fn index(&self) -> usize {
        self.0.min(PRESETS.len() - 1)
    }
}

impl Serialize for PresetChoice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(Preset::by_index(self.0).name)
    }
}

impl<'de> Deserialize<'de> for PresetChoice {
    fn deserialize<D>(deserializer: D) -> Result<PresetChoice, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match Preset::index_of(&s) {
            Some(index) => Ok(PresetChoice(index)),
            None => {
                warn!(preset = %s, "unknown preset in configuration, using the default");
                Ok(PresetChoice::default())
            }
        }
    }
}

/// User configuration
/// Persisted to disk as TOML
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub preset: PresetChoice, // Last started preset
    pub language: String,     // Language code ("en" or "de")
    pub ascii_icons: bool,    // Use ASCII fallback glyphs
    pub log_level: String,    // tracing filter directive, overridden by RUST_LOG
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language on first run
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let language = if system_lang.to_lowercase().starts_with("de") {
            "de".to_string()
        } else {
            "en".to_string()
        };

        Config {
            preset: PresetChoice::default(),
            language,
            ascii_icons: false,
            log_level: "info".to_string(),
        }
    }
}

/// Per-user directory holding the config and log files
/// Falls back to the current directory if ProjectDirs is unavailable
pub fn data_dir() -> Option<PathBuf> {
    match ProjectDirs::from("com", "mnswpr", "mnswpr") {
        Some(proj) => Some(proj.config_dir().to_path_buf()),
        None => env::current_dir().ok(),
    }
}

pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("mnswpr.toml"))
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("mnswpr.log"))
}

/// Load configuration from disk, or create default if not found
/// Runs before logging is set up, so failures fall back silently
pub fn load_or_create_config() -> Config {
    match config_path() {
        Some(path) => load_or_create_config_at(&path),
        None => Config::default(),
    }
}

/// A broken file is left in place for the user to fix; only a missing one is created
fn load_or_create_config_at(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(s) => toml::from_str::<Config>(&s).unwrap_or_default(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let cfg = Config::default();
            if let Ok(s) = toml::to_string(&cfg) {
                if let Some(parent) = path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                let _ = fs::write(path, s);
            }
            cfg
        }
        Err(_) => Config::default(),
    }
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    let Some(path) = config_path() else {
        warn!("no configuration directory available, preferences not saved");
        return;
    };
    let s = match toml::to_string(cfg) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to serialize configuration");
            return;
        }
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match fs::write(&path, s) {
        Ok(()) => debug!(path = %path.display(), "configuration saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to save configuration"),
    }
}

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
pub const APP_NAME: &str = "pdfsnip";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Run exports through the optimizer
    #[serde(default)]
    pub optimize: bool,

    /// Optimizer program
    #[serde(default = "default_optimizer")]
    pub optimizer: String,

    /// Export directory; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Initial zoom on top of fit-to-viewport
    #[serde(default = "default_zoom")]
    pub zoom: f32,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_optimizer() -> String {
    "svgo".to_string()
}

fn default_zoom() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            optimize: false,
            optimizer: default_optimizer(),
            output_dir: None,
            zoom: default_zoom(),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

/// Where settings are read from and saved to, once chosen
static CONFIG_PATH: LazyLock<RwLock<Option<PathBuf>>> = LazyLock::new(|| RwLock::new(None));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

fn config_path() -> Option<PathBuf> {
    CONFIG_PATH
        .read()
        .ok()
        .and_then(|path| path.clone())
        .or_else(preferred_config_path)
}

/// Load settings from the default location, creating the file with defaults
/// on first run
pub fn load_settings() {
    let Some(path) = config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    load_settings_from(&path);
}

/// Use `path` as the settings file from now on and load it
pub fn load_settings_from(path: &Path) {
    if let Ok(mut configured) = CONFIG_PATH.write() {
        *configured = Some(path.to_path_buf());
    }

    if path.exists() {
        load_settings_from_path(path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(mut global) = SETTINGS.write() {
            *global = Settings::default();
            save_settings_to_file(&global, path);
        }
    }
}

fn load_settings_from_path(path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() {
    let Some(path) = config_path() else {
        warn!("Could not determine config directory, cannot save settings");
        return;
    };

    if let Ok(settings) = SETTINGS.read() {
        save_settings_to_file(&settings, &path);
    }
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = generate_settings_yaml(settings);

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push('\n');
    content.push_str("# Run exported selections through the optimizer\n");
    content.push_str(&format!("optimize: {}\n", settings.optimize));
    content.push_str("# Optimizer program (must accept svgo's command line)\n");
    content.push_str(&format!("optimizer: {}\n", yaml_scalar(&settings.optimizer)));
    content.push_str("# Directory exports are written to (default: working directory)\n");
    match &settings.output_dir {
        Some(dir) => content.push_str(&format!(
            "output_dir: {}\n",
            yaml_scalar(&dir.to_string_lossy())
        )),
        None => content.push_str("# output_dir: \"~/Pictures/snips\"\n"),
    }
    content.push_str("# Initial zoom, 1.0 fits the page to the window\n");
    content.push_str(&format!("zoom: {}\n", settings.zoom));

    content
}

/// Quote a string the way serde_yaml would, so backslashes and quotes in
/// paths survive a round trip
fn yaml_scalar(value: &str) -> String {
    match serde_yaml::to_string(value) {
        Ok(quoted) => quoted.trim_end().to_string(),
        Err(e) => {
            warn!("Could not encode {value:?} as YAML: {e}");
            format!("{value:?}")
        }
    }
}

// Public API for accessing/modifying settings

pub fn get_settings() -> Settings {
    SETTINGS
        .read()
        .map(|s| s.clone())
        .unwrap_or_default()
}

pub fn set_optimize(optimize: bool) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.optimize = optimize;
    }
    save_settings();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn generated_yaml_parses_back() {
        let settings = Settings {
            optimize: true,
            output_dir: Some(PathBuf::from("/tmp/snips")),
            zoom: 1.5,
            ..Settings::default()
        };

        let yaml = generate_settings_yaml(&settings);
        let parsed: Settings = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn generated_yaml_keeps_backslashes_and_quotes() {
        let settings = Settings {
            optimizer: r#"C:\tools\svgo "patched".cmd"#.to_string(),
            output_dir: Some(PathBuf::from(r"C:\Users\me\snips")),
            ..Settings::default()
        };

        let yaml = generate_settings_yaml(&settings);
        let parsed: Settings = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    #[serial]
    fn toggle_rewrites_windows_path_loadably() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: 1\noutput_dir: 'C:\\Users\\me\\snips'\n").unwrap();
        load_settings_from(&path);

        set_optimize(true);

        let saved: Settings = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.output_dir, Some(PathBuf::from(r"C:\Users\me\snips")));
        assert!(saved.optimize);

        set_optimize(false);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Settings = serde_yaml::from_str("optimize: true\n").unwrap();
        assert!(parsed.optimize);
        assert_eq!(parsed.optimizer, "svgo");
        assert_eq!(parsed.output_dir, None);
        assert_eq!(parsed.zoom, 1.0);
        assert_eq!(parsed.version, CURRENT_VERSION);
    }

    #[test]
    #[serial]
    fn first_load_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdfsnip").join("config.yaml");

        load_settings_from(&path);

        assert!(path.exists());
        assert_eq!(get_settings(), Settings::default());
    }

    #[test]
    #[serial]
    fn toggled_optimize_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        load_settings_from(&path);

        set_optimize(true);

        let saved: Settings = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(saved.optimize);
        assert!(get_settings().optimize);

        set_optimize(false);
    }

    #[test]
    #[serial]
    fn old_version_is_migrated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: 0\noutput_dir: \"/tmp/out\"\n").unwrap();

        load_settings_from(&path);

        assert_eq!(get_settings().output_dir, Some(PathBuf::from("/tmp/out")));
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with(&format!("version: {CURRENT_VERSION}\n")));
    }
}

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SettingsError;

pub const DEFAULT_HOTKEY: &str = "super+shift+Space";

/// Everything the user can configure, as stored in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub show_shortcut_hints: bool,
    pub clear_input_after_copy: bool,
    pub close_window_after_copy: bool,
    pub hide_on_focus_loss: bool,
    pub floating_window: bool,
    pub hotkey: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_shortcut_hints: true,
            clear_input_after_copy: true,
            close_window_after_copy: true,
            hide_on_focus_loss: true,
            floating_window: true,
            hotkey: DEFAULT_HOTKEY.to_string(),
        }
    }
}

impl Settings {
    pub fn behavior(&self) -> BehaviorFlags {
        BehaviorFlags {
            clear_after_commit: self.clear_input_after_copy,
            dismiss_after_commit: self.close_window_after_copy,
            show_hint_text: self.show_shortcut_hints,
            hide_on_focus_loss: self.hide_on_focus_loss,
        }
    }
}

/// Snapshot of the toggles that steer a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorFlags {
    pub clear_after_commit: bool,
    pub dismiss_after_commit: bool,
    pub show_hint_text: bool,
    pub hide_on_focus_loss: bool,
}

impl Default for BehaviorFlags {
    fn default() -> Self {
        Settings::default().behavior()
    }
}

/// Source of behavior flags. Implementations are read at use time and must
/// not cache beyond a single call.
pub trait SettingsStore {
    fn behavior(&self) -> BehaviorFlags;
}

/// Settings backed by a TOML file that is re-read on every lookup.
///
/// A broken file is reported once; the warning repeats only after the file
/// loads cleanly again or fails differently.
pub struct TomlSettingsStore {
    path: PathBuf,
    last_error: RefCell<Option<String>>,
}

impl TomlSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        TomlSettingsStore {
            path,
            last_error: RefCell::new(None),
        }
    }

    /// `<config_dir>/calmtype/settings.toml`
    pub fn default_location() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::new(dir.join("calmtype").join("settings.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file. A missing file yields defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Like `load`, but logs and falls back to defaults on error.
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable settings");
            Settings::default()
        })
    }
}

impl SettingsStore for TomlSettingsStore {
    fn behavior(&self) -> BehaviorFlags {
        match self.load() {
            Ok(settings) => {
                self.last_error.replace(None);
                settings.behavior()
            }
            Err(err) => {
                let message = err.to_string();
                if self.last_error.borrow().as_deref() != Some(message.as_str()) {
                    warn!(error = %err, "ignoring unreadable settings");
                    self.last_error.replace(Some(message));
                }
                BehaviorFlags::default()
            }
        }
    }
}

/// Fixed settings, for tests and for running without a config directory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsStore for StaticSettings {
    fn behavior(&self) -> BehaviorFlags {
        self.0.behavior()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "clear_input_after_copy = false\nhotkey = \"ctrl+alt+KeyK\"\n").unwrap();

        let settings = TomlSettingsStore::new(path).load().unwrap();
        assert!(!settings.clear_input_after_copy);
        assert!(settings.close_window_after_copy);
        assert!(settings.show_shortcut_hints);
        assert_eq!(settings.hotkey, "ctrl+alt+KeyK");
    }

    #[test]
    fn malformed_file_is_a_parse_error_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "clear_input_after_copy = \"sometimes\"").unwrap();

        let store = TomlSettingsStore::new(path);
        assert!(matches!(store.load(), Err(SettingsError::Parse { .. })));
        assert_eq!(store.behavior(), BehaviorFlags::default());
    }

    #[test]
    fn broken_file_is_reported_once_until_it_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "show_shortcut_hints = 3").unwrap();
        let store = TomlSettingsStore::new(path.clone());

        let warnings = |logs: &str| logs.matches("ignoring unreadable settings").count();

        let logs = capture_logs(|| {
            for _ in 0..10 {
                assert_eq!(store.behavior(), BehaviorFlags::default());
            }
        });
        assert_eq!(warnings(&logs), 1);

        let logs = capture_logs(|| {
            fs::write(&path, "show_shortcut_hints = false").unwrap();
            assert!(!store.behavior().show_hint_text);
            fs::write(&path, "show_shortcut_hints = 3").unwrap();
            store.behavior();
            store.behavior();
        });
        assert_eq!(warnings(&logs), 1);
    }

    #[test]
    fn behavior_is_reread_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = TomlSettingsStore::new(path.clone());
        assert!(store.behavior().dismiss_after_commit);

        fs::write(&path, "close_window_after_copy = false").unwrap();
        assert!(!store.behavior().dismiss_after_commit);
    }

    #[test]
    fn behavior_maps_stored_names() {
        let settings = Settings {
            show_shortcut_hints: false,
            clear_input_after_copy: true,
            close_window_after_copy: false,
            hide_on_focus_loss: false,
            ..Settings::default()
        };
        assert_eq!(
            settings.behavior(),
            BehaviorFlags {
                clear_after_commit: true,
                dismiss_after_commit: false,
                show_hint_text: false,
                hide_on_focus_loss: false,
            }
        );
    }
}

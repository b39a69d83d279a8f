use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no screen available to place the capture window")]
    NoScreen,
    #[error("failed to construct capture window: {0}")]
    Construction(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory on this system")]
    NoConfigDir,
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("invalid hotkey binding {binding:?}: {reason}")]
    InvalidBinding { binding: String, reason: String },
    #[error("hotkey registration failed")]
    Registration(#[from] global_hotkey::Error),
}

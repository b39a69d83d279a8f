//! CalmType: a hotkey-summoned text window that copies what you type to the
//! clipboard and gets out of the way.

pub mod capture;
pub mod clipboard;
pub mod error;
pub mod events;
pub mod foreground;
pub mod hotkey;
pub mod keys;
pub mod logging;
pub mod settings;
pub mod window;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(test)]
mod testing;

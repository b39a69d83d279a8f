use std::str::FromStr;

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::info;

use crate::error::HotkeyError;

/// A parsed global shortcut such as `super+shift+Space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding(HotKey);

impl HotkeyBinding {
    pub fn parse(binding: &str) -> Result<Self, HotkeyError> {
        HotKey::from_str(binding)
            .map(HotkeyBinding)
            .map_err(|e| HotkeyError::InvalidBinding {
                binding: binding.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn id(&self) -> u32 {
        self.0.id()
    }

    pub fn hotkey(&self) -> HotKey {
        self.0
    }
}

/// Owns the process-wide registration of the toggle shortcut.
pub struct HotkeyDispatcher {
    _manager: GlobalHotKeyManager,
    toggle_id: u32,
}

impl HotkeyDispatcher {
    /// Must be called on the main thread.
    pub fn register(binding: HotkeyBinding) -> Result<Self, HotkeyError> {
        let manager = GlobalHotKeyManager::new()?;
        manager.register(binding.hotkey())?;
        info!(id = binding.id(), "global toggle hotkey registered");

        Ok(HotkeyDispatcher {
            _manager: manager,
            toggle_id: binding.id(),
        })
    }

    /// Drain pending hotkey events and count toggle presses.
    pub fn poll_toggles(&self) -> usize {
        let receiver = GlobalHotKeyEvent::receiver();
        std::iter::from_fn(|| receiver.try_recv().ok())
            .filter(|event| is_toggle_press(event, self.toggle_id))
            .count()
    }
}

fn is_toggle_press(event: &GlobalHotKeyEvent, toggle_id: u32) -> bool {
    event.id() == toggle_id && event.state() == HotKeyState::Pressed
}

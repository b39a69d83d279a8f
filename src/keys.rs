//! Key-chord interception for the capture text view.
//!
//! The table is consulted before the native text view sees a key press. A
//! matching chord is consumed and turned into a [`ChordAction`]; anything else
//! goes to default text editing untouched.

use bitflags::bitflags;

/// macOS virtual key codes (Carbon `kVK_*`).
pub mod key_code {
    pub const RETURN: u16 = 36;
    pub const ESCAPE: u16 = 53;
    pub const KEYPAD_ENTER: u16 = 76;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChordModifiers: u8 {
        const COMMAND = 1 << 0;
        const SHIFT = 1 << 1;
        const OPTION = 1 << 2;
        const CONTROL = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key_code: u16,
    pub modifiers: ChordModifiers,
}

impl KeyChord {
    pub const fn new(key_code: u16, modifiers: ChordModifiers) -> Self {
        KeyChord { key_code, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordAction {
    Commit,
    Cancel,
}

/// One row of the table. `required` modifiers must all be held; extra
/// modifiers do not prevent a match.
#[derive(Debug, Clone, Copy)]
pub struct ChordBinding {
    pub key_codes: &'static [u16],
    pub required: ChordModifiers,
    pub action: ChordAction,
}

impl ChordBinding {
    fn matches(&self, chord: KeyChord) -> bool {
        self.key_codes.contains(&chord.key_code) && chord.modifiers.contains(self.required)
    }
}

pub const DEFAULT_BINDINGS: &[ChordBinding] = &[
    ChordBinding {
        key_codes: &[key_code::RETURN, key_code::KEYPAD_ENTER],
        required: ChordModifiers::COMMAND,
        action: ChordAction::Commit,
    },
    ChordBinding {
        key_codes: &[key_code::ESCAPE],
        required: ChordModifiers::empty(),
        action: ChordAction::Cancel,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Intercept(ChordAction),
    PassThrough,
}

#[derive(Debug, Clone, Copy)]
pub struct ChordTable {
    bindings: &'static [ChordBinding],
}

impl Default for ChordTable {
    fn default() -> Self {
        ChordTable::new(DEFAULT_BINDINGS)
    }
}

impl ChordTable {
    pub const fn new(bindings: &'static [ChordBinding]) -> Self {
        ChordTable { bindings }
    }

    /// First matching binding wins.
    pub fn resolve(&self, chord: KeyChord) -> KeyDisposition {
        self.bindings
            .iter()
            .find(|binding| binding.matches(chord))
            .map_or(KeyDisposition::PassThrough, |binding| {
                KeyDisposition::Intercept(binding.action)
            })
    }

    /// Route one key press: intercepted chords are returned to the caller and
    /// `default_editing` is not run; everything else runs `default_editing`.
    pub fn intercept(
        &self,
        chord: KeyChord,
        default_editing: impl FnOnce(),
    ) -> Option<ChordAction> {
        match self.resolve(chord) {
            KeyDisposition::Intercept(action) => Some(action),
            KeyDisposition::PassThrough => {
                default_editing();
                None
            }
        }
    }
}

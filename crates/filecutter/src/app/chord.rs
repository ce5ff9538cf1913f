//! Chord parsing and keystroke classification.

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ChordParseError;
use crate::domain::model::{ChordEvent, Command, KeyId, ModifierKey, Modifiers};
use crate::infra::config::Chords;

/// A modifier combination plus one key, e.g. `cmd+x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: Modifiers,
    pub key: KeyId,
}

impl Chord {
    pub fn new(modifiers: Modifiers, key: char) -> Self {
        Self {
            modifiers,
            key: KeyId::Char(key.to_ascii_lowercase()),
        }
    }

    /// The event's key is this chord's key and all of its modifiers are held.
    ///
    /// Additional held modifiers do not prevent a match.
    pub fn matches(&self, event: &ChordEvent) -> bool {
        event.key == self.key && event.modifiers.contains(self.modifiers)
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        for token in trimmed.split('+').map(str::trim) {
            let lower = token.to_ascii_lowercase();
            if let Some(modifier) = parse_modifier(&lower) {
                modifiers = modifiers.with(modifier);
                continue;
            }

            let mut chars = lower.chars();
            let parsed = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => c,
                _ => return Err(ChordParseError::UnknownKey(token.to_string())),
            };

            if key.replace(parsed).is_some() {
                return Err(ChordParseError::MultipleKeys(trimmed.to_string()));
            }
        }

        let key = key.ok_or_else(|| ChordParseError::MissingKey(trimmed.to_string()))?;
        if modifiers.is_empty() {
            return Err(ChordParseError::MissingModifier(trimmed.to_string()));
        }

        Ok(Chord::new(modifiers, key))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.modifiers, self.key)
    }
}

fn parse_modifier(token: &str) -> Option<ModifierKey> {
    match token {
        "cmd" | "command" | "meta" | "super" => Some(ModifierKey::Command),
        "ctrl" | "control" => Some(ModifierKey::Control),
        "alt" | "option" | "opt" => Some(ModifierKey::Alt),
        "shift" => Some(ModifierKey::Shift),
        _ => None,
    }
}

/// The two command chords. Classification is stateless: each event is judged on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordBindings {
    cut: Chord,
    paste: Chord,
}

impl ChordBindings {
    /// Rejects pairs where one chord also matches the other's keystroke.
    pub fn new(cut: Chord, paste: Chord) -> Result<Self, ChordParseError> {
        if cut == paste {
            return Err(ChordParseError::Duplicate(cut.to_string()));
        }
        if cut.key == paste.key {
            let overlap = if paste.modifiers.contains(cut.modifiers) {
                Some((cut, paste))
            } else if cut.modifiers.contains(paste.modifiers) {
                Some((paste, cut))
            } else {
                None
            };
            if let Some((broad, narrow)) = overlap {
                return Err(ChordParseError::Overlapping {
                    broad: broad.to_string(),
                    narrow: narrow.to_string(),
                });
            }
        }
        Ok(Self { cut, paste })
    }

    /// Parse both chords from configuration.
    pub fn from_config(chords: &Chords) -> Result<Self, ChordParseError> {
        Self::new(chords.cut().parse()?, chords.paste().parse()?)
    }

    pub fn cut(&self) -> Chord {
        self.cut
    }

    pub fn paste(&self) -> Chord {
        self.paste
    }

    /// Map an event to a command, or `None` for ordinary typing.
    pub fn classify(&self, event: &ChordEvent) -> Option<Command> {
        if self.cut.matches(event) {
            Some(Command::Cut)
        } else if self.paste.matches(event) {
            Some(Command::Paste)
        } else {
            None
        }
    }
}

impl Default for ChordBindings {
    fn default() -> Self {
        Self {
            cut: Chord::new(Modifiers::COMMAND, 'x'),
            paste: Chord::new(Modifiers::COMMAND, 'v'),
        }
    }
}

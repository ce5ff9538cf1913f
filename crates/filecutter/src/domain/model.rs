//! Domain models for keystrokes, commands, and move results.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;

/// Modifier keys held down while a key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub command: bool,
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        command: false,
        control: false,
        alt: false,
        shift: false,
    };

    pub const COMMAND: Self = Self {
        command: true,
        ..Self::NONE
    };

    /// Returns `true` when every modifier held in `other` is also held in `self`.
    pub fn contains(&self, other: Modifiers) -> bool {
        (!other.command || self.command)
            && (!other.control || self.control)
            && (!other.alt || self.alt)
            && (!other.shift || self.shift)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Mark a single modifier key as held.
    pub fn with(mut self, key: ModifierKey) -> Self {
        self.set(key, true);
        self
    }

    pub(crate) fn set(&mut self, key: ModifierKey, held: bool) {
        match key {
            ModifierKey::Command => self.command = held,
            ModifierKey::Control => self.control = held,
            ModifierKey::Alt => self.alt = held,
            ModifierKey::Shift => self.shift = held,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.command, "cmd"),
            (self.control, "ctrl"),
            (self.alt, "alt"),
            (self.shift, "shift"),
        ]
        .into_iter()
        .filter_map(|(held, name)| held.then_some(name))
        .collect();
        f.write_str(&names.join("+"))
    }
}

/// A modifier key, independent of which side of the keyboard it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Command,
    Control,
    Alt,
    Shift,
}

/// Platform-neutral identifier for a physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    /// Letter or digit keys, always lower-case.
    Char(char),
    /// A modifier key pressed on its own.
    Modifier(ModifierKey),
    /// Anything the chord vocabulary does not cover.
    Other,
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{c}"),
            KeyId::Modifier(key) => write!(f, "{key:?}"),
            KeyId::Other => f.write_str("other"),
        }
    }
}

/// A single observed key-down. Produced by the hook and consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordEvent {
    pub modifiers: Modifiers,
    pub key: KeyId,
    pub timestamp: OffsetDateTime,
}

impl ChordEvent {
    pub fn new(modifiers: Modifiers, key: KeyId) -> Self {
        Self {
            modifiers,
            key,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// A recognized chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Cut,
    Paste,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Cut => "cut",
            Command::Paste => "paste",
        }
    }
}

/// What the interceptor tells the hook to do with an event. Events are never swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PassThrough,
}

/// Result of moving one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "kebab-case")]
pub enum MoveOutcome {
    Moved,
    SourceMissing,
    DestinationConflict,
    Failed(String),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOutcome::Moved => f.write_str("moved"),
            MoveOutcome::SourceMissing => f.write_str("source missing"),
            MoveOutcome::DestinationConflict => f.write_str("destination exists"),
            MoveOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-path record produced by a move batch, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: MoveOutcome,
}

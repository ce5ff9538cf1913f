//! System-wide keyboard observation.

use std::collections::HashSet;

use time::OffsetDateTime;

use crate::domain::errors::HookError;
use crate::domain::model::{ChordEvent, Disposition, KeyId, ModifierKey, Modifiers};

/// Receives every key-down observed by a hook.
pub type EventSink = Box<dyn FnMut(ChordEvent) -> Disposition + 'static>;

/// A process-wide keyboard observer.
pub trait KeyboardHook {
    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Check that the hook can be installed on this platform at all.
    fn probe(&self) -> Result<(), HookError>;

    /// Install the hook and deliver events to `sink` until the hook stops.
    ///
    /// Blocks the calling thread. Errors mean the hook never came up.
    fn run(&mut self, sink: EventSink) -> Result<(), HookError>;
}

/// Which physical copy of a modifier key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// A key transition as reported by the platform, before modifier state is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKey {
    pub id: KeyId,
    pub side: Side,
}

impl RawKey {
    pub fn key(id: KeyId) -> Self {
        Self {
            id,
            side: Side::Left,
        }
    }

    pub fn modifier(key: ModifierKey, side: Side) -> Self {
        Self {
            id: KeyId::Modifier(key),
            side,
        }
    }
}

/// Derives held modifiers from a raw press/release stream.
///
/// Left and right modifiers are tracked separately so releasing one while the other is still
/// down keeps the modifier held.
#[derive(Debug, Default)]
pub struct ModifierTracker {
    held: HashSet<(ModifierKey, Side)>,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.held
            .iter()
            .fold(Modifiers::NONE, |mods, (key, _)| mods.with(*key))
    }

    /// Record a key-down and produce the event to classify.
    pub fn press(&mut self, raw: RawKey, timestamp: OffsetDateTime) -> ChordEvent {
        if let KeyId::Modifier(key) = raw.id {
            self.held.insert((key, raw.side));
        }
        ChordEvent {
            modifiers: self.modifiers(),
            key: raw.id,
            timestamp,
        }
    }

    pub fn release(&mut self, raw: RawKey) {
        if let KeyId::Modifier(key) = raw.id {
            self.held.remove(&(key, raw.side));
        }
    }
}

/// The platform's global keyboard hook.
#[derive(Debug, Default)]
pub struct SystemHook;

impl SystemHook {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "macos")]
impl KeyboardHook for SystemHook {
    fn name(&self) -> &'static str {
        "macos-event-tap"
    }

    fn probe(&self) -> Result<(), HookError> {
        Ok(())
    }

    fn run(&mut self, mut sink: EventSink) -> Result<(), HookError> {
        let mut tracker = ModifierTracker::new();
        tracing::info!(backend = self.name(), "listening for keyboard events");

        // rdev installs a listen-only tap: the OS forwards every event regardless of what we do.
        rdev::listen(move |event| match event.event_type {
            rdev::EventType::KeyPress(key) => {
                let chord = tracker.press(macos::translate(key), OffsetDateTime::from(event.time));
                let Disposition::PassThrough = sink(chord);
            }
            rdev::EventType::KeyRelease(key) => tracker.release(macos::translate(key)),
            _ => {}
        })
        .map_err(|err| HookError::InstallDenied(format!("{err:?}")))
    }
}

#[cfg(not(target_os = "macos"))]
impl KeyboardHook for SystemHook {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn probe(&self) -> Result<(), HookError> {
        Err(HookError::Unsupported {
            platform: std::env::consts::OS,
        })
    }

    fn run(&mut self, _sink: EventSink) -> Result<(), HookError> {
        self.probe()
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use rdev::Key;

    use super::{RawKey, Side};
    use crate::domain::model::{KeyId, ModifierKey};

    pub(super) fn translate(key: Key) -> RawKey {
        let modifier = |key, side| RawKey::modifier(key, side);
        match key {
            Key::MetaLeft => modifier(ModifierKey::Command, Side::Left),
            Key::MetaRight => modifier(ModifierKey::Command, Side::Right),
            Key::ControlLeft => modifier(ModifierKey::Control, Side::Left),
            Key::ControlRight => modifier(ModifierKey::Control, Side::Right),
            Key::Alt => modifier(ModifierKey::Alt, Side::Left),
            Key::AltGr => modifier(ModifierKey::Alt, Side::Right),
            Key::ShiftLeft => modifier(ModifierKey::Shift, Side::Left),
            Key::ShiftRight => modifier(ModifierKey::Shift, Side::Right),
            other => RawKey::key(character(other).map_or(KeyId::Other, KeyId::Char)),
        }
    }

    fn character(key: Key) -> Option<char> {
        let c = match key {
            Key::KeyA => 'a',
            Key::KeyB => 'b',
            Key::KeyC => 'c',
            Key::KeyD => 'd',
            Key::KeyE => 'e',
            Key::KeyF => 'f',
            Key::KeyG => 'g',
            Key::KeyH => 'h',
            Key::KeyI => 'i',
            Key::KeyJ => 'j',
            Key::KeyK => 'k',
            Key::KeyL => 'l',
            Key::KeyM => 'm',
            Key::KeyN => 'n',
            Key::KeyO => 'o',
            Key::KeyP => 'p',
            Key::KeyQ => 'q',
            Key::KeyR => 'r',
            Key::KeyS => 's',
            Key::KeyT => 't',
            Key::KeyU => 'u',
            Key::KeyV => 'v',
            Key::KeyW => 'w',
            Key::KeyX => 'x',
            Key::KeyY => 'y',
            Key::KeyZ => 'z',
            Key::Num0 => '0',
            Key::Num1 => '1',
            Key::Num2 => '2',
            Key::Num3 => '3',
            Key::Num4 => '4',
            Key::Num5 => '5',
            Key::Num6 => '6',
            Key::Num7 => '7',
            Key::Num8 => '8',
            Key::Num9 => '9',
            _ => return None,
        };
        Some(c)
    }

}

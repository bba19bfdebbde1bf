//! Best-effort capture deterrence
//!
//! Classifies viewer input on the media surface. Nothing here prevents
//! capture; it only suppresses the obvious shortcuts.

use std::fmt;

/// Physical key of a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Function key F1..F24
    F(u8),
    PrintScreen,
    Escape,
    Other(String),
}

/// A key press with its modifiers
///
/// `meta` is Cmd on macOS and the Windows key elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCombo {
    pub key: Option<Key>,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyCombo {
    pub fn key(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn is_escape(&self) -> bool {
        self.key == Some(Key::Escape)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".into());
        }
        if self.meta {
            parts.push("Meta".into());
        }
        if self.alt {
            parts.push("Alt".into());
        }
        if self.shift {
            parts.push("Shift".into());
        }
        parts.push(match &self.key {
            Some(Key::Char(c)) => c.to_ascii_uppercase().to_string(),
            Some(Key::F(n)) => format!("F{}", n),
            Some(Key::PrintScreen) => "PrintScreen".into(),
            Some(Key::Escape) => "Escape".into(),
            Some(Key::Other(name)) => name.clone(),
            None => "?".into(),
        });
        f.write_str(&parts.join("+"))
    }
}

/// Viewer input delivered to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Secondary click on the media surface
    ContextMenu,
    Key(KeyCombo),
    /// Page or window visibility changed
    VisibilityChanged { hidden: bool },
}

/// Whether the surface should run the input's default behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputVerdict {
    Allow,
    Suppress,
}

/// Key combinations tied to screenshots, saving, printing, page source or dev tools
pub fn is_capture_combo(combo: &KeyCombo) -> bool {
    let command = combo.ctrl || combo.meta;
    match &combo.key {
        Some(Key::PrintScreen) | Some(Key::F(12)) => true,
        Some(Key::Char(c)) => {
            let c = c.to_ascii_lowercase();
            // Save, print, view source
            (command && matches!(c, 's' | 'p' | 'u'))
                // Dev tools
                || (command && combo.shift && matches!(c, 'i' | 'j' | 'c'))
                // macOS screenshots and Win+Shift+S
                || (combo.meta && combo.shift && matches!(c, '3' | '4' | '5' | 's'))
        }
        _ => false,
    }
}

/// Default-behaviour verdict for an input, ignoring session state
pub fn classify(event: &InputEvent) -> InputVerdict {
    match event {
        InputEvent::ContextMenu => InputVerdict::Suppress,
        InputEvent::Key(combo) if is_capture_combo(combo) => InputVerdict::Suppress,
        InputEvent::Key(_) | InputEvent::VisibilityChanged { .. } => InputVerdict::Allow,
    }
}

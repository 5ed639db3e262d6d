//! Keys, modifiers and accelerators.
//!
//! This module defines the key vocabulary shared by the binding table, the
//! dispatcher and the X11 backend: [`Keysym`] / [`Keycode`] aliases,
//! [`ModMask`], parsed [`Accelerator`]s and the [`InputEvent`]s delivered by
//! an [`EventSource`](crate::traits::EventSource).
//!
//! Accelerators use the familiar GTK spelling: zero or more `<Modifier>`
//! tokens followed by a key name, e.g. `<Ctrl><Mod1><Mod2>KP_7`.  Modifier
//! names are case-insensitive, key names are X keysym names.

use std::fmt;
use std::ops::BitOr;

/// An X keysym (a symbolic key, independent of the physical keyboard).
pub type Keysym = u32;

/// A server-specific physical key number.
pub type Keycode = u8;

/// A set of X modifier bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModMask(pub u16);

impl ModMask {
    pub const NONE: ModMask = ModMask(0);
    pub const SHIFT: ModMask = ModMask(1 << 0);
    pub const LOCK: ModMask = ModMask(1 << 1);
    pub const CONTROL: ModMask = ModMask(1 << 2);
    pub const MOD1: ModMask = ModMask(1 << 3);
    pub const MOD2: ModMask = ModMask(1 << 4);
    pub const MOD3: ModMask = ModMask(1 << 5);
    pub const MOD4: ModMask = ModMask(1 << 6);
    pub const MOD5: ModMask = ModMask(1 << 7);

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, other: ModMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ModMask {
    type Output = ModMask;

    fn bitor(self, rhs: ModMask) -> ModMask {
        ModMask(self.0 | rhs.0)
    }
}

impl fmt::Display for ModMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ModMask, &str); 8] = [
            (ModMask::SHIFT, "Shift"),
            (ModMask::LOCK, "Lock"),
            (ModMask::CONTROL, "Ctrl"),
            (ModMask::MOD1, "Mod1"),
            (ModMask::MOD2, "Mod2"),
            (ModMask::MOD3, "Mod3"),
            (ModMask::MOD4, "Mod4"),
            (ModMask::MOD5, "Mod5"),
        ];
        for (mask, name) in NAMES {
            if self.contains(mask) {
                write!(f, "<{}>", name)?;
            }
        }
        Ok(())
    }
}

/// A keysym together with the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accelerator {
    pub keysym: Keysym,
    pub modifiers: ModMask,
}

/// Reasons an accelerator string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unterminated modifier in {0:?}")]
    Unterminated(String),
    #[error("unknown modifier <{0}>")]
    UnknownModifier(String),
    #[error("no key after modifiers in {0:?}")]
    MissingKey(String),
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
}

/// One event drained from the windowing connection.
///
/// Only key presses carry meaning for dispatch; everything else is kept as
/// [`Other`](InputEvent::Other) so a drain can still count it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(Keycode),
    KeyRelease(Keycode),
    Other,
}

/// Parse an accelerator such as `<Ctrl><Mod1>KP_7`.
pub fn parse_accelerator(text: &str) -> Result<Accelerator, KeyParseError> {
    let mut rest = text.trim();
    let mut modifiers = ModMask::NONE;

    while let Some(inner) = rest.strip_prefix('<') {
        let end = inner
            .find('>')
            .ok_or_else(|| KeyParseError::Unterminated(text.to_string()))?;
        modifiers = modifiers | parse_modifier(&inner[..end])?;
        rest = &inner[end + 1..];
    }

    if rest.is_empty() {
        return Err(KeyParseError::MissingKey(text.to_string()));
    }
    let keysym = keysym_from_name(rest).ok_or_else(|| KeyParseError::UnknownKey(rest.to_string()))?;
    Ok(Accelerator { keysym, modifiers })
}

/// Map a modifier token (without angle brackets) to its mask.
///
/// `<Release>` is accepted and ignored: grabs here are always on press.
fn parse_modifier(name: &str) -> Result<ModMask, KeyParseError> {
    let mask = match name.to_ascii_lowercase().as_str() {
        "shift" | "shft" => ModMask::SHIFT,
        "lock" => ModMask::LOCK,
        "control" | "ctrl" | "ctl" | "primary" => ModMask::CONTROL,
        "alt" | "meta" | "mod1" => ModMask::MOD1,
        "mod2" => ModMask::MOD2,
        "mod3" => ModMask::MOD3,
        "super" | "hyper" | "mod4" => ModMask::MOD4,
        "mod5" => ModMask::MOD5,
        "release" => ModMask::NONE,
        _ => return Err(KeyParseError::UnknownModifier(name.to_string())),
    };
    Ok(mask)
}

/// Named keysyms that are not plain ASCII characters.
const NAMED_KEYSYMS: &[(&str, Keysym)] = &[
    ("space", 0x0020),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Escape", 0xff1b),
    ("Delete", 0xffff),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Insert", 0xff63),
    ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95),
    ("KP_Left", 0xff96),
    ("KP_Up", 0xff97),
    ("KP_Right", 0xff98),
    ("KP_Down", 0xff99),
    ("KP_Prior", 0xff9a),
    ("KP_Page_Up", 0xff9a),
    ("KP_Next", 0xff9b),
    ("KP_Page_Down", 0xff9b),
    ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d),
    ("KP_Insert", 0xff9e),
    ("KP_Delete", 0xff9f),
    ("KP_Multiply", 0xffaa),
    ("KP_Add", 0xffab),
    ("KP_Subtract", 0xffad),
    ("KP_Decimal", 0xffae),
    ("KP_Divide", 0xffaf),
];

/// Resolve a keysym name: `KP_0`–`KP_9`, `F1`–`F35`, the entries of
/// [`NAMED_KEYSYMS`], or a single ASCII letter/digit.
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    if let Some(&(_, sym)) = NAMED_KEYSYMS.iter().find(|(n, _)| *n == name) {
        return Some(sym);
    }
    if let Some(digit) = name.strip_prefix("KP_") {
        return match digit.as_bytes() {
            [d @ b'0'..=b'9'] => Some(0xffb0 + (d - b'0') as Keysym),
            _ => None,
        };
    }
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=35).contains(&n).then(|| 0xffbe + n - 1);
    }
    match name.as_bytes() {
        // Letters bind by their lower-case keysym, as GTK does.
        [c] if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase() as Keysym),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_keypad_binding() {
        let acc = parse_accelerator("<Ctrl><Mod1><Mod2>KP_7").unwrap();
        assert_eq!(acc.keysym, 0xffb7);
        assert_eq!(acc.modifiers, ModMask::CONTROL | ModMask::MOD1 | ModMask::MOD2);
    }

    #[test]
    fn modifier_names_are_case_insensitive_aliases() {
        let a = parse_accelerator("<control><ALT>KP_1").unwrap();
        let b = parse_accelerator("<Ctrl><Mod1>KP_1").unwrap();
        assert_eq!(a, b);
        let s = parse_accelerator("<Super>Left").unwrap();
        assert_eq!(s.modifiers, ModMask::MOD4);
        assert_eq!(s.keysym, 0xff51);
    }

    #[test]
    fn release_modifier_is_ignored() {
        let acc = parse_accelerator("<Release>KP_5").unwrap();
        assert_eq!(acc.modifiers, ModMask::NONE);
    }

    #[test]
    fn bare_key_has_no_modifiers() {
        let acc = parse_accelerator("F12").unwrap();
        assert_eq!(acc.keysym, 0xffc9);
        assert_eq!(acc.modifiers, ModMask::NONE);
    }

    #[test]
    fn letters_use_lower_case_keysyms() {
        assert_eq!(keysym_from_name("A"), Some(0x61));
        assert_eq!(keysym_from_name("a"), Some(0x61));
        assert_eq!(keysym_from_name("7"), Some(0x37));
    }

    #[test]
    fn unknown_key_name_is_reported() {
        assert_eq!(
            parse_accelerator("<Ctrl>KP_77"),
            Err(KeyParseError::UnknownKey("KP_77".into()))
        );
        assert_eq!(keysym_from_name("F0"), None);
        assert_eq!(keysym_from_name("F36"), None);
    }

    #[test]
    fn unknown_modifier_is_reported() {
        assert_eq!(
            parse_accelerator("<Hyperdrive>KP_1"),
            Err(KeyParseError::UnknownModifier("Hyperdrive".into()))
        );
    }

    #[test]
    fn unterminated_and_missing_key_are_reported() {
        assert!(matches!(
            parse_accelerator("<Ctrl"),
            Err(KeyParseError::Unterminated(_))
        ));
        assert!(matches!(
            parse_accelerator("<Ctrl><Mod1>"),
            Err(KeyParseError::MissingKey(_))
        ));
    }

    #[test]
    fn mask_display_lists_modifiers() {
        let m = ModMask::CONTROL | ModMask::MOD1 | ModMask::MOD2;
        assert_eq!(m.to_string(), "<Ctrl><Mod1><Mod2>");
        assert_eq!(m.bits(), 4 | 8 | 16);
    }
}

//! Key classification for input elements.
//!
//! Keys arrive either as DOM key codes (`Key::from_code`) or as normalized key
//! ids such as `"up"`, `"escape"`, `"ctrl"` (`Key::from_id`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Tab,
    Enter,
    Shift,
    Ctrl,
    Alt,
    Escape,
    Left,
    Up,
    Right,
    Down,
    Delete,
    LeftOs,
    RightOs,
    Select,
    Char(char),
    Other(u32),
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            16 => Key::Shift,
            17 => Key::Ctrl,
            18 => Key::Alt,
            27 => Key::Escape,
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            46 => Key::Delete,
            91 => Key::LeftOs,
            92 => Key::RightOs,
            93 => Key::Select,
            48..=57 | 65..=90 => char::from_u32(code)
                .map(|ch| Key::Char(ch.to_ascii_lowercase()))
                .unwrap_or(Key::Other(code)),
            _ => Key::Other(code),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Shift => 16,
            Key::Ctrl => 17,
            Key::Alt => 18,
            Key::Escape => 27,
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
            Key::Delete => 46,
            Key::LeftOs => 91,
            Key::RightOs => 92,
            Key::Select => 93,
            Key::Char(ch) => ch.to_ascii_uppercase() as u32,
            Key::Other(code) => code,
        }
    }

    /// Parse a normalized key id. Single characters map to `Key::Char`;
    /// unknown ids return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        let key = match id {
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "enter" | "return" => Key::Enter,
            "shift" => Key::Shift,
            "ctrl" | "control" => Key::Ctrl,
            "alt" | "option" => Key::Alt,
            "escape" | "esc" => Key::Escape,
            "left" => Key::Left,
            "up" => Key::Up,
            "right" => Key::Right,
            "down" => Key::Down,
            "delete" => Key::Delete,
            "super" | "meta" | "leftOs" => Key::LeftOs,
            "rightOs" => Key::RightOs,
            "select" | "contextMenu" => Key::Select,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = id.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Char(ch)
            }
        };
        Some(key)
    }

    /// Keys that neither edit the text nor trigger a new suggestion request
    /// while the user is typing.
    pub fn is_ignored_while_typing(self) -> bool {
        matches!(
            self,
            Key::Down
                | Key::Up
                | Key::Ctrl
                | Key::Alt
                | Key::Shift
                | Key::Left
                | Key::Right
                | Key::LeftOs
                | Key::RightOs
                | Key::Select
        )
    }

    pub fn is_navigation(self) -> bool {
        matches!(self, Key::Up | Key::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    #[test]
    fn dom_codes_map_to_named_keys() {
        assert_eq!(Key::from_code(38), Key::Up);
        assert_eq!(Key::from_code(40), Key::Down);
        assert_eq!(Key::from_code(27), Key::Escape);
        assert_eq!(Key::from_code(80), Key::Char('p'));
        assert_eq!(Key::from_code(112), Key::Other(112));
        assert_eq!(Key::from_code(Key::Select.code()), Key::Select);
    }

    #[test]
    fn key_ids_parse() {
        assert_eq!(Key::from_id("escape"), Some(Key::Escape));
        assert_eq!(Key::from_id("ctrl"), Some(Key::Ctrl));
        assert_eq!(Key::from_id("z"), Some(Key::Char('z')));
        assert_eq!(Key::from_id("ctrl+z"), None);
        assert_eq!(Key::from_id(""), None);
    }

    #[test]
    fn modifiers_and_arrows_are_ignored_while_typing() {
        for key in [
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
            Key::Shift,
            Key::Ctrl,
            Key::Alt,
            Key::LeftOs,
            Key::RightOs,
            Key::Select,
        ] {
            assert!(key.is_ignored_while_typing(), "{key:?}");
        }
        for key in [Key::Backspace, Key::Delete, Key::Char('a'), Key::Escape, Key::Enter] {
            assert!(!key.is_ignored_while_typing(), "{key:?}");
        }
    }
}

//! Extra-keys row with sticky one-shot modifiers.

use actions::ExtraKey;

/// CTRL and ALT latch until the next character or extra key, then clear.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtraKeys {
    ctrl: bool,
    alt: bool,
}

impl ExtraKeys {
    pub fn ctrl(&self) -> bool {
        self.ctrl
    }

    pub fn alt(&self) -> bool {
        self.alt
    }

    /// Press a key on the row. Modifiers toggle and return `None`; anything
    /// else returns the bytes to send and clears both modifiers.
    pub fn press(&mut self, key: ExtraKey) -> Option<Vec<u8>> {
        let bytes: &[u8] = match key {
            ExtraKey::Ctrl => {
                self.ctrl = !self.ctrl;
                return None;
            }
            ExtraKey::Alt => {
                self.alt = !self.alt;
                return None;
            }
            ExtraKey::Esc => b"\x1b",
            ExtraKey::Tab => b"\t",
            ExtraKey::Dash => b"-",
            ExtraKey::Slash => b"/",
            ExtraKey::Pipe => b"|",
            ExtraKey::Up => b"\x1b[A",
            ExtraKey::Down => b"\x1b[B",
            ExtraKey::Left => b"\x1b[D",
            ExtraKey::Right => b"\x1b[C",
        };
        self.clear();
        Some(bytes.to_vec())
    }

    /// Apply latched modifiers to the first character of typed input.
    pub fn apply(&mut self, input: &[u8]) -> Vec<u8> {
        if !self.ctrl && !self.alt {
            return input.to_vec();
        }
        let Some((&first, rest)) = input.split_first() else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(input.len() + 1);
        if self.alt {
            out.push(0x1b);
        }
        out.push(if self.ctrl { control_byte(first) } else { first });
        out.extend_from_slice(rest);
        self.clear();
        out
    }

    pub fn clear(&mut self) {
        self.ctrl = false;
        self.alt = false;
    }

    /// The row as shown under the terminal, latched modifiers bracketed.
    pub fn render_row(&self) -> String {
        ExtraKey::ROW
            .iter()
            .map(|&key| {
                let latched =
                    (key == ExtraKey::Ctrl && self.ctrl) || (key == ExtraKey::Alt && self.alt);
                if latched {
                    format!("[{}]", key.label())
                } else {
                    key.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// CTRL+key: letters and `@[\]^_` map into the C0 range, `?` to DEL.
fn control_byte(byte: u8) -> u8 {
    match byte {
        b'a'..=b'z' => byte - b'a' + 1,
        b'@'..=b'_' => byte - b'@',
        b' ' => 0,
        b'?' => 0x7f,
        other => other,
    }
}

//! Joypad register (0xFF00).
//!
//! The eight buttons sit on a 2x4 matrix. The guest selects the direction
//! group with bit 4 and the action group with bit 5 (both active low) and
//! reads the selected lines back in bits 0-3, again 0 = pressed.

/// Buttons in matrix order: the first four are the direction group, the
/// last four the action group, each in line order (bit 0 to bit 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameBoyButton {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl GameBoyButton {
    /// Line bit within the button's group
    const fn line(self) -> u8 {
        1 << (self as u8 % 4)
    }

    const fn is_action(self) -> bool {
        self as u8 >= 4
    }
}

const SELECT_DIRECTIONS: u8 = 0x10;
const SELECT_ACTIONS: u8 = 0x20;

#[derive(Debug, Clone, Copy)]
pub struct Joypad {
    /// Select bits (4 and 5) as last written
    select: u8,
    /// Released lines per group, 1 = released
    directions: u8,
    actions: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub const fn new() -> Self {
        Self {
            select: SELECT_DIRECTIONS | SELECT_ACTIONS,
            directions: 0x0F,
            actions: 0x0F,
        }
    }

    /// Update a button. Returns true when it goes from released to pressed.
    pub fn set_button(&mut self, button: GameBoyButton, pressed: bool) -> bool {
        let group = if button.is_action() {
            &mut self.actions
        } else {
            &mut self.directions
        };
        let line = button.line();
        let was_pressed = *group & line == 0;
        if pressed {
            *group &= !line;
        } else {
            *group |= line;
        }
        pressed && !was_pressed
    }

    /// 0xFF00 as the guest sees it; unused bits 6-7 read as 1
    pub const fn read(&self) -> u8 {
        let mut lines = 0x0F;
        if self.select & SELECT_DIRECTIONS == 0 {
            lines &= self.directions;
        }
        if self.select & SELECT_ACTIONS == 0 {
            lines &= self.actions;
        }
        0xC0 | self.select | lines
    }

    /// Only the select bits are writable
    pub fn write(&mut self, value: u8) {
        self.select = value & (SELECT_DIRECTIONS | SELECT_ACTIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(GameBoyButton::Right, 0x20, 0x0E)]
    #[test_case(GameBoyButton::Down, 0x20, 0x07)]
    #[test_case(GameBoyButton::A, 0x10, 0x0E)]
    #[test_case(GameBoyButton::Start, 0x10, 0x07)]
    #[test_case(GameBoyButton::Start, 0x20, 0x0F ; "other group unselected")]
    fn pressed_line_reads_low(button: GameBoyButton, select: u8, lines: u8) {
        let mut joypad = Joypad::new();
        joypad.write(select);
        joypad.set_button(button, true);
        assert_eq!(joypad.read() & 0x0F, lines);
    }

    #[test]
    fn both_groups_selected_merge_lines() {
        let mut joypad = Joypad::new();
        joypad.write(0x00);
        joypad.set_button(GameBoyButton::Left, true);
        joypad.set_button(GameBoyButton::Select, true);
        assert_eq!(joypad.read(), 0xC0 | 0b1001);
    }

    #[test]
    fn press_edge_is_reported_once() {
        let mut joypad = Joypad::new();
        assert!(joypad.set_button(GameBoyButton::Up, true));
        assert!(!joypad.set_button(GameBoyButton::Up, true));
        assert!(!joypad.set_button(GameBoyButton::Up, false));
        assert!(joypad.set_button(GameBoyButton::Up, true));
    }

    #[test]
    fn write_keeps_only_select_bits() {
        let mut joypad = Joypad::new();
        joypad.write(0xFF);
        assert_eq!(joypad.read(), 0xFF);
    }
}

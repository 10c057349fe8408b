//! 键盘输入状态
//!
//! 以 256 个虚拟键码为索引记录每个键是否按下。
//! 宿主把 winit 的物理按键翻译成虚拟键码后调用 `key_down` / `key_up`。

use winit::keyboard::KeyCode;

/// Escape 的虚拟键码
pub const VK_ESCAPE: u8 = 0x1B;

/// 键盘状态
#[derive(Debug, Clone)]
pub struct InputState {
    keys: [bool; 256],
}

impl InputState {
    /// 所有键都处于松开状态
    pub fn new() -> Self {
        Self { keys: [false; 256] }
    }

    pub fn key_down(&mut self, key: u8) {
        self.keys[key as usize] = true;
    }

    pub fn key_up(&mut self, key: u8) {
        self.keys[key as usize] = false;
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.keys[key as usize]
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// winit 物理按键到 Windows 虚拟键码的映射
///
/// 只覆盖常用键；没有对应虚拟键码的按键返回 `None`。
pub fn virtual_key(code: KeyCode) -> Option<u8> {
    let vk = match code {
        KeyCode::Backspace => 0x08,
        KeyCode::Tab => 0x09,
        KeyCode::Enter | KeyCode::NumpadEnter => 0x0D,
        KeyCode::ShiftLeft => 0xA0,
        KeyCode::ShiftRight => 0xA1,
        KeyCode::ControlLeft => 0xA2,
        KeyCode::ControlRight => 0xA3,
        KeyCode::AltLeft => 0xA4,
        KeyCode::AltRight => 0xA5,
        KeyCode::Pause => 0x13,
        KeyCode::CapsLock => 0x14,
        KeyCode::Escape => VK_ESCAPE,
        KeyCode::Space => 0x20,
        KeyCode::PageUp => 0x21,
        KeyCode::PageDown => 0x22,
        KeyCode::End => 0x23,
        KeyCode::Home => 0x24,
        KeyCode::ArrowLeft => 0x25,
        KeyCode::ArrowUp => 0x26,
        KeyCode::ArrowRight => 0x27,
        KeyCode::ArrowDown => 0x28,
        KeyCode::Insert => 0x2D,
        KeyCode::Delete => 0x2E,
        KeyCode::Digit0 => b'0',
        KeyCode::Digit1 => b'1',
        KeyCode::Digit2 => b'2',
        KeyCode::Digit3 => b'3',
        KeyCode::Digit4 => b'4',
        KeyCode::Digit5 => b'5',
        KeyCode::Digit6 => b'6',
        KeyCode::Digit7 => b'7',
        KeyCode::Digit8 => b'8',
        KeyCode::Digit9 => b'9',
        KeyCode::KeyA => b'A',
        KeyCode::KeyB => b'B',
        KeyCode::KeyC => b'C',
        KeyCode::KeyD => b'D',
        KeyCode::KeyE => b'E',
        KeyCode::KeyF => b'F',
        KeyCode::KeyG => b'G',
        KeyCode::KeyH => b'H',
        KeyCode::KeyI => b'I',
        KeyCode::KeyJ => b'J',
        KeyCode::KeyK => b'K',
        KeyCode::KeyL => b'L',
        KeyCode::KeyM => b'M',
        KeyCode::KeyN => b'N',
        KeyCode::KeyO => b'O',
        KeyCode::KeyP => b'P',
        KeyCode::KeyQ => b'Q',
        KeyCode::KeyR => b'R',
        KeyCode::KeyS => b'S',
        KeyCode::KeyT => b'T',
        KeyCode::KeyU => b'U',
        KeyCode::KeyV => b'V',
        KeyCode::KeyW => b'W',
        KeyCode::KeyX => b'X',
        KeyCode::KeyY => b'Y',
        KeyCode::KeyZ => b'Z',
        KeyCode::F1 => 0x70,
        KeyCode::F2 => 0x71,
        KeyCode::F3 => 0x72,
        KeyCode::F4 => 0x73,
        KeyCode::F5 => 0x74,
        KeyCode::F6 => 0x75,
        KeyCode::F7 => 0x76,
        KeyCode::F8 => 0x77,
        KeyCode::F9 => 0x78,
        KeyCode::F10 => 0x79,
        KeyCode::F11 => 0x7A,
        KeyCode::F12 => 0x7B,
        _ => return None,
    };
    Some(vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = InputState::new();
        assert!(!input.is_key_down(VK_ESCAPE));

        input.key_down(VK_ESCAPE);
        assert!(input.is_key_down(VK_ESCAPE));
        assert!(!input.is_key_down(b'A'));

        input.key_up(VK_ESCAPE);
        assert!(!input.is_key_down(VK_ESCAPE));
    }

    #[test]
    fn test_full_key_range() {
        let mut input = InputState::default();
        input.key_down(255);
        input.key_down(0);
        assert!(input.is_key_down(255));
        assert!(input.is_key_down(0));
    }

    #[test]
    fn test_virtual_key_mapping() {
        assert_eq!(virtual_key(KeyCode::Escape), Some(VK_ESCAPE));
        assert_eq!(virtual_key(KeyCode::KeyW), Some(0x57));
        assert_eq!(virtual_key(KeyCode::Digit0), Some(0x30));
        assert_eq!(virtual_key(KeyCode::F1), Some(0x70));
        assert_eq!(virtual_key(KeyCode::Fn), None);
    }
}

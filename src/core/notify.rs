//! 用户提示
//!
//! 初始化失败时需要告诉用户发生了什么。Windows 上弹出消息框，
//! 其他平台只写日志。

use tracing::error;

/// 向用户显示一条提示
pub trait Notifier {
    fn notify(&self, caption: &str, text: &str);
}

/// 只写日志的提示器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, caption: &str, text: &str) {
        error!(caption, "{text}");
    }
}

/// 消息框提示器，同时写日志
#[cfg(target_os = "windows")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageBoxNotifier;

#[cfg(target_os = "windows")]
impl Notifier for MessageBoxNotifier {
    fn notify(&self, caption: &str, text: &str) {
        use windows::core::HSTRING;
        use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_OK};

        LogNotifier.notify(caption, text);
        unsafe {
            MessageBoxW(
                None,
                &HSTRING::from(text),
                &HSTRING::from(caption),
                MB_OK,
            );
        }
    }
}

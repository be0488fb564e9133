//! Host platform helpers

use crate::types::Key;
use std::thread;
use std::time::Duration;

/// Operating system family of the machine running the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "linux") {
            HostOs::Linux
        } else {
            HostOs::Other
        }
    }
}

/// Modifier used for copy/paste/cut/select-all shortcuts
pub fn modifier_for_copy_paste(os: HostOs) -> Key {
    match os {
        HostOs::MacOs => Key::Meta,
        HostOs::Windows | HostOs::Linux | HostOs::Other => Key::Control,
    }
}

/// Block the calling thread; zero is a no-op
pub fn sleep_ms(milliseconds: u64) {
    if milliseconds == 0 {
        return;
    }
    thread::sleep(Duration::from_millis(milliseconds));
}

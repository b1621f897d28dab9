//! Post-login screens: the "Welcome" hand-off and the desktop itself.

use crate::nav::Key;
use crate::screen::{escape, Outcome, Screen};

/// 12-hour clock text as shown in the taskbar.
pub fn clock_text(hours: u32, minutes: u32) -> String {
    let ampm = if hours >= 12 { "PM" } else { "AM" };
    let h12 = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", h12, minutes, ampm)
}

pub struct DesktopScreen {
    user: String,
    welcome: bool,
    clock: String,
    start_open: bool,
}

impl DesktopScreen {
    pub fn welcome(user: &str) -> Self {
        DesktopScreen {
            user: user.to_string(),
            welcome: true,
            clock: String::new(),
            start_open: false,
        }
    }

    pub fn desktop(user: &str) -> Self {
        DesktopScreen {
            welcome: false,
            ..Self::welcome(user)
        }
    }

    pub fn set_clock(&mut self, text: String) -> bool {
        if self.clock == text {
            return false;
        }
        self.clock = text;
        true
    }

    pub fn is_start_open(&self) -> bool {
        self.start_open
    }
}

impl Screen for DesktopScreen {
    fn handle_key(&mut self, key: Key) -> Outcome {
        if self.welcome {
            return Outcome::Ignored;
        }
        match key {
            Key::Enter if !self.start_open => {
                self.start_open = true;
                Outcome::Redraw
            }
            Key::Escape if self.start_open => {
                self.start_open = false;
                Outcome::Redraw
            }
            _ => Outcome::Ignored,
        }
    }

    fn render(&self) -> String {
        if self.welcome {
            return format!(
                r#"<div class="welcome"><div class="welcome-spinner"></div><div class="welcome-text">Welcome</div><div class="welcome-user">{}</div></div>"#,
                escape(&self.user)
            );
        }
        let mut out = String::from(r#"<div class="desktop"><div class="desktop-area"></div>"#);
        if self.start_open {
            out.push_str(&format!(
                r#"<div class="start-menu"><div class="start-user">{}</div><div class="start-item">Shut down</div></div>"#,
                escape(&self.user)
            ));
        }
        out.push_str(&format!(
            r#"<div class="taskbar"><div class="start-button">Start</div><div class="taskbar-spacer"></div><div class="taskbar-clock">{}</div></div>"#,
            escape(&self.clock)
        ));
        out.push_str("</div>");
        out
    }
}

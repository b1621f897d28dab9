//! Windows-style login: user tiles and a masked password box.

use crate::config::UserSpec;
use crate::nav::{self, Axis, Key};
use crate::screen::{escape, Outcome, Screen};

const MAX_PASSWORD: usize = 64;

pub struct LoginScreen {
    users: Vec<UserSpec>,
    selected: usize,
    password: String,
    status: Option<String>,
}

impl LoginScreen {
    pub fn new(users: Vec<UserSpec>) -> Self {
        LoginScreen {
            users,
            selected: 0,
            password: String::new(),
            status: None,
        }
    }

    pub fn selected_user(&self) -> Option<&UserSpec> {
        self.users.get(self.selected)
    }

    pub fn password_len(&self) -> usize {
        self.password.chars().count()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn submit(&mut self) -> Outcome {
        let Some(user) = self.users.get(self.selected) else {
            return Outcome::Ignored;
        };
        let accepted = match &user.password {
            None => true,
            Some(expected) => *expected == self.password,
        };
        self.password.clear();
        if accepted {
            self.status = None;
            Outcome::Submit
        } else {
            tracing::debug!("rejected password for {}", user.name);
            self.status = Some("The password is incorrect. Try again.".to_string());
            Outcome::Redraw
        }
    }
}

impl Screen for LoginScreen {
    fn handle_key(&mut self, key: Key) -> Outcome {
        match key {
            Key::Left | Key::Right => {
                let next = nav::step_on(Axis::Horizontal, self.selected, self.users.len(), key);
                if next == self.selected {
                    return Outcome::Ignored;
                }
                self.selected = next;
                self.password.clear();
                self.status = None;
                Outcome::Redraw
            }
            Key::Char(c) => {
                if self.password.chars().count() >= MAX_PASSWORD {
                    return Outcome::Ignored;
                }
                self.password.push(c);
                self.status = None;
                Outcome::Redraw
            }
            Key::Backspace => match self.password.pop() {
                Some(_) => Outcome::Redraw,
                None => Outcome::Ignored,
            },
            Key::Escape => {
                self.password.clear();
                self.status = None;
                Outcome::Redraw
            }
            Key::Enter => self.submit(),
            _ => Outcome::Ignored,
        }
    }

    fn render(&self) -> String {
        let mut out = String::from(r#"<div class="login"><div class="login-users">"#);
        for (i, user) in self.users.iter().enumerate() {
            let class = if i == self.selected {
                "login-user selected"
            } else {
                "login-user"
            };
            let avatar = user
                .avatar
                .as_deref()
                .map(|src| format!(r#"<img class="login-avatar" src="{}" alt="">"#, escape(src)))
                .unwrap_or_else(|| r#"<div class="login-avatar"></div>"#.to_string());
            out.push_str(&format!(
                r#"<div class="{}">{}<div class="login-name">{}</div></div>"#,
                class,
                avatar,
                escape(&user.name)
            ));
        }
        out.push_str("</div>");

        let needs_password = self
            .selected_user()
            .map(|u| u.password.is_some())
            .unwrap_or(false);
        if needs_password {
            out.push_str(&format!(
                r#"<div class="login-password"><span class="login-field">{}</span><span class="login-arrow">➔</span></div>"#,
                "•".repeat(self.password_len())
            ));
        } else {
            out.push_str(r#"<div class="login-hint">Press Enter to sign in</div>"#);
        }
        if let Some(status) = &self.status {
            out.push_str(&format!(r#"<div class="login-status">{}</div>"#, escape(status)));
        }
        out.push_str("</div>");
        out
    }
}

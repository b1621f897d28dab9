//! Clover-style OS picker: a row of boot entries over a row of actions,
//! with a theme chooser behind the Options action.

use crate::config::{ActionKind, Entry, ThemeList, ThemeSpec};
use crate::nav::{self, Axis, Key, RowCursor};
use crate::screen::{escape, Countdown, Outcome, Screen};

const ENTRY_ROW: usize = 0;
const ACTION_ROW: usize = 1;

pub struct CloverPicker {
    themes: ThemeList,
    theme: usize,
    cursor: RowCursor,
    countdown: Countdown,
    /// Highlighted row of the theme modal when it is open.
    modal: Option<usize>,
    message: Option<String>,
}

impl CloverPicker {
    pub fn new(themes: ThemeList, theme: usize, timeout: u32) -> Self {
        let theme = if theme < themes.len() { theme } else { themes.default_index() };
        let lens = Self::row_lens(themes.get(theme));
        let timeout = if lens[ENTRY_ROW] == 0 { 0 } else { timeout };
        CloverPicker {
            themes,
            theme,
            cursor: RowCursor::new(Axis::Horizontal, &lens),
            countdown: Countdown::new(timeout),
            modal: None,
            message: None,
        }
    }

    fn row_lens(theme: Option<&ThemeSpec>) -> [usize; 2] {
        theme
            .map(|t| [t.entries.len(), t.actions.len()])
            .unwrap_or([0, 0])
    }

    fn current(&self) -> Option<&ThemeSpec> {
        self.themes.get(self.theme)
    }

    pub fn theme_index(&self) -> usize {
        self.theme
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn active_row(&self) -> usize {
        self.cursor.row()
    }

    pub fn selected(&self) -> usize {
        self.cursor.selected()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.current()?.entries.get(index)
    }

    fn apply_theme(&mut self, index: usize) {
        if index >= self.themes.len() {
            return;
        }
        self.theme = index;
        self.cursor.resize(&Self::row_lens(self.current()));
        tracing::debug!("picker theme -> {}", self.current().map_or("", |t| t.name.as_str()));
    }

    fn handle_modal(&mut self, highlighted: usize, key: Key) -> Outcome {
        match key {
            Key::Up | Key::Down => {
                self.modal = Some(nav::step_on(Axis::Vertical, highlighted, self.themes.len(), key));
            }
            Key::Enter => {
                self.modal = None;
                self.apply_theme(highlighted);
            }
            Key::Escape => self.modal = None,
            _ => return Outcome::Ignored,
        }
        Outcome::Redraw
    }

    fn confirm(&mut self) -> Outcome {
        let selected = self.cursor.selected();
        if self.cursor.row() == ENTRY_ROW {
            return match self.entry(selected) {
                Some(_) => Outcome::Boot(selected),
                None => Outcome::Ignored,
            };
        }
        let Some(kind) = self.current().and_then(|t| t.actions.get(selected)).map(|a| a.action) else {
            return Outcome::Ignored;
        };
        match kind {
            ActionKind::Options => {
                self.modal = Some(self.theme);
                Outcome::Redraw
            }
            ActionKind::Shutdown | ActionKind::Restart => Outcome::Exit,
            ActionKind::About => {
                self.message = Some(format!(
                    "Clover boot picker, theme \"{}\"",
                    self.current().map_or("", |t| t.name.as_str())
                ));
                Outcome::Redraw
            }
            ActionKind::Help => {
                self.message = Some(
                    "←/→ select, ↑/↓ switch row, Enter boot, Esc exit".to_string(),
                );
                Outcome::Redraw
            }
            ActionKind::Unknown => Outcome::Ignored,
        }
    }

    fn icon_html(&self, icon: Option<&str>, label: &str, selected: bool, class: &str) -> String {
        let state = if selected { " selected" } else { "" };
        let img = match icon {
            Some(src) => format!(r#"<img src="{}" alt="{}">"#, escape(src), escape(label)),
            None => format!(r#"<span class="icon-fallback">{}</span>"#, escape(label)),
        };
        format!(r#"<div class="{}{}">{}</div>"#, class, state, img)
    }

    fn render_modal(&self, highlighted: usize) -> String {
        let mut out = String::from(r#"<div class="picker-modal"><div class="picker-modal-title">Themes</div><ul>"#);
        for (i, theme) in self.themes.themes().iter().enumerate() {
            let mut classes = Vec::new();
            if i == highlighted {
                classes.push("selected");
            }
            if i == self.theme {
                classes.push("current");
            }
            out.push_str(&format!(
                r#"<li class="{}">{}</li>"#,
                classes.join(" "),
                escape(&theme.name)
            ));
        }
        out.push_str("</ul></div>");
        out
    }
}

impl Screen for CloverPicker {
    fn handle_key(&mut self, key: Key) -> Outcome {
        let stopped = self.countdown.stop();
        if let Some(highlighted) = self.modal {
            return self.handle_modal(highlighted, key);
        }
        self.message = None;
        let outcome = match key {
            k if k.is_arrow() => {
                self.cursor.handle(k);
                Outcome::Redraw
            }
            Key::Enter => self.confirm(),
            Key::Escape => Outcome::Exit,
            _ => Outcome::Ignored,
        };
        if outcome == Outcome::Ignored && stopped {
            Outcome::Redraw
        } else {
            outcome
        }
    }

    fn tick(&mut self) -> Outcome {
        if self.countdown.tick() {
            Outcome::Boot(self.cursor.selected_in(ENTRY_ROW))
        } else if self.countdown.is_active() {
            Outcome::Redraw
        } else {
            Outcome::Ignored
        }
    }

    fn render(&self) -> String {
        let Some(theme) = self.current() else {
            return r#"<div class="picker"><div class="picker-status">No themes</div></div>"#
                .to_string();
        };
        let style = theme
            .background
            .as_deref()
            .map(|bg| format!(r#" style="background-image:url('{}')""#, escape(bg)))
            .unwrap_or_default();
        let mut out = format!(r#"<div class="picker"{}>"#, style);

        out.push_str(r#"<div class="picker-entries">"#);
        for (i, entry) in theme.entries.iter().enumerate() {
            let selected = self.cursor.row() == ENTRY_ROW && self.cursor.selected_in(ENTRY_ROW) == i;
            out.push_str(&self.icon_html(entry.icon.as_deref(), &entry.title, selected, "picker-entry"));
        }
        out.push_str("</div>");

        let label = match self.cursor.row() {
            ACTION_ROW => theme
                .actions
                .get(self.cursor.selected_in(ACTION_ROW))
                .map(|a| a.title.as_str()),
            _ => theme
                .entries
                .get(self.cursor.selected_in(ENTRY_ROW))
                .map(|e| e.title.as_str()),
        };
        out.push_str(&format!(
            r#"<div class="picker-label">{}</div>"#,
            escape(label.unwrap_or(""))
        ));

        out.push_str(r#"<div class="picker-actions">"#);
        for (i, action) in theme.actions.iter().enumerate() {
            let selected = self.cursor.row() == ACTION_ROW && self.cursor.selected_in(ACTION_ROW) == i;
            out.push_str(&self.icon_html(action.icon.as_deref(), &action.title, selected, "picker-action"));
        }
        out.push_str("</div>");

        if self.countdown.is_active() {
            out.push_str(&format!(
                r#"<div class="picker-countdown">Automatic boot in {} seconds.</div>"#,
                self.countdown.remaining()
            ));
        }
        if let Some(msg) = &self.message {
            out.push_str(&format!(r#"<div class="picker-status">{}</div>"#, escape(msg)));
        }
        if let Some(highlighted) = self.modal {
            out.push_str(&self.render_modal(highlighted));
        }
        out.push_str("</div>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootConfig;

    const CONFIG: &str = r#"{
        "themes": [
            {"name": "Embedded",
             "entries": [{"title": "macOS"}, {"title": "Windows"}, {"title": "Linux"}],
             "actions": [
                {"title": "Options", "action": "options"},
                {"title": "Shut Down", "action": "shutdown"}
             ]},
            {"name": "Tiny", "background": "tiny.png",
             "entries": [{"title": "Only"}],
             "actions": [{"title": "Options", "action": "options"}]}
        ]
    }"#;

    fn picker(timeout: u32) -> CloverPicker {
        let config = BootConfig::from_json(CONFIG).unwrap();
        CloverPicker::new(ThemeList::build(&config, &[]), 0, timeout)
    }

    #[test]
    fn test_rows_and_wrap() {
        let mut p = picker(0);
        p.handle_key(Key::Left);
        assert_eq!(p.selected(), 2);
        p.handle_key(Key::Down);
        assert_eq!(p.active_row(), ACTION_ROW);
        p.handle_key(Key::Right);
        assert_eq!(p.selected(), 1);
        assert_eq!(p.handle_key(Key::Enter), Outcome::Exit);
        p.handle_key(Key::Up);
        assert_eq!(p.active_row(), ENTRY_ROW);
        assert_eq!(p.handle_key(Key::Enter), Outcome::Boot(2));
    }

    #[test]
    fn test_any_key_cancels_countdown() {
        let mut p = picker(3);
        assert_eq!(p.tick(), Outcome::Redraw);
        assert_eq!(p.handle_key(Key::Char('x')), Outcome::Redraw);
        assert!(!p.countdown().is_active());
        assert_eq!(p.tick(), Outcome::Ignored);
    }

    #[test]
    fn test_countdown_boots_entry_row_selection() {
        let mut p = picker(1);
        assert_eq!(p.tick(), Outcome::Boot(0));
    }

    #[test]
    fn test_theme_modal() {
        let mut p = picker(0);
        p.handle_key(Key::Down);
        assert_eq!(p.handle_key(Key::Enter), Outcome::Redraw);
        assert!(p.is_modal_open());
        // arrows stay inside the modal
        p.handle_key(Key::Down);
        assert_eq!(p.active_row(), ACTION_ROW);
        assert!(p.render().contains("picker-modal"));
        p.handle_key(Key::Enter);
        assert!(!p.is_modal_open());
        assert_eq!(p.theme_index(), 1);
        assert_eq!(p.entry(0).unwrap().title, "Only");
        assert_eq!(p.selected(), 0);
        assert!(p.render().contains("tiny.png"));
    }

    #[test]
    fn test_modal_escape_keeps_theme() {
        let mut p = picker(0);
        p.handle_key(Key::Down);
        p.handle_key(Key::Enter);
        p.handle_key(Key::Up);
        assert_eq!(p.handle_key(Key::Escape), Outcome::Redraw);
        assert!(!p.is_modal_open());
        assert_eq!(p.theme_index(), 0);
        assert_eq!(p.handle_key(Key::Escape), Outcome::Exit);
    }
}

use crate::config::Entry;
use crate::nav::{self, Axis, Key};
use crate::screen::{escape, Countdown, Outcome, Screen};

const BOX_WIDTH: usize = 76;
const BOX_ROWS: usize = 12;

/// GRUB-style menu over the active theme's entries.
pub struct BootloaderMenu {
    selected: usize,
    entries: Vec<Entry>,
    countdown: Countdown,
}

impl BootloaderMenu {
    pub fn new(entries: Vec<Entry>, timeout: u32) -> Self {
        let timeout = if entries.is_empty() { 0 } else { timeout };
        BootloaderMenu {
            selected: 0,
            entries,
            countdown: Countdown::new(timeout),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// First entry shown in the box; scrolls so the selection stays visible.
    fn first_visible(&self) -> usize {
        (self.selected + 1).saturating_sub(BOX_ROWS)
    }

    fn title_cell(title: &str) -> String {
        let truncated: String = title.chars().take(BOX_WIDTH - 2).collect();
        format!("{:<width$}", truncated, width = BOX_WIDTH - 1)
    }
}

impl Screen for BootloaderMenu {
    fn handle_key(&mut self, key: Key) -> Outcome {
        match key {
            Key::Up | Key::Down => {
                self.countdown.stop();
                self.selected = nav::step_on(Axis::Vertical, self.selected, self.entries.len(), key);
                Outcome::Redraw
            }
            Key::Enter if !self.entries.is_empty() => {
                self.countdown.stop();
                Outcome::Boot(self.selected)
            }
            _ => {
                if self.countdown.stop() {
                    Outcome::Redraw
                } else {
                    Outcome::Ignored
                }
            }
        }
    }

    fn tick(&mut self) -> Outcome {
        if self.countdown.tick() {
            Outcome::Boot(self.selected)
        } else if self.countdown.is_active() {
            Outcome::Redraw
        } else {
            Outcome::Ignored
        }
    }

    fn render(&self) -> String {
        let border = "─".repeat(BOX_WIDTH);
        let blank = " ".repeat(BOX_WIDTH);
        let mut output = String::from(r#"<pre class="bootloader">"#);

        output.push_str("\n\n\n");
        output.push_str("                            GNU GRUB  version 2.06\n\n");
        output.push_str(&format!(" ┌{}┐\n", border));

        let first = self.first_visible();
        let shown = self.entries.len().saturating_sub(first).min(BOX_ROWS);
        for (i, entry) in self.entries.iter().enumerate().skip(first).take(BOX_ROWS) {
            let cell = escape(&Self::title_cell(&entry.title));
            if i == self.selected {
                output.push_str(&format!(" │<span class=\"selected\">*{}</span>│\n", cell));
            } else {
                output.push_str(&format!(" │ {}│\n", cell));
            }
        }
        for _ in shown..BOX_ROWS + 3 {
            output.push_str(&format!(" │{}│\n", blank));
        }

        output.push_str(&format!(" └{}┘\n\n", border));
        output.push_str("      Use the ▲ and ▼ keys to select which entry is highlighted.\n");
        output.push_str("      Press enter to boot the selected OS.\n\n");
        if self.countdown.is_active() {
            output.push_str(&format!(
                "   The highlighted entry will be executed automatically in {}s.",
                self.countdown.remaining()
            ));
        }
        output.push_str("</pre>");
        output
    }
}

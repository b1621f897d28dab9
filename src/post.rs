//! Award-style power-on self test.

use crate::config::BiosSpec;
use crate::nav::Key;
use crate::screen::{escape, Outcome, Screen};

const MEMORY_STEPS: u32 = 16;

pub struct BiosPost {
    bios: BiosSpec,
    memory_kb: u32,
    step_kb: u32,
    drives_shown: usize,
    done: bool,
}

impl BiosPost {
    pub fn new(bios: BiosSpec) -> Self {
        let step_kb = bios.memory_kb.div_ceil(MEMORY_STEPS).max(1);
        BiosPost {
            bios,
            memory_kb: 0,
            step_kb,
            drives_shown: 0,
            done: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn memory_checked_kb(&self) -> u32 {
        self.memory_kb
    }

    fn finish(&mut self) {
        self.memory_kb = self.bios.memory_kb;
        self.drives_shown = self.bios.drives.len();
        self.done = true;
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.bios.vendor.clone(),
            self.bios.version.clone(),
            String::new(),
            format!("Main Processor : {}", self.bios.cpu),
        ];
        let ok = if self.memory_kb >= self.bios.memory_kb {
            " OK"
        } else {
            ""
        };
        lines.push(format!("Memory Testing : {}K{}", self.memory_kb, ok));
        lines.push(String::new());
        if self.memory_kb >= self.bios.memory_kb {
            lines.push("Award Plug and Play BIOS Extension v1.0A".to_string());
            lines.push("Detecting IDE drives ...".to_string());
            lines.extend(self.bios.drives.iter().take(self.drives_shown).cloned());
        }
        lines
    }
}

impl Screen for BiosPost {
    fn handle_key(&mut self, key: Key) -> Outcome {
        match key {
            Key::Enter | Key::Escape => {
                self.finish();
                Outcome::Complete
            }
            _ => Outcome::Ignored,
        }
    }

    fn tick(&mut self) -> Outcome {
        if self.done {
            return Outcome::Ignored;
        }
        if self.memory_kb < self.bios.memory_kb {
            self.memory_kb = self.memory_kb.saturating_add(self.step_kb).min(self.bios.memory_kb);
        } else if self.drives_shown < self.bios.drives.len() {
            self.drives_shown += 1;
        } else {
            self.done = true;
            return Outcome::Complete;
        }
        Outcome::Redraw
    }

    fn render(&self) -> String {
        let mut out = String::from(r#"<div class="post"><pre class="post-log">"#);
        for line in self.lines() {
            out.push_str(&escape(&line));
            out.push('\n');
        }
        out.push_str("</pre>");
        out.push_str(r#"<div class="post-footer">Press <b>DEL</b> to enter SETUP</div>"#);
        out.push_str("</div>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_bios() -> BiosSpec {
        BiosSpec {
            memory_kb: 1000,
            drives: vec!["Primary Master : DISK".into(), "Primary Slave : None".into()],
            ..BiosSpec::default()
        }
    }

    #[test]
    fn test_counts_memory_then_drives() {
        let mut post = BiosPost::new(small_bios());
        let mut ticks = 0;
        while post.tick() == Outcome::Redraw {
            ticks += 1;
            assert!(ticks < 100);
        }
        // 16 memory steps plus one per drive
        assert_eq!(ticks, 18);
        assert!(post.is_complete());
        assert_eq!(post.memory_checked_kb(), 1000);
        assert_eq!(post.tick(), Outcome::Ignored);
        assert!(post.render().contains("1000K OK"));
        assert!(post.render().contains("Primary Slave : None"));
    }

    #[test]
    fn test_huge_memory_finishes() {
        let mut post = BiosPost::new(BiosSpec {
            memory_kb: u32::MAX,
            drives: Vec::new(),
            ..BiosSpec::default()
        });
        let mut ticks = 0;
        while post.tick() == Outcome::Redraw {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, 16);
        assert_eq!(post.memory_checked_kb(), u32::MAX);
        assert!(post.render().contains(&format!("{}K OK", u32::MAX)));
    }

    #[test]
    fn test_enter_skips() {
        let mut post = BiosPost::new(small_bios());
        post.tick();
        assert!(!post.render().contains("OK"));
        assert_eq!(post.handle_key(Key::Enter), Outcome::Complete);
        assert!(post.is_complete());
        assert_eq!(post.handle_key(Key::Up), Outcome::Ignored);
    }
}

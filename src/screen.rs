use crate::nav::Key;

/// What the driver should do after a screen consumed input or a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Redraw,
    /// Boot the entry at this index of the screen's entry list.
    Boot(usize),
    /// Credentials accepted.
    Submit,
    /// Shut down / leave the simulation.
    Exit,
    /// The screen finished on its own.
    Complete,
}

pub trait Screen {
    fn handle_key(&mut self, key: Key) -> Outcome;
    fn render(&self) -> String;
    fn tick(&mut self) -> Outcome {
        Outcome::Ignored
    }
}

/// One-second countdown shown under boot menus. Zero seconds means none.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    remaining: u32,
    active: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Countdown {
            remaining: seconds,
            active: seconds > 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Returns true exactly once, on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            return true;
        }
        false
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

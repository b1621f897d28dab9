use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Post,
    Bootloader,
    Picker,
    Boot,
    Login,
    LoggingIn,
    Desktop,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Post => "post",
            Phase::Bootloader => "bootloader",
            Phase::Picker => "picker",
            Phase::Boot => "boot",
            Phase::Login => "login",
            Phase::LoggingIn => "logging-in",
            Phase::Desktop => "desktop",
        }
    }

    /// Delay before a phase with a timed exit hands off to the next one.
    /// Phases that finish on their own ticks or on input return `None`.
    pub fn auto_delay(self, timings: &Timings) -> Option<u32> {
        match self {
            Phase::LoggingIn => Some(timings.logging_in_ms),
            _ => None,
        }
    }
}

/// Which screens a page runs, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    #[default]
    Classic,
    Clover,
    LoginOnly,
}

impl Flow {
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Flow::Classic => &[
                Phase::Post,
                Phase::Bootloader,
                Phase::Boot,
                Phase::Login,
                Phase::LoggingIn,
                Phase::Desktop,
            ],
            Flow::Clover => &[Phase::Post, Phase::Picker, Phase::Boot, Phase::Desktop],
            Flow::LoginOnly => &[Phase::Login, Phase::LoggingIn, Phase::Desktop],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub post_tick_ms: u32,
    pub countdown_tick_ms: u32,
    pub boot_frame_ms: u32,
    pub boot_frames: u32,
    pub logging_in_ms: u32,
    pub clock_tick_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            post_tick_ms: 120,
            countdown_tick_ms: 1000,
            boot_frame_ms: 80,
            boot_frames: 40,
            logging_in_ms: 2500,
            clock_tick_ms: 1000,
        }
    }
}

/// Position within a [`Flow`]. Only ever moves forward.
#[derive(Clone, Debug)]
pub struct Sequence {
    flow: Flow,
    pos: usize,
}

impl Sequence {
    pub fn new(flow: Flow) -> Self {
        Sequence { flow, pos: 0 }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn current(&self) -> Phase {
        self.flow.phases()[self.pos]
    }

    pub fn is_terminal(&self) -> bool {
        self.pos + 1 >= self.flow.phases().len()
    }

    pub fn peek_next(&self) -> Option<Phase> {
        self.flow.phases().get(self.pos + 1).copied()
    }

    pub fn advance(&mut self) -> Option<Phase> {
        if self.is_terminal() {
            return None;
        }
        self.pos += 1;
        Some(self.current())
    }

    /// Skip ahead to `phase`. Fails if the phase is behind the current one
    /// or not part of the flow.
    pub fn jump_to(&mut self, phase: Phase) -> bool {
        match self.flow.phases().iter().position(|&p| p == phase) {
            Some(idx) if idx >= self.pos => {
                self.pos = idx;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_runs_to_desktop() {
        let mut seq = Sequence::new(Flow::Classic);
        assert_eq!(seq.current(), Phase::Post);
        let mut seen = vec![seq.current()];
        while let Some(p) = seq.advance() {
            seen.push(p);
        }
        assert_eq!(seen, Flow::Classic.phases());
        assert!(seq.is_terminal());
        assert_eq!(seq.advance(), None);
        assert_eq!(seq.current(), Phase::Desktop);
    }

    #[test]
    fn test_jump_only_forward() {
        let mut seq = Sequence::new(Flow::Clover);
        assert!(seq.jump_to(Phase::Boot));
        assert_eq!(seq.peek_next(), Some(Phase::Desktop));
        assert!(!seq.jump_to(Phase::Picker));
        assert!(!seq.jump_to(Phase::Login));
        assert_eq!(seq.current(), Phase::Boot);
    }

    #[test]
    fn test_timings_partial_json() {
        let t: Timings = serde_json::from_str(r#"{"boot_frames": 3}"#).unwrap();
        assert_eq!(t.boot_frames, 3);
        assert_eq!(t.logging_in_ms, Timings::default().logging_in_ms);
        assert_eq!(Phase::LoggingIn.auto_delay(&t), Some(2500));
        assert_eq!(Phase::Post.auto_delay(&t), None);
    }

    #[test]
    fn test_flow_names() {
        let f: Flow = serde_json::from_str(r#""login-only""#).unwrap();
        assert_eq!(f, Flow::LoginOnly);
    }
}

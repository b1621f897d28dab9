use crate::config::{Entry, EntryKind};
use crate::nav::Key;
use crate::screen::{escape, Outcome, Screen};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Boot splash styles, picked from the entry being booted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Splash {
    /// Apple logo over a progress bar.
    Progress,
    /// "Starting Windows" with animated dots.
    Dots,
    /// Scrolling kernel log.
    Console,
    /// Spinner with the entry title.
    Spinner,
}

impl Splash {
    pub fn for_kind(kind: EntryKind) -> Splash {
        match kind {
            EntryKind::Macos | EntryKind::Recovery => Splash::Progress,
            EntryKind::Windows => Splash::Dots,
            EntryKind::Linux => Splash::Console,
            EntryKind::Other => Splash::Spinner,
        }
    }
}

fn kernel_log(title: &str) -> Vec<String> {
    vec![
        format!("Loading {} ...", title),
        "Loading initial ramdisk ...".to_string(),
        "[    0.000000] Linux version 6.1.0 #1 SMP PREEMPT_DYNAMIC".to_string(),
        "[    0.000000] Command line: root=/dev/sda1 ro quiet".to_string(),
        "[    0.004000] x86/fpu: x87 FPU on board".to_string(),
        "[    0.120000] Memory: 65536K available".to_string(),
        "[    0.310000] ACPI: Core revision 20220331".to_string(),
        "[    0.522000] ahci 0000:00:1f.2: AHCI 0001.0300 32 slots".to_string(),
        "[    0.845000] EXT4-fs (sda1): mounted filesystem with ordered data mode".to_string(),
        "[  OK  ] Started Journal Service.".to_string(),
        "[  OK  ] Reached target Local File Systems.".to_string(),
        "[  OK  ] Started Network Manager.".to_string(),
        "[  OK  ] Reached target Graphical Interface.".to_string(),
    ]
}

pub struct BootAnimation {
    title: String,
    splash: Splash,
    frame: u32,
    frames: u32,
    log: Vec<String>,
}

impl BootAnimation {
    pub fn new(entry: &Entry, frames: u32) -> Self {
        let splash = Splash::for_kind(entry.kind);
        let log = if splash == Splash::Console {
            kernel_log(&entry.title)
        } else {
            Vec::new()
        };
        BootAnimation {
            title: entry.title.clone(),
            splash,
            frame: 0,
            frames: frames.max(1),
            log,
        }
    }

    pub fn splash(&self) -> Splash {
        self.splash
    }

    pub fn progress_percent(&self) -> u32 {
        (self.frame * 100 / self.frames).min(100)
    }

    fn visible_log_lines(&self) -> usize {
        if self.log.is_empty() {
            return 0;
        }
        ((self.frame as usize + 1) * self.log.len()).div_ceil(self.frames as usize).min(self.log.len())
    }
}

impl Screen for BootAnimation {
    fn handle_key(&mut self, _key: Key) -> Outcome {
        Outcome::Ignored
    }

    fn tick(&mut self) -> Outcome {
        if self.frame >= self.frames {
            return Outcome::Ignored;
        }
        self.frame += 1;
        if self.frame >= self.frames {
            Outcome::Complete
        } else {
            Outcome::Redraw
        }
    }

    fn render(&self) -> String {
        match self.splash {
            Splash::Progress => format!(
                r#"<div class="boot boot-progress"><div class="boot-logo"></div><div class="boot-bar"><div class="boot-bar-fill" style="width:{}%"></div></div></div>"#,
                self.progress_percent()
            ),
            Splash::Dots => format!(
                r#"<div class="boot boot-dots"><div class="boot-logo"></div><div class="boot-caption">Starting Windows{}</div></div>"#,
                ".".repeat((self.frame % 4) as usize)
            ),
            Splash::Console => {
                let mut out = String::from(r#"<pre class="boot boot-console">"#);
                for line in self.log.iter().take(self.visible_log_lines()) {
                    out.push_str(&escape(line));
                    out.push('\n');
                }
                out.push_str("</pre>");
                out
            }
            Splash::Spinner => format!(
                r#"<div class="boot boot-spinner"><div class="boot-spin">{}</div><div class="boot-caption">{}</div></div>"#,
                SPINNER[self.frame as usize % SPINNER.len()],
                escape(&self.title)
            ),
        }
    }
}

//! The page driver: runs a [`Flow`] of screens, wires timers and keyboard
//! input to them, and renders into a root element.

use crate::boot::BootAnimation;
use crate::bootloader::BootloaderMenu;
use crate::config::{self, BootConfig, Entry, EntryKind, ThemeList};
use crate::desktop::DesktopScreen;
use crate::dom;
use crate::error::Result;
use crate::logging;
use crate::login::LoginScreen;
use crate::nav::Key;
use crate::phase::{Flow, Phase, Sequence, Timings};
use crate::picker::CloverPicker;
use crate::post::BiosPost;
use crate::screen::{Outcome, Screen};
use crate::timers::TimerSet;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

const HALT_MESSAGE: &str = "It is now safe to turn off your computer.";

/// Page-level options passed to [`BootSim::new`] as JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    pub root: String,
    pub config_url: String,
    pub flow: Flow,
    pub timings: Timings,
    pub log_level: String,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            root: "#boot-root".to_string(),
            config_url: "config.json".to_string(),
            flow: Flow::Classic,
            timings: Timings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SimOptions {
    pub fn from_json(text: &str) -> Result<SimOptions> {
        if text.trim().is_empty() {
            return Ok(SimOptions::default());
        }
        Ok(serde_json::from_str(text)?)
    }
}

enum ActiveScreen {
    Post(BiosPost),
    Bootloader(BootloaderMenu),
    Picker(CloverPicker),
    Boot(BootAnimation),
    Login(LoginScreen),
    Desktop(DesktopScreen),
}

impl ActiveScreen {
    fn as_screen(&mut self) -> &mut dyn Screen {
        match self {
            ActiveScreen::Post(s) => s,
            ActiveScreen::Bootloader(s) => s,
            ActiveScreen::Picker(s) => s,
            ActiveScreen::Boot(s) => s,
            ActiveScreen::Login(s) => s,
            ActiveScreen::Desktop(s) => s,
        }
    }

    fn render(&self) -> String {
        match self {
            ActiveScreen::Post(s) => s.render(),
            ActiveScreen::Bootloader(s) => s.render(),
            ActiveScreen::Picker(s) => s.render(),
            ActiveScreen::Boot(s) => s.render(),
            ActiveScreen::Login(s) => s.render(),
            ActiveScreen::Desktop(s) => s.render(),
        }
    }
}

/// What a phase needs from the timer system while it is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Call [`Simulation::tick`] every `ms`.
    Every(u32),
    /// Call [`Simulation::expire`] once after `ms`.
    After(u32),
}

/// Result of feeding input or time into the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    None,
    Redraw,
    Entered(Phase),
    Halted,
}

/// The boot flow without any browser plumbing.
pub struct Simulation {
    timings: Timings,
    config: BootConfig,
    themes: ThemeList,
    theme: usize,
    seq: Sequence,
    screen: ActiveScreen,
    booted: Option<Entry>,
    user: Option<String>,
    halted: bool,
}

impl Simulation {
    pub fn new(config: BootConfig, themes: ThemeList, flow: Flow, timings: Timings) -> Self {
        let theme = themes.default_index();
        let seq = Sequence::new(flow);
        let mut sim = Simulation {
            timings,
            config,
            themes,
            theme,
            seq,
            // replaced by enter() below
            screen: ActiveScreen::Login(LoginScreen::new(Vec::new())),
            booted: None,
            user: None,
            halted: false,
        };
        sim.enter(sim.seq.current());
        sim
    }

    pub fn phase(&self) -> Phase {
        self.seq.current()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn booted(&self) -> Option<&Entry> {
        self.booted.as_ref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.themes.get(self.theme).map(|t| t.name.as_str())
    }

    pub fn schedule(&self) -> Option<Schedule> {
        if self.halted {
            return None;
        }
        let t = &self.timings;
        // the countdown interval only runs while a countdown is showing
        let counting = match &self.screen {
            ActiveScreen::Bootloader(m) => m.countdown().is_active(),
            ActiveScreen::Picker(p) => p.countdown().is_active(),
            _ => false,
        };
        match self.phase() {
            Phase::Post => Some(Schedule::Every(t.post_tick_ms)),
            Phase::Bootloader | Phase::Picker if counting => {
                Some(Schedule::Every(t.countdown_tick_ms))
            }
            Phase::Boot => Some(Schedule::Every(t.boot_frame_ms)),
            Phase::Desktop => Some(Schedule::Every(t.clock_tick_ms)),
            phase => phase.auto_delay(t).map(Schedule::After),
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Change {
        if self.halted {
            return Change::None;
        }
        let outcome = self.screen.as_screen().handle_key(key);
        tracing::trace!("{:?} in {} -> {:?}", key, self.phase().name(), outcome);
        self.apply(outcome)
    }

    pub fn tick(&mut self) -> Change {
        if self.halted {
            return Change::None;
        }
        let outcome = self.screen.as_screen().tick();
        self.apply(outcome)
    }

    /// A phase's one-shot delay ran out.
    pub fn expire(&mut self) -> Change {
        if self.halted || self.phase().auto_delay(&self.timings).is_none() {
            return Change::None;
        }
        self.advance()
    }

    pub fn set_clock(&mut self, text: String) -> Change {
        match &mut self.screen {
            ActiveScreen::Desktop(d) => {
                if d.set_clock(text) {
                    Change::Redraw
                } else {
                    Change::None
                }
            }
            _ => Change::None,
        }
    }

    pub fn render(&self) -> String {
        if self.halted {
            return format!(r#"<div class="halt">{}</div>"#, HALT_MESSAGE);
        }
        self.screen.render()
    }

    fn apply(&mut self, outcome: Outcome) -> Change {
        match outcome {
            Outcome::Ignored => Change::None,
            Outcome::Redraw => Change::Redraw,
            Outcome::Complete => self.advance(),
            Outcome::Boot(index) => {
                let entry = match &self.screen {
                    ActiveScreen::Bootloader(m) => m.entry(index).cloned(),
                    ActiveScreen::Picker(p) => {
                        self.theme = p.theme_index();
                        p.entry(index).cloned()
                    }
                    _ => None,
                };
                tracing::info!("booting {:?}", entry.as_ref().map(|e| e.title.as_str()));
                self.booted = entry;
                self.advance()
            }
            Outcome::Submit => {
                if let ActiveScreen::Login(l) = &self.screen {
                    self.user = l.selected_user().map(|u| u.name.clone());
                }
                self.advance()
            }
            Outcome::Exit => {
                tracing::info!("halted from {}", self.phase().name());
                self.halted = true;
                Change::Halted
            }
        }
    }

    fn advance(&mut self) -> Change {
        match self.seq.advance() {
            Some(phase) => {
                self.enter(phase);
                Change::Entered(phase)
            }
            None => Change::None,
        }
    }

    fn fallback_entry(&self) -> Entry {
        self.themes
            .get(self.theme)
            .and_then(|t| t.entries.first())
            .cloned()
            .unwrap_or_else(|| Entry {
                title: "Operating System".to_string(),
                icon: None,
                volume: None,
                kind: EntryKind::Other,
            })
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("entering {}", phase.name());
        let user = self.user.clone().unwrap_or_else(|| "User".to_string());
        self.screen = match phase {
            Phase::Post => ActiveScreen::Post(BiosPost::new(self.config.bios.clone())),
            Phase::Bootloader => {
                let entries = self
                    .themes
                    .get(self.theme)
                    .map(|t| t.entries.clone())
                    .unwrap_or_default();
                ActiveScreen::Bootloader(BootloaderMenu::new(entries, self.config.timeout))
            }
            Phase::Picker => ActiveScreen::Picker(CloverPicker::new(
                self.themes.clone(),
                self.theme,
                self.config.timeout,
            )),
            Phase::Boot => {
                let entry = self.booted.clone().unwrap_or_else(|| self.fallback_entry());
                ActiveScreen::Boot(BootAnimation::new(&entry, self.timings.boot_frames))
            }
            Phase::Login => ActiveScreen::Login(LoginScreen::new(self.config.users.clone())),
            Phase::LoggingIn => ActiveScreen::Desktop(DesktopScreen::welcome(&user)),
            Phase::Desktop => ActiveScreen::Desktop(DesktopScreen::desktop(&user)),
        };
    }
}

struct Driver {
    this: Weak<RefCell<Driver>>,
    options: SimOptions,
    sim: Option<Simulation>,
    timers: TimerSet,
    armed: Option<Schedule>,
    root: Option<Element>,
    listener: Option<Closure<dyn FnMut(KeyboardEvent)>>,
}

impl Driver {
    fn with(weak: &Weak<RefCell<Driver>>, f: impl FnOnce(&mut Driver)) {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        match rc.try_borrow_mut() {
            Ok(mut driver) => f(&mut *driver),
            Err(_) => tracing::warn!("driver busy, dropping re-entrant callback"),
        };
    }

    fn mount(&mut self, config: BootConfig, themes: ThemeList) {
        let sim = Simulation::new(config, themes, self.options.flow, self.options.timings);
        self.sim = Some(sim);
        if let Err(err) = self.install_listener() {
            tracing::warn!("keyboard unavailable: {}", err);
        }
        self.arm();
        self.render();
    }

    fn install_listener(&mut self) -> Result<()> {
        if self.listener.is_some() {
            return Ok(());
        }
        let weak = self.this.clone();
        let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
            let Some(key) = Key::from_dom(&e.key()) else {
                return;
            };
            Driver::with(&weak, |d| {
                if d.on_key(key) {
                    e.prevent_default();
                }
            });
        });
        dom::document()?
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        self.listener = Some(closure);
        Ok(())
    }

    /// Replace the timers with the ones the current phase needs.
    fn arm(&mut self) {
        self.timers.cancel_all();
        self.armed = self.sim.as_ref().and_then(Simulation::schedule);
        let Some(schedule) = self.armed else {
            return;
        };
        let weak = self.this.clone();
        let armed = match schedule {
            Schedule::Every(ms) => self
                .timers
                .interval(ms, move || Driver::with(&weak, Driver::on_tick)),
            Schedule::After(ms) => self
                .timers
                .timeout(ms, move || Driver::with(&weak, Driver::on_expire)),
        };
        if let Err(err) = armed {
            tracing::error!("could not schedule {:?}: {}", schedule, err);
        }
    }

    fn on_key(&mut self, key: Key) -> bool {
        let Some(sim) = self.sim.as_mut() else {
            return false;
        };
        let change = sim.handle_key(key);
        self.apply(change)
    }

    fn on_tick(&mut self) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        let change = if sim.phase() == Phase::Desktop {
            sim.set_clock(dom::now_clock())
        } else {
            sim.tick()
        };
        self.apply(change);
    }

    fn on_expire(&mut self) {
        if let Some(sim) = self.sim.as_mut() {
            let change = sim.expire();
            self.apply(change);
        }
    }

    fn apply(&mut self, change: Change) -> bool {
        match change {
            Change::None => return false,
            Change::Redraw => {
                let wanted = self.sim.as_ref().and_then(Simulation::schedule);
                if wanted != self.armed {
                    self.arm();
                }
            }
            Change::Entered(phase) => {
                self.arm();
                if phase == Phase::Desktop {
                    if let Some(sim) = self.sim.as_mut() {
                        sim.set_clock(dom::now_clock());
                    }
                }
            }
            Change::Halted => {
                self.timers.cancel_all();
                self.armed = None;
            }
        }
        self.render();
        true
    }

    fn render(&self) {
        let (Some(root), Some(sim)) = (&self.root, &self.sim) else {
            return;
        };
        let _ = root.set_attribute("data-phase", sim.phase().name());
        root.set_inner_html(&sim.render());
    }

    fn fail(&self, err: &crate::error::BootError) {
        tracing::error!("boot configuration failed: {}", err);
        if let Some(root) = &self.root {
            dom::show_status(root, dom::STATUS_CONFIG_FAILED);
        }
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.armed = None;
        if let Some(listener) = self.listener.take() {
            if let Ok(doc) = dom::document() {
                let _ = doc.remove_event_listener_with_callback(
                    "keydown",
                    listener.as_ref().unchecked_ref(),
                );
            }
            wasm_bindgen_futures::spawn_local(async move {
                drop(listener);
            });
        }
        if let Some(root) = self.root.take() {
            root.set_inner_html("");
            let _ = root.remove_attribute("data-phase");
        }
        self.sim = None;
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        if self.listener.is_some() || self.root.is_some() {
            self.teardown();
        }
    }
}

/// JavaScript handle for one boot-screen simulation mounted on a page.
#[wasm_bindgen]
pub struct BootSim {
    inner: Rc<RefCell<Driver>>,
}

#[wasm_bindgen]
impl BootSim {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: &str) -> std::result::Result<BootSim, JsValue> {
        let options = SimOptions::from_json(options_json)?;
        logging::init(logging::parse_level(&options.log_level));
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Driver {
                this: this.clone(),
                options,
                sim: None,
                timers: TimerSet::new(),
                armed: None,
                root: None,
                listener: None,
            })
        });
        Ok(BootSim { inner })
    }

    fn attach_root(&self) -> Result<()> {
        let selector = self.inner.borrow().options.root.clone();
        let root = dom::root(&selector)?;
        self.inner.borrow_mut().root = Some(root);
        Ok(())
    }

    /// Fetch the configuration and start the first phase. Resolves once the
    /// first screen is shown or the failure message is rendered.
    pub fn start(&self) -> js_sys::Promise {
        let inner = self.inner.clone();
        let attached = self.attach_root();
        wasm_bindgen_futures::future_to_promise(async move {
            attached.map_err(JsValue::from)?;
            let url = inner.borrow().options.config_url.clone();
            match config::load(&url).await {
                Ok((config, themes)) => inner.borrow_mut().mount(config, themes),
                Err(err) => inner.borrow().fail(&err),
            }
            Ok::<JsValue, JsValue>(JsValue::UNDEFINED)
        })
    }

    /// Start from an inline configuration document instead of fetching one.
    #[wasm_bindgen(js_name = startWithConfig)]
    pub fn start_with_config(&self, config_json: &str) -> std::result::Result<(), JsValue> {
        self.attach_root()?;
        match BootConfig::from_json(config_json) {
            Ok(config) => {
                let themes = ThemeList::build(&config, &[]);
                self.inner.borrow_mut().mount(config, themes);
                Ok(())
            }
            Err(err) => {
                self.inner.borrow().fail(&err);
                Err(err.into())
            }
        }
    }

    /// Feed a `KeyboardEvent.key` value. Returns whether it changed anything.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        match self.inner.try_borrow_mut() {
            Ok(mut driver) => driver.on_key(key),
            Err(_) => false,
        }
    }

    pub fn phase(&self) -> Option<String> {
        let driver = self.inner.borrow();
        driver.sim.as_ref().map(|s| s.phase().name().to_string())
    }

    pub fn theme(&self) -> Option<String> {
        let driver = self.inner.borrow();
        driver
            .sim
            .as_ref()
            .and_then(|s| s.theme_name().map(str::to_string))
    }

    #[wasm_bindgen(js_name = activeTimers)]
    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Cancel timers, detach the keyboard listener and clear the root.
    pub fn destroy(&self) {
        self.inner.borrow_mut().teardown();
    }
}

#![cfg(target_arch = "wasm32")]

use bootscreens::timers::TimerSet;
use bootscreens::BootSim;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

const CONFIG: &str = r#"{
    "timeout": 0,
    "users": [{"name": "Guest"}],
    "themes": [
        {"name": "Embedded",
         "entries": [{"title": "macOS", "kind": "macos"}],
         "actions": [{"title": "Shut Down", "action": "shutdown"}]}
    ]
}"#;

fn mount_root(id: &str) -> web_sys::Element {
    let doc = web_sys::window().unwrap().document().unwrap();
    let el = doc.create_element("div").unwrap();
    el.set_id(id);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

fn options(id: &str, flow: &str) -> String {
    options_with(id, flow, "")
}

/// `extra` is spliced in as additional top-level fields.
fn options_with(id: &str, flow: &str, extra: &str) -> String {
    format!(
        r##"{{"root": "#{}", "flow": "{}", "log_level": "debug"{}}}"##,
        id, flow, extra
    )
}

fn config_with_timeout(secs: u32) -> String {
    CONFIG.replace(r#""timeout": 0"#, &format!(r#""timeout": {}"#, secs))
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn renders_post_and_arms_timer() {
    let root = mount_root("boot-post");
    let sim = BootSim::new(&options("boot-post", "classic")).unwrap();
    sim.start_with_config(CONFIG).unwrap();
    assert_eq!(sim.phase().as_deref(), Some("post"));
    assert_eq!(root.get_attribute("data-phase").as_deref(), Some("post"));
    assert!(root.inner_html().contains("Memory Testing"));
    assert_eq!(sim.active_timers(), 1);

    assert!(sim.handle_key("Escape"));
    assert_eq!(sim.phase().as_deref(), Some("bootloader"));
    // countdown disabled, so nothing is scheduled
    assert_eq!(sim.active_timers(), 0);

    sim.destroy();
    assert_eq!(sim.active_timers(), 0);
    assert_eq!(root.inner_html(), "");
    assert_eq!(sim.phase(), None);
}

#[wasm_bindgen_test]
fn picker_shutdown_cancels_timers() {
    let root = mount_root("boot-clover");
    let sim = BootSim::new(&options("boot-clover", "clover")).unwrap();
    sim.start_with_config(CONFIG).unwrap();
    sim.handle_key("Enter");
    assert_eq!(sim.phase().as_deref(), Some("picker"));
    sim.handle_key("ArrowDown");
    assert!(sim.handle_key("Enter"));
    assert_eq!(sim.active_timers(), 0);
    assert!(root.inner_html().contains("safe to turn off"));
    assert!(!sim.handle_key("Enter"));
    sim.destroy();
}

#[wasm_bindgen_test]
fn bad_config_shows_status() {
    let root = mount_root("boot-bad");
    let sim = BootSim::new(&options("boot-bad", "classic")).unwrap();
    assert!(sim.start_with_config(r#"{"themes": []}"#).is_err());
    assert!(root.inner_html().contains("Unable to load boot configuration."));
    assert_eq!(sim.phase(), None);
}

#[wasm_bindgen_test]
fn missing_root_is_an_error() {
    let sim = BootSim::new(r##"{"root": "#does-not-exist"}"##).unwrap();
    assert!(sim.start_with_config(CONFIG).is_err());
}

#[wasm_bindgen_test]
fn picker_countdown_timer_follows_keys() {
    let root = mount_root("boot-countdown");
    let sim = BootSim::new(&options("boot-countdown", "clover")).unwrap();
    sim.start_with_config(&config_with_timeout(5)).unwrap();
    sim.handle_key("Enter");
    assert_eq!(sim.phase().as_deref(), Some("picker"));
    assert_eq!(sim.active_timers(), 1);

    // any key stops the countdown and its interval
    assert!(sim.handle_key("ArrowRight"));
    assert_eq!(sim.active_timers(), 0);

    sim.handle_key("ArrowDown");
    assert!(sim.handle_key("Enter"));
    assert_eq!(sim.active_timers(), 0);
    assert!(root.inner_html().contains("safe to turn off"));
    sim.destroy();
}

#[wasm_bindgen_test]
async fn bootloader_countdown_boots_on_its_own() {
    mount_root("boot-auto");
    let extra = r#", "timings": {"countdown_tick_ms": 10, "boot_frames": 1000}"#;
    let sim = BootSim::new(&options_with("boot-auto", "classic", extra)).unwrap();
    sim.start_with_config(&config_with_timeout(2)).unwrap();
    sim.handle_key("Escape");
    assert_eq!(sim.phase().as_deref(), Some("bootloader"));
    sleep(200).await;
    assert_eq!(sim.phase().as_deref(), Some("boot"));
    sim.destroy();
}

#[wasm_bindgen_test]
async fn stopped_countdown_never_fires() {
    let root = mount_root("boot-stopped");
    let extra = r#", "timings": {"countdown_tick_ms": 10}"#;
    let sim = BootSim::new(&options_with("boot-stopped", "classic", extra)).unwrap();
    sim.start_with_config(&config_with_timeout(1)).unwrap();
    sim.handle_key("Escape");
    assert_eq!(sim.active_timers(), 1);
    sim.handle_key("ArrowDown");
    assert_eq!(sim.active_timers(), 0);
    let html = root.inner_html();
    sleep(100).await;
    assert_eq!(sim.phase().as_deref(), Some("bootloader"));
    assert_eq!(root.inner_html(), html);
    sim.destroy();
}

#[wasm_bindgen_test]
async fn destroy_during_post_stops_ticks() {
    let root = mount_root("boot-destroy");
    let extra = r#", "timings": {"post_tick_ms": 10}"#;
    let sim = BootSim::new(&options_with("boot-destroy", "classic", extra)).unwrap();
    sim.start_with_config(CONFIG).unwrap();
    assert_eq!(sim.active_timers(), 1);
    sim.destroy();
    sleep(100).await;
    assert_eq!(root.inner_html(), "");
    assert_eq!(root.get_attribute("data-phase"), None);
    assert_eq!(sim.phase(), None);
    assert!(!sim.handle_key("Enter"));
}

#[wasm_bindgen_test]
async fn cancel_all_stops_an_interval() {
    let count = Rc::new(Cell::new(0u32));
    let mut timers = TimerSet::new();
    let seen = count.clone();
    timers.interval(5, move || seen.set(seen.get() + 1)).unwrap();
    assert_eq!(timers.len(), 1);
    sleep(60).await;
    assert!(count.get() > 0);

    timers.cancel_all();
    assert!(timers.is_empty());
    let stopped_at = count.get();
    sleep(60).await;
    assert_eq!(count.get(), stopped_at);
}

#[wasm_bindgen_test]
async fn callback_may_cancel_its_own_set() {
    let count = Rc::new(Cell::new(0u32));
    let timers = Rc::new(RefCell::new(TimerSet::new()));
    for _ in 0..2 {
        let weak = Rc::downgrade(&timers);
        let seen = count.clone();
        timers
            .borrow_mut()
            .timeout(0, move || {
                seen.set(seen.get() + 1);
                if let Some(timers) = weak.upgrade() {
                    timers.borrow_mut().cancel_all();
                }
            })
            .unwrap();
    }
    let generation = timers.borrow().generation();
    sleep(50).await;
    // the second timeout belonged to the cancelled generation
    assert_eq!(count.get(), 1);
    assert!(timers.borrow().is_empty());
    assert_eq!(timers.borrow().generation(), generation + 1);
}

#[wasm_bindgen_test]
async fn unreachable_config_shows_status() {
    let root = mount_root("boot-unreachable");
    let extra = r#", "config_url": "does-not-exist.json""#;
    let sim = BootSim::new(&options_with("boot-unreachable", "classic", extra)).unwrap();
    JsFuture::from(sim.start()).await.unwrap();
    assert!(root.inner_html().contains("Unable to load boot configuration."));
    assert_eq!(sim.phase(), None);
    assert_eq!(sim.active_timers(), 0);
}

#[wasm_bindgen_test]
async fn missing_theme_list_is_ignored() {
    let root = mount_root("boot-no-list");
    let config = CONFIG.replacen('{', r#"{"theme_list": "no-such-themes.json","#, 1);
    let url = format!(
        "data:application/json,{}",
        String::from(js_sys::encode_uri_component(&config))
    );
    let extra = format!(r#", "config_url": "{}""#, url);
    let sim = BootSim::new(&options_with("boot-no-list", "classic", &extra)).unwrap();
    JsFuture::from(sim.start()).await.unwrap();
    assert_eq!(sim.phase().as_deref(), Some("post"));
    assert_eq!(sim.theme().as_deref(), Some("Embedded"));
    assert!(root.inner_html().contains("Memory Testing"));
    sim.destroy();
}

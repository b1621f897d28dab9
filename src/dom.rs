use crate::error::{BootError, Result};
use web_sys::{Document, Element};

pub const STATUS_CONFIG_FAILED: &str = "Unable to load boot configuration.";

pub fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| BootError::Dom("no document".into()))
}

pub fn root(selector: &str) -> Result<Element> {
    document()?
        .query_selector(selector)?
        .ok_or_else(|| BootError::Dom(format!("{} not found", selector)))
}

/// Replace the root's content with a static status line.
pub fn show_status(root: &Element, message: &str) {
    root.set_inner_html(&format!(
        r#"<div class="status">{}</div>"#,
        crate::screen::escape(message)
    ));
}

pub fn now_clock() -> String {
    let date = js_sys::Date::new_0();
    crate::desktop::clock_text(date.get_hours(), date.get_minutes())
}

//! Owned `setTimeout`/`setInterval` handles that can be cancelled as a group.

use crate::error::{BootError, Result};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

enum Handle {
    Timeout(i32, Closure<dyn FnMut()>),
    Interval(i32, Closure<dyn FnMut()>),
}

/// Every callback checks the generation it was scheduled under; a cancelled
/// generation never runs even if the browser already queued it.
pub struct TimerSet {
    generation: Rc<Cell<u64>>,
    handles: Vec<Handle>,
}

impl Default for TimerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerSet {
    pub fn new() -> Self {
        TimerSet {
            generation: Rc::new(Cell::new(0)),
            handles: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn guarded(&self, mut f: impl FnMut() + 'static) -> Closure<dyn FnMut()> {
        let scheduled = self.generation.get();
        let current = self.generation.clone();
        Closure::wrap(Box::new(move || {
            if current.get() == scheduled {
                f();
            }
        }) as Box<dyn FnMut()>)
    }

    pub fn timeout(&mut self, ms: u32, f: impl FnOnce() + 'static) -> Result<i32> {
        let mut f = Some(f);
        let closure = self.guarded(move || {
            if let Some(f) = f.take() {
                f();
            }
        });
        let id = window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms as i32,
        )?;
        self.handles.push(Handle::Timeout(id, closure));
        Ok(id)
    }

    pub fn interval(&mut self, ms: u32, f: impl FnMut() + 'static) -> Result<i32> {
        let closure = self.guarded(f);
        let id = window()?.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms as i32,
        )?;
        self.handles.push(Handle::Interval(id, closure));
        Ok(id)
    }

    /// Clear every handle. Closures are released on the next microtask so a
    /// callback may cancel the set it is running from.
    pub fn cancel_all(&mut self) {
        self.generation.set(self.generation.get() + 1);
        if self.handles.is_empty() {
            return;
        }
        let handles = std::mem::take(&mut self.handles);
        if let Some(win) = web_sys::window() {
            for handle in &handles {
                match handle {
                    Handle::Timeout(id, _) => win.clear_timeout_with_handle(*id),
                    Handle::Interval(id, _) => win.clear_interval_with_handle(*id),
                }
            }
        }
        tracing::trace!("cancelled {} timer(s)", handles.len());
        wasm_bindgen_futures::spawn_local(async move {
            drop(handles);
        });
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| BootError::Dom("no window".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_bumps_generation() {
        let mut timers = TimerSet::new();
        assert!(timers.is_empty());
        timers.cancel_all();
        timers.cancel_all();
        assert_eq!(timers.generation(), 2);
    }
}

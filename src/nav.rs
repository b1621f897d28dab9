//! Keyboard contract shared by every screen.
//!
//! Selection always wraps: stepping past either end of a row lands on the
//! other end.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Tab,
    Char(char),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Key> {
        match key {
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowDown" | "Down" => Some(Key::Down),
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            "Backspace" => Some(Key::Backspace),
            "Tab" => Some(Key::Tab),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }

    pub fn is_arrow(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    fn delta(self, key: Key) -> Option<isize> {
        match (self, key) {
            (Axis::Vertical, Key::Up) | (Axis::Horizontal, Key::Left) => Some(-1),
            (Axis::Vertical, Key::Down) | (Axis::Horizontal, Key::Right) => Some(1),
            _ => None,
        }
    }

    fn cross(self) -> Axis {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }
}

fn wrap(index: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let index = index.min(len - 1) as isize;
    (index + delta).rem_euclid(len as isize) as usize
}

/// Up/Left go back one, Down/Right go forward one, wrapping modulo `len`.
pub fn step(index: usize, len: usize, key: Key) -> usize {
    let delta = match key {
        Key::Up | Key::Left => -1,
        Key::Down | Key::Right => 1,
        _ => 0,
    };
    wrap(index, len, delta)
}

/// Like [`step`] but only keys along `axis` move the selection.
pub fn step_on(axis: Axis, index: usize, len: usize, key: Key) -> usize {
    wrap(index, len, axis.delta(key).unwrap_or(0))
}

/// Selection over one or more rows of items, one row active at a time.
#[derive(Clone, Debug)]
pub struct RowCursor {
    axis: Axis,
    lens: Vec<usize>,
    selected: Vec<usize>,
    row: usize,
}

impl RowCursor {
    /// `axis` is the direction items are laid out within a row.
    pub fn new(axis: Axis, lens: &[usize]) -> Self {
        let row = lens.iter().position(|&l| l > 0).unwrap_or(0);
        RowCursor {
            axis,
            lens: lens.to_vec(),
            selected: vec![0; lens.len()],
            row,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn selected(&self) -> usize {
        self.selected.get(self.row).copied().unwrap_or(0)
    }

    pub fn selected_in(&self, row: usize) -> usize {
        self.selected.get(row).copied().unwrap_or(0)
    }

    pub fn set_selected(&mut self, row: usize, index: usize) {
        if let (Some(slot), Some(&len)) = (self.selected.get_mut(row), self.lens.get(row)) {
            *slot = index.min(len.saturating_sub(1));
        }
    }

    /// Replace row lengths, clamping selections into the new bounds.
    pub fn resize(&mut self, lens: &[usize]) {
        self.lens = lens.to_vec();
        self.selected.resize(lens.len(), 0);
        for (sel, &len) in self.selected.iter_mut().zip(&self.lens) {
            *sel = (*sel).min(len.saturating_sub(1));
        }
        if self.lens.get(self.row).copied().unwrap_or(0) == 0 {
            self.row = self.lens.iter().position(|&l| l > 0).unwrap_or(0);
        }
    }

    /// Returns true when the key moved the selection or the active row.
    pub fn handle(&mut self, key: Key) -> bool {
        if self.axis.delta(key).is_some() {
            let len = self.lens.get(self.row).copied().unwrap_or(0);
            let before = self.selected();
            let after = step_on(self.axis, before, len, key);
            if let Some(slot) = self.selected.get_mut(self.row) {
                *slot = after;
            }
            return after != before;
        }
        if let Some(delta) = self.axis.cross().delta(key) {
            let rows = self.lens.len();
            if rows == 0 {
                return false;
            }
            let mut next = self.row;
            for _ in 0..rows {
                next = wrap(next, rows, delta);
                if self.lens[next] > 0 {
                    break;
                }
            }
            if next != self.row && self.lens[next] > 0 {
                self.row = next;
                return true;
            }
        }
        false
    }
}

//! Input translator.
//!
//! Raw device events are folded into an [`InputState`] as they arrive; the
//! editor samples it once per tick and then calls [`InputState::end_tick`]
//! to consume edges. Edge states (`JustPressed`, `JustReleased`) are
//! therefore visible for exactly one tick.

use std::collections::HashMap;

use mask_core::Point;

/// Edge-tracked state of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Idle,
    JustPressed,
    Held,
    JustReleased,
}

impl ButtonState {
    /// State on the next tick once this tick's edge has been consumed.
    pub fn advance(self) -> Self {
        match self {
            Self::JustPressed | Self::Held => Self::Held,
            Self::JustReleased | Self::Idle => Self::Idle,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, Self::JustPressed | Self::Held)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Modifier flags. `alt` is the Option key on macOS.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Key names that count as modifiers, in display order.
    pub const KEYS: [&'static str; 4] = ["control", "alt", "meta", "shift"];

    pub fn is_empty(self) -> bool {
        self == Self::default()
    }

    /// Set the flag named by `key`. Returns `false` if `key` is not a modifier.
    pub fn set(&mut self, key: &str) -> bool {
        match key {
            "control" | "ctrl" => self.control = true,
            "alt" | "option" => self.alt = true,
            "meta" => self.meta = true,
            "shift" => self.shift = true,
            _ => return false,
        }
        true
    }

    /// Names of the flags that are set, in [`Modifiers::KEYS`] order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        let flags = [self.control, self.alt, self.meta, self.shift];
        Self::KEYS
            .into_iter()
            .zip(flags)
            .filter_map(|(name, on)| on.then_some(name))
    }
}

/// Keyboard key state. Released keys are not tracked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    JustPressed,
    Held,
}

impl KeyState {
    /// Edge weight used by click detection: 1 on the press tick, 2 after.
    pub fn weight(self) -> u32 {
        match self {
            Self::JustPressed => 1,
            Self::Held => 2,
        }
    }
}

/// Where keyboard focus was when a key went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// The bare document body, i.e. no text field or panel.
    Body,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub delta_y: f64,
    pub ctrl: bool,
}

/// A raw event from the host window.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// Pointer position in CSS pixels.
    MouseMove { x: f64, y: f64 },
    Wheel { delta_y: f64, ctrl: bool },
    KeyDown { key: String, target: FocusTarget },
    KeyUp { key: String },
    /// Window gained or lost focus.
    Focus(bool),
}

// ─── State ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InputState {
    left: ButtonState,
    middle: ButtonState,
    right: ButtonState,
    cursor: Point,
    keys: HashMap<String, KeyState>,
    wheel: Vec<WheelDelta>,
    focused: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            left: ButtonState::Idle,
            middle: ButtonState::Idle,
            right: ButtonState::Idle,
            cursor: Point::ZERO,
            keys: HashMap::new(),
            wheel: Vec::new(),
            focused: true,
        }
    }

    /// Fold one raw event into the state. `resolution` converts CSS pixels
    /// to device pixels.
    pub fn handle(&mut self, event: &InputEvent, resolution: f64) {
        match event {
            InputEvent::MouseDown { button } => *self.button_mut(*button) = ButtonState::JustPressed,
            InputEvent::MouseUp { button } => *self.button_mut(*button) = ButtonState::JustReleased,
            InputEvent::MouseMove { x, y } => {
                self.cursor = Point::new(x * resolution, y * resolution);
            }
            InputEvent::Wheel { delta_y, ctrl } => self.wheel.push(WheelDelta {
                delta_y: *delta_y,
                ctrl: *ctrl,
            }),
            InputEvent::KeyDown { key, target } => {
                if *target != FocusTarget::Body {
                    return;
                }
                // Auto-repeat must not re-trigger the press edge.
                self.keys
                    .entry(key.to_lowercase())
                    .or_insert(KeyState::JustPressed);
            }
            InputEvent::KeyUp { key } => {
                self.keys.remove(&key.to_lowercase());
            }
            InputEvent::Focus(focused) => self.focused = *focused,
        }
    }

    /// Consume this tick's edges.
    pub fn end_tick(&mut self) {
        self.left = self.left.advance();
        self.middle = self.middle.advance();
        self.right = self.right.advance();
        for state in self.keys.values_mut() {
            *state = KeyState::Held;
        }
    }

    pub fn button(&self, button: MouseButton) -> ButtonState {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        }
    }

    fn button_mut(&mut self, button: MouseButton) -> &mut ButtonState {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Middle => &mut self.middle,
            MouseButton::Right => &mut self.right,
        }
    }

    /// Cursor in editor (device) pixels.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn key(&self, key: &str) -> Option<KeyState> {
        self.keys.get(key).copied()
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Modifier flags derived from which modifier keys are held.
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::default();
        for key in self.keys.keys() {
            mods.set(key);
        }
        mods
    }

    /// Drain wheel events queued since the last tick.
    pub fn take_wheel(&mut self) -> Vec<WheelDelta> {
        std::mem::take(&mut self.wheel)
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

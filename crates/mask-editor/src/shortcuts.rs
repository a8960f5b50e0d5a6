//! Keyboard shortcut mapping.
//!
//! Every editor action is bound to a [`KeyCombination`]: a set of plain keys
//! plus exact modifier flags. Combinations round-trip through strings such as
//! `"Control + Z"`, which is also their serialized form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::input::{InputState, Modifiers};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    // ── Camera ──
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    ZoomIn,
    ZoomOut,
    ResetCamera,

    // ── Stroke ──
    StrokeButt,
    StrokeRound,
    StrokePolygon,
    IncreaseSize,
    DecreaseSize,
    ToggleOpacity,

    // ── Edit ──
    Undo,
    /// Drop pending points and the capsule anchor.
    Cancel,

    // ── Image (long press) ──
    SkipImage,
    SubmitImage,
}

impl ShortcutAction {
    pub const ALL: [Self; 17] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveUp,
        Self::MoveDown,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::ResetCamera,
        Self::StrokeButt,
        Self::StrokeRound,
        Self::StrokePolygon,
        Self::IncreaseSize,
        Self::DecreaseSize,
        Self::ToggleOpacity,
        Self::Undo,
        Self::Cancel,
        Self::SkipImage,
        Self::SubmitImage,
    ];
}

// ─── Key combination ─────────────────────────────────────────────────────

/// Plain keys (lower-cased) plus modifier flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombination {
    keys: SmallVec<[String; 2]>,
    modifiers: Modifiers,
}

impl KeyCombination {
    /// Build from key names. Modifier names become flags; duplicates collapse.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut combo = Self::default();
        for key in keys {
            let key = normalize(key.as_ref());
            if key.is_empty() || combo.modifiers.set(&key) {
                continue;
            }
            if !combo.keys.contains(&key) {
                combo.keys.push(key);
            }
        }
        combo
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.modifiers.is_empty()
    }

    /// Every key tracked for click detection: plain keys and held modifiers.
    fn tracked(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .map(String::as_str)
            .chain(self.modifiers.names().map(|name| -> &str { name }))
    }

    /// All keys are down and the modifier flags match exactly.
    pub fn is_pressed(&self, input: &InputState) -> bool {
        !self.is_empty()
            && input.modifiers() == self.modifiers
            && self.keys.iter().all(|k| input.is_key_down(k))
    }

    /// Pressed, and at least one key went down this tick.
    ///
    /// Each key weighs 1 on its press tick and 2 afterwards, so the sum stays
    /// below `2 * count` only during the tick that completes the chord. A held
    /// chord fires exactly once.
    pub fn is_clicked(&self, input: &InputState) -> bool {
        if !self.is_pressed(input) {
            return false;
        }
        let (sum, count) = self.tracked().fold((0, 0), |(sum, count), key| {
            let weight = input.key(key).map_or(0, |s| s.weight());
            (sum + weight, count + 1)
        });
        sum < 2 * count
    }
}

/// Lower-cased key name. The space bar is stored as `" "`, the value the
/// input layer reports, and written as `"Space"`.
fn normalize(key: &str) -> String {
    if key == SPACE {
        return key.to_string();
    }
    let key = key.trim().to_lowercase();
    if key == "space" { SPACE.to_string() } else { key }
}

const SPACE: &str = " ";

fn capitalize(key: &str) -> String {
    if key == SPACE {
        return "Space".to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for KeyCombination {
    /// Modifiers first, then keys: `"Control + Shift + Z"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .modifiers
            .names()
            .map(capitalize)
            .chain(self.keys.iter().map(String::as_str).map(capitalize))
            .collect();
        f.write_str(&names.join(" + "))
    }
}

impl FromStr for KeyCombination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        // The spaced separator lets "+" itself be bound: "Control + +".
        let parts: Vec<&str> = if s.contains(" + ") {
            s.split(" + ").collect()
        } else if s == "+" {
            vec![s]
        } else {
            s.split('+').collect()
        };
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(format!("empty key in combination {s:?}"));
        }
        Ok(Self::from_keys(parts))
    }
}

impl TryFrom<String> for KeyCombination {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<KeyCombination> for String {
    fn from(combo: KeyCombination) -> Self {
        combo.to_string()
    }
}

// ─── Keybinds ────────────────────────────────────────────────────────────

/// The configured combination for each action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keybinds {
    pub move_left: KeyCombination,
    pub move_right: KeyCombination,
    pub move_up: KeyCombination,
    pub move_down: KeyCombination,
    pub zoom_in: KeyCombination,
    pub zoom_out: KeyCombination,
    pub reset_camera: KeyCombination,
    pub change_stroke_type1: KeyCombination,
    pub change_stroke_type2: KeyCombination,
    pub change_stroke_type3: KeyCombination,
    pub increase_stroke_size: KeyCombination,
    pub decrease_stroke_size: KeyCombination,
    pub change_stroke_opacity: KeyCombination,
    pub undo_last_action: KeyCombination,
    pub cancel: KeyCombination,
    pub skip_image: KeyCombination,
    pub submit_image: KeyCombination,
}

impl Default for Keybinds {
    fn default() -> Self {
        let k = |key: &str| KeyCombination::from_keys([key]);
        Self {
            move_left: k("a"),
            move_right: k("d"),
            move_up: k("w"),
            move_down: k("s"),
            zoom_in: k("e"),
            zoom_out: k("q"),
            reset_camera: k("r"),
            change_stroke_type1: k("1"),
            change_stroke_type2: k("2"),
            change_stroke_type3: k("3"),
            increase_stroke_size: k("="),
            decrease_stroke_size: k("-"),
            change_stroke_opacity: k("f"),
            undo_last_action: k("x"),
            cancel: k("escape"),
            skip_image: k("z"),
            submit_image: k("c"),
        }
    }
}

impl Keybinds {
    pub fn get(&self, action: ShortcutAction) -> &KeyCombination {
        match action {
            ShortcutAction::MoveLeft => &self.move_left,
            ShortcutAction::MoveRight => &self.move_right,
            ShortcutAction::MoveUp => &self.move_up,
            ShortcutAction::MoveDown => &self.move_down,
            ShortcutAction::ZoomIn => &self.zoom_in,
            ShortcutAction::ZoomOut => &self.zoom_out,
            ShortcutAction::ResetCamera => &self.reset_camera,
            ShortcutAction::StrokeButt => &self.change_stroke_type1,
            ShortcutAction::StrokeRound => &self.change_stroke_type2,
            ShortcutAction::StrokePolygon => &self.change_stroke_type3,
            ShortcutAction::IncreaseSize => &self.increase_stroke_size,
            ShortcutAction::DecreaseSize => &self.decrease_stroke_size,
            ShortcutAction::ToggleOpacity => &self.change_stroke_opacity,
            ShortcutAction::Undo => &self.undo_last_action,
            ShortcutAction::Cancel => &self.cancel,
            ShortcutAction::SkipImage => &self.skip_image,
            ShortcutAction::SubmitImage => &self.submit_image,
        }
    }

    pub fn is_pressed(&self, action: ShortcutAction, input: &InputState) -> bool {
        self.get(action).is_pressed(input)
    }

    pub fn is_clicked(&self, action: ShortcutAction, input: &InputState) -> bool {
        self.get(action).is_clicked(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FocusTarget, InputEvent};
    use pretty_assertions::assert_eq;

    fn press(input: &mut InputState, key: &str) {
        input.handle(
            &InputEvent::KeyDown {
                key: key.to_string(),
                target: FocusTarget::Body,
            },
            1.0,
        );
    }

    fn release(input: &mut InputState, key: &str) {
        input.handle(&InputEvent::KeyUp { key: key.to_string() }, 1.0);
    }

    #[test]
    fn parse_and_display() {
        let combo: KeyCombination = "Control + Shift + Z".parse().unwrap();
        assert_eq!(combo.keys(), ["z".to_string()]);
        assert!(combo.modifiers().control && combo.modifiers().shift);
        assert_eq!(combo.to_string(), "Control + Shift + Z");

        let compact: KeyCombination = "ctrl+z".parse().unwrap();
        assert_eq!(compact.to_string(), "Control + Z");
    }

    #[test]
    fn plus_and_minus_keys() {
        let plus: KeyCombination = "Control + +".parse().unwrap();
        assert_eq!(plus.keys(), ["+".to_string()]);
        let minus: KeyCombination = "-".parse().unwrap();
        assert_eq!(minus.keys(), ["-".to_string()]);
    }

    #[test]
    fn serde_as_string() {
        let binds = Keybinds::default();
        let json = serde_json::to_value(&binds).unwrap();
        assert_eq!(json["undoLastAction"], "X");
        assert_eq!(json["cancel"], "Escape");

        let parsed: Keybinds = serde_json::from_str(r#"{"skipImage": "Alt + N"}"#).unwrap();
        assert_eq!(parsed.skip_image.to_string(), "Alt + N");
        assert_eq!(parsed.submit_image, Keybinds::default().submit_image);
    }

    #[test]
    fn pressed_requires_exact_modifiers() {
        let combo = KeyCombination::from_keys(["z"]);
        let mut input = InputState::new();
        press(&mut input, "z");
        assert!(combo.is_pressed(&input));
        press(&mut input, "shift");
        assert!(!combo.is_pressed(&input));
    }

    #[test]
    fn clicked_fires_once_per_press() {
        let combo = KeyCombination::from_keys(["x"]);
        let mut input = InputState::new();
        press(&mut input, "x");

        let mut fired = 0;
        for _ in 0..10 {
            if combo.is_clicked(&input) {
                fired += 1;
            }
            input.end_tick();
        }
        assert_eq!(fired, 1);

        release(&mut input, "x");
        press(&mut input, "x");
        assert!(combo.is_clicked(&input));
    }

    #[test]
    fn chord_fires_when_completed() {
        let combo: KeyCombination = "Control + Z".parse().unwrap();
        let mut input = InputState::new();
        press(&mut input, "control");
        input.end_tick();
        input.end_tick();
        assert!(!combo.is_clicked(&input));

        press(&mut input, "z");
        assert!(combo.is_clicked(&input));
        input.end_tick();
        assert!(!combo.is_clicked(&input));
        assert!(combo.is_pressed(&input));
    }

    #[test]
    fn empty_combination_never_matches() {
        let combo = KeyCombination::default();
        let input = InputState::new();
        assert!(!combo.is_pressed(&input));
        assert!(!combo.is_clicked(&input));
        assert_eq!(combo.to_string(), "");
    }

    #[test]
    fn modifier_chord_displays_and_tracks_modifiers() {
        let combo = KeyCombination::from_keys(["shift", "Alt", "n"]);
        assert_eq!(combo.to_string(), "Alt + Shift + N");
        let tracked: Vec<&str> = combo.tracked().collect();
        assert_eq!(tracked, vec!["n", "alt", "shift"]);

        let mut input = InputState::new();
        press(&mut input, "shift");
        press(&mut input, "alt");
        input.end_tick();
        press(&mut input, "n");
        assert!(combo.is_clicked(&input));
        input.end_tick();
        assert!(!combo.is_clicked(&input));
    }

    #[test]
    fn space_key_binds_and_round_trips() {
        let combo = KeyCombination::from_keys([" "]);
        assert_eq!(combo.keys(), [" ".to_string()]);
        assert_eq!(combo.to_string(), "Space");
        let parsed: KeyCombination = "Space".parse().unwrap();
        assert_eq!(parsed, combo);
        let chord: KeyCombination = "Control + Space".parse().unwrap();
        assert_eq!(chord.to_string(), "Control + Space");

        let mut input = InputState::new();
        press(&mut input, " ");
        assert!(combo.is_pressed(&input));
        assert!(combo.is_clicked(&input));

        let json = serde_json::to_string(&combo).unwrap();
        assert_eq!(json, r#""Space""#);
        let back: KeyCombination = serde_json::from_str(&json).unwrap();
        assert_eq!(back, combo);
    }

    #[test]
    fn every_action_has_a_default() {
        let binds = Keybinds::default();
        for action in ShortcutAction::ALL {
            assert!(!binds.get(action).is_empty(), "{action:?}");
        }
    }
}

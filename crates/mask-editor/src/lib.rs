//! Mask Draft editor engine: input translation, key combinations, drawing
//! tools, long-press confirmations, and the per-tick [`Editor`].

pub mod confirm;
pub mod editor;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use confirm::HoldConfirm;
pub use editor::{Brush, EditTarget, Editor, EditorAction, Frame};
pub use input::{ButtonState, FocusTarget, InputEvent, InputState, Modifiers, MouseButton};
pub use shortcuts::{KeyCombination, Keybinds, ShortcutAction};
pub use tools::{CapsuleTool, Gesture, PolygonTool, StrokeEvent, Tool, ToolContext};

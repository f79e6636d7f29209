//! Keyboard input for the fly camera.
//!
//! Key transitions are translated into a [`MovementIntent`], a fixed set of
//! ten flags that the render loop reads once per frame.
//!
//! # Invariants
//! - A flag is `true` iff the most recent event for its key was key-down.
//! - Unmapped keys never touch the intent.

pub mod bindings;
pub mod intent;

pub use bindings::{BindingError, KeyBindings};
pub use intent::{KeyEvent, KeyState, Movement, MovementIntent};

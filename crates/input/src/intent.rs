use serde::{Deserialize, Serialize};

/// One of the ten camera movements the keyboard can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
}

impl Movement {
    pub const ALL: [Movement; 10] = [
        Movement::Forward,
        Movement::Backward,
        Movement::Left,
        Movement::Right,
        Movement::Up,
        Movement::Down,
        Movement::LookLeft,
        Movement::LookRight,
        Movement::LookUp,
        Movement::LookDown,
    ];

    /// True for the four look (rotation) movements.
    pub fn is_look(self) -> bool {
        matches!(
            self,
            Movement::LookLeft | Movement::LookRight | Movement::LookUp | Movement::LookDown
        )
    }
}

/// Edge direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A single key transition, keyed by the logical key name (`"w"`, `"ArrowUp"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn pressed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Pressed,
        }
    }

    pub fn released(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Released,
        }
    }
}

/// Persistent movement intent: one flag per [`Movement`].
///
/// Written only by key edge events, read once per frame by the render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub look_left: bool,
    pub look_right: bool,
    pub look_up: bool,
    pub look_down: bool,
}

impl MovementIntent {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag_mut(&mut self, movement: Movement) -> &mut bool {
        match movement {
            Movement::Forward => &mut self.forward,
            Movement::Backward => &mut self.backward,
            Movement::Left => &mut self.left,
            Movement::Right => &mut self.right,
            Movement::Up => &mut self.up,
            Movement::Down => &mut self.down,
            Movement::LookLeft => &mut self.look_left,
            Movement::LookRight => &mut self.look_right,
            Movement::LookUp => &mut self.look_up,
            Movement::LookDown => &mut self.look_down,
        }
    }

    pub fn set(&mut self, movement: Movement, active: bool) {
        *self.flag_mut(movement) = active;
    }

    pub fn is_active(&self, movement: Movement) -> bool {
        match movement {
            Movement::Forward => self.forward,
            Movement::Backward => self.backward,
            Movement::Left => self.left,
            Movement::Right => self.right,
            Movement::Up => self.up,
            Movement::Down => self.down,
            Movement::LookLeft => self.look_left,
            Movement::LookRight => self.look_right,
            Movement::LookUp => self.look_up,
            Movement::LookDown => self.look_down,
        }
    }

    /// Apply one edge for an already-resolved movement.
    pub fn apply(&mut self, movement: Movement, state: KeyState) {
        self.set(movement, state == KeyState::Pressed);
    }

    /// Drop every flag, e.g. when the window loses focus and key-up events
    /// would otherwise be missed.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any_active(&self) -> bool {
        Movement::ALL.iter().any(|m| self.is_active(*m))
    }

    pub fn active(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::ALL.into_iter().filter(|m| self.is_active(*m))
    }
}

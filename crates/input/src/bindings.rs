use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::{KeyEvent, Movement, MovementIntent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("key {key:?} bound twice")]
    DuplicateKey { key: String },
    #[error("movement {movement:?} bound to both {first:?} and {second:?}")]
    DuplicateMovement {
        movement: Movement,
        first: String,
        second: String,
    },
    #[error("empty key name")]
    EmptyKey,
}

/// Key name → movement table. Key names are case-sensitive and follow the
/// `KeyboardEvent.key` spelling (`"w"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, Movement)>", into = "Vec<(String, Movement)>")]
pub struct KeyBindings {
    map: BTreeMap<String, Movement>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let table = [
            ("w", Movement::Forward),
            ("s", Movement::Backward),
            ("a", Movement::Left),
            ("d", Movement::Right),
            ("q", Movement::Up),
            ("e", Movement::Down),
            ("ArrowUp", Movement::LookUp),
            ("ArrowDown", Movement::LookDown),
            ("ArrowLeft", Movement::LookLeft),
            ("ArrowRight", Movement::LookRight),
        ];
        Self {
            map: table
                .into_iter()
                .map(|(k, m)| (k.to_string(), m))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Build from an explicit table. Each key and each movement may appear
    /// only once, so a flag always follows the last event of a single key.
    pub fn from_table<I, K>(table: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (K, Movement)>,
        K: Into<String>,
    {
        let mut map: BTreeMap<String, Movement> = BTreeMap::new();
        for (key, movement) in table {
            let key = key.into();
            if key.is_empty() {
                return Err(BindingError::EmptyKey);
            }
            if map.contains_key(&key) {
                return Err(BindingError::DuplicateKey { key });
            }
            if let Some((first, _)) = map.iter().find(|(_, m)| **m == movement) {
                return Err(BindingError::DuplicateMovement {
                    movement,
                    first: first.clone(),
                    second: key,
                });
            }
            map.insert(key, movement);
        }
        Ok(Self { map })
    }

    pub fn movement_for(&self, key: &str) -> Option<Movement> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Movement)> {
        self.map.iter().map(|(k, m)| (k.as_str(), *m))
    }

    /// Apply one key transition to `intent`. Returns the movement touched,
    /// or `None` for an unmapped key (the intent is left as is).
    pub fn handle(&self, intent: &mut MovementIntent, event: &KeyEvent) -> Option<Movement> {
        let Some(movement) = self.movement_for(&event.key) else {
            tracing::trace!(key = %event.key, "ignoring unmapped key");
            return None;
        };
        intent.apply(movement, event.state);
        Some(movement)
    }
}

impl TryFrom<Vec<(String, Movement)>> for KeyBindings {
    type Error = BindingError;

    fn try_from(table: Vec<(String, Movement)>) -> Result<Self, Self::Error> {
        Self::from_table(table)
    }
}

impl From<KeyBindings> for Vec<(String, Movement)> {
    fn from(bindings: KeyBindings) -> Self {
        bindings.map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::KeyState;

    #[test]
    fn default_bindings_cover_all_movements() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.len(), 10);
        for movement in Movement::ALL {
            assert!(bindings.iter().any(|(_, m)| m == movement), "{movement:?}");
        }
        assert_eq!(bindings.movement_for("q"), Some(Movement::Up));
        assert_eq!(bindings.movement_for("ArrowLeft"), Some(Movement::LookLeft));
    }

    #[test]
    fn key_names_are_case_sensitive() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.movement_for("W"), None);
        assert_eq!(bindings.movement_for("arrowup"), None);
    }

    #[test]
    fn flag_tracks_most_recent_event() {
        let bindings = KeyBindings::default();
        let mut intent = MovementIntent::new();
        let sequence = [
            ("w", KeyState::Pressed),
            ("a", KeyState::Pressed),
            ("w", KeyState::Released),
            ("w", KeyState::Pressed),
            ("a", KeyState::Released),
            ("ArrowUp", KeyState::Pressed),
            ("ArrowUp", KeyState::Pressed),
            ("e", KeyState::Released),
        ];

        let mut last: BTreeMap<&str, KeyState> = BTreeMap::new();
        for (key, state) in sequence {
            bindings.handle(&mut intent, &KeyEvent { key: key.to_string(), state });
            last.insert(key, state);

            for (name, movement) in bindings.iter() {
                let expected = last.get(name) == Some(&KeyState::Pressed);
                assert_eq!(intent.is_active(movement), expected, "{name}");
            }
        }
    }

    #[test]
    fn unmapped_keys_leave_intent_untouched() {
        let bindings = KeyBindings::default();
        let mut intent = MovementIntent::new();
        intent.set(Movement::Right, true);
        let before = intent;

        assert_eq!(bindings.handle(&mut intent, &KeyEvent::pressed("x")), None);
        assert_eq!(bindings.handle(&mut intent, &KeyEvent::released("Shift")), None);
        assert_eq!(intent, before);
    }

    #[test]
    fn from_table_rejects_duplicates() {
        let err = KeyBindings::from_table([("w", Movement::Forward), ("w", Movement::Backward)])
            .unwrap_err();
        assert_eq!(err, BindingError::DuplicateKey { key: "w".into() });
        assert_eq!(
            KeyBindings::from_table([("", Movement::Up)]).unwrap_err(),
            BindingError::EmptyKey
        );
    }

    #[test]
    fn custom_table_rebinds_keys() {
        let bindings =
            KeyBindings::from_table([("z", Movement::Forward), ("ArrowUp", Movement::LookUp)])
                .unwrap();
        let mut intent = MovementIntent::new();
        bindings.handle(&mut intent, &KeyEvent::pressed("z"));
        assert!(intent.forward);
        assert_eq!(bindings.movement_for("w"), None);
    }

    #[test]
    fn from_table_rejects_two_keys_for_one_movement() {
        let err =
            KeyBindings::from_table([("z", Movement::Forward), ("ArrowUp", Movement::Forward)])
                .unwrap_err();
        assert_eq!(
            err,
            BindingError::DuplicateMovement {
                movement: Movement::Forward,
                first: "z".into(),
                second: "ArrowUp".into(),
            }
        );

        let yaml = "- [w, forward]\n- [z, forward]\n";
        assert!(serde_yaml::from_str::<KeyBindings>(yaml).is_err());
    }

    #[test]
    fn yaml_table_roundtrip() {
        let yaml = "- [w, forward]\n- [ArrowLeft, lookLeft]\n";
        let bindings: KeyBindings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bindings.movement_for("ArrowLeft"), Some(Movement::LookLeft));
        let back = serde_yaml::to_string(&bindings).unwrap();
        let again: KeyBindings = serde_yaml::from_str(&back).unwrap();
        assert_eq!(again, bindings);

        let dup = "- [w, forward]\n- [w, up]\n";
        assert!(serde_yaml::from_str::<KeyBindings>(dup).is_err());
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::graph::NodeId;

/// Logical names of the demo's addressable objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectName {
    RegularCube,
    Plane,
    Ball,
    ShaderCube1,
    ShaderCube2,
    ShaderCube3,
    ShaderCube4,
    BeveledCube1,
}

impl ObjectName {
    pub const ALL: [ObjectName; 8] = [
        ObjectName::RegularCube,
        ObjectName::Plane,
        ObjectName::Ball,
        ObjectName::ShaderCube1,
        ObjectName::ShaderCube2,
        ObjectName::ShaderCube3,
        ObjectName::ShaderCube4,
        ObjectName::BeveledCube1,
    ];

    /// Objects that receive the per-frame spin.
    pub const SPINNING: [ObjectName; 5] = [
        ObjectName::RegularCube,
        ObjectName::ShaderCube1,
        ObjectName::ShaderCube2,
        ObjectName::ShaderCube3,
        ObjectName::ShaderCube4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectName::RegularCube => "regularCube",
            ObjectName::Plane => "plane",
            ObjectName::Ball => "ball",
            ObjectName::ShaderCube1 => "shaderCube1",
            ObjectName::ShaderCube2 => "shaderCube2",
            ObjectName::ShaderCube3 => "shaderCube3",
            ObjectName::ShaderCube4 => "shaderCube4",
            ObjectName::BeveledCube1 => "beveledcube1",
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object name {0:?}")]
pub struct UnknownObjectName(pub String);

impl FromStr for ObjectName {
    type Err = UnknownObjectName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| UnknownObjectName(s.to_string()))
    }
}

/// Name → node mapping, filled in as loads complete.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    entries: BTreeMap<ObjectName, NodeId>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, returning the node it replaced, if any.
    pub fn insert(&mut self, name: ObjectName, node: NodeId) -> Option<NodeId> {
        let previous = self.entries.insert(name, node);
        if previous.is_some() {
            tracing::warn!(%name, "object registered twice; keeping the newer node");
        }
        previous
    }

    pub fn get(&self, name: ObjectName) -> Option<NodeId> {
        self.entries.get(&name).copied()
    }

    pub fn contains(&self, name: ObjectName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn remove(&mut self, name: ObjectName) -> Option<NodeId> {
        self.entries.remove(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectName, NodeId)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}

// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client commands broadcast to every member of a group.
//!
//! A [`Command`] is an action name plus a position and an optional bag of
//! [`Extras`]. Core code never interprets the action; it is forwarded to
//! each member's client as-is by
//! [`SurfaceGroup::broadcast_command`](crate::group::SurfaceGroup::broadcast_command).

use alloc::collections::BTreeMap;
use alloc::string::String;

/// A single value stored in [`Extras`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
}

impl From<bool> for ExtraValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ExtraValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ExtraValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ExtraValue {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<String> for ExtraValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Ordered, string-keyed payload attached to a [`Command`].
///
/// Keys iterate in lexical order so that encoded payloads are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras {
    entries: BTreeMap<String, ExtraValue>,
}

impl Extras {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value for `key` if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ExtraValue>,
    ) -> Option<ExtraValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.entries.get(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A command dispatched to every member's client.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// Action name, opaque to the group.
    pub action: String,
    /// X coordinate, in display pixels.
    pub x: i32,
    /// Y coordinate, in display pixels.
    pub y: i32,
    /// Z coordinate or action-specific scalar.
    pub z: i32,
    /// Optional payload.
    pub extras: Option<Extras>,
}

impl Command {
    /// Creates a command with no payload.
    #[must_use]
    pub fn new(action: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            action: action.into(),
            x,
            y,
            z,
            extras: None,
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = Some(extras);
        self
    }
}

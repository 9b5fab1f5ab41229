//! Typed, named parameter map with a tri-state access model.
//!
//! Grounded on the original `RFEncoderSettings` map (`uiParameterName ->
//! MapEntry { state, type, value, preset values }`), reshaped into an
//! insertion-ordered map so iteration is deterministic without relying on
//! a `BTreeMap`'s numeric-key ordering (which is what the original
//! `std::map<unsigned int, MapEntry>` happens to give you, but isn't
//! actually what callers want: declaration order, not numeric order).

use std::collections::HashMap;

/// One of the four value kinds a parameter can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    UInt,
    Ptr,
}

/// Access state exposed to callers of `get_parameter`/`set_parameter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamState {
    /// Unknown or unsupported by the current configuration.
    Invalid,
    /// Writable.
    Ready,
    /// Known but read-only (e.g. fixed after `Init`).
    Blocked,
}

/// Which encoding preset a default value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Fast,
    Balanced,
    Quality,
}

/// A typed value; the active variant must match the parameter's `ParamType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Ptr(usize),
}

impl Value {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(v),
            Value::UInt(v) => Some(v as i32),
            Value::Bool(v) => Some(v as i32),
            Value::Ptr(v) => Some(v as i32),
        }
    }

    pub fn as_u32(self) -> Option<u32> {
        match self {
            Value::UInt(v) => Some(v),
            Value::Int(v) => Some(v as u32),
            Value::Bool(v) => Some(v as u32),
            Value::Ptr(v) => Some(v as u32),
        }
    }

    /// Widens to the raw `intptr_t`-style representation used by the C API.
    pub fn to_raw(self) -> isize {
        match self {
            Value::Bool(v) => v as isize,
            Value::Int(v) => v as isize,
            Value::UInt(v) => v as isize,
            Value::Ptr(v) => v as isize,
        }
    }
}

/// One entry of the parameter map.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: u32,
    pub ty: ParamType,
    value: Value,
    default: Value,
    presets: [Value; 3],
    state: ParamState,
    /// When true, `set` is rejected even if `state == Ready`; only
    /// `set_internal` (used by the encoder/session themselves, e.g. to
    /// mirror a successfully-applied vendor value) can change it.
    protected: bool,
}

impl Parameter {
    pub fn value(&self) -> Value {
        self.value
    }

    pub fn state(&self) -> ParamState {
        self.state
    }

    pub fn default(&self) -> Value {
        self.default
    }

    pub fn preset(&self, preset: Preset) -> Value {
        self.presets[preset as usize]
    }
}

/// Insertion-ordered, typed parameter table.
///
/// Lookup is O(1) via an index into the ordered backing `Vec`; iteration
/// follows registration order, so callers can rely on it being deterministic.
#[derive(Debug, Default)]
pub struct ParamMap {
    order: Vec<Parameter>,
    index: HashMap<u32, usize>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new parameter. Re-registering an existing name overwrites
    /// it in place (preserving its original position).
    pub fn register(
        &mut self,
        name: u32,
        ty: ParamType,
        default: Value,
        presets: [Value; 3],
        state: ParamState,
        protected: bool,
    ) {
        let param = Parameter {
            name,
            ty,
            value: default,
            default,
            presets,
            state,
            protected,
        };
        if let Some(&idx) = self.index.get(&name) {
            self.order[idx] = param;
        } else {
            self.index.insert(name, self.order.len());
            self.order.push(param);
        }
    }

    pub fn contains(&self, name: u32) -> bool {
        self.index.contains_key(&name)
    }

    /// Interprets a raw `intptr_t`-style FFI value as this parameter's
    /// registered [`ParamType`]. Used at the C API boundary, where every
    /// property value crosses as a plain integer with no type tag.
    pub fn value_from_raw(&self, name: u32, raw: isize) -> Option<Value> {
        let entry = self.get(name)?;
        Some(match entry.ty {
            ParamType::Bool => Value::Bool(raw != 0),
            ParamType::Int => Value::Int(raw as i32),
            ParamType::UInt => Value::UInt(raw as u32),
            ParamType::Ptr => Value::Ptr(raw as usize),
        })
    }

    pub fn get(&self, name: u32) -> Option<&Parameter> {
        self.index.get(&name).map(|&idx| &self.order[idx])
    }

    /// External-facing set: honors `protected` and `state`. Returns an error
    /// the caller can translate into `{ParamAccessDenied,
    /// InvalidEncoderParameter}`, matching how `set_encode_parameter` reports
    /// outcomes.
    pub fn set(&mut self, name: u32, value: Value) -> Result<(), ParamSetError> {
        let idx = *self.index.get(&name).ok_or(ParamSetError::Unknown)?;
        let entry = &mut self.order[idx];
        if entry.protected || entry.state != ParamState::Ready {
            return Err(ParamSetError::Denied);
        }
        entry.value = value;
        Ok(())
    }

    /// Internal set used by encoders/sessions to mirror an accepted value
    /// (e.g. after the vendor component confirmed it) regardless of the
    /// `protected` flag, and to (re)assign the resulting state.
    pub fn set_internal(&mut self, name: u32, value: Value, state: ParamState) {
        if let Some(&idx) = self.index.get(&name) {
            let entry = &mut self.order[idx];
            entry.value = value;
            entry.state = state;
        }
    }

    pub fn set_state(&mut self, name: u32, state: ParamState) {
        if let Some(&idx) = self.index.get(&name) {
            self.order[idx].state = state;
        }
    }

    /// Applies preset defaults to every registered parameter's current value.
    pub fn apply_preset(&mut self, preset: Preset) {
        for entry in &mut self.order {
            entry.value = entry.presets[preset as usize];
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSetError {
    Unknown,
    Denied,
}

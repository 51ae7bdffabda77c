use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ComponentError;
use crate::data::model::AudioFeature;

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

/// The value a widget currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ControlValue {
    fn from(s: &str) -> Self {
        ControlValue::Text(s.to_string())
    }
}

impl From<f64> for ControlValue {
    fn from(v: f64) -> Self {
        ControlValue::Number(v)
    }
}

impl From<bool> for ControlValue {
    fn from(v: bool) -> Self {
        ControlValue::Flag(v)
    }
}

impl From<Vec<String>> for ControlValue {
    fn from(v: Vec<String>) -> Self {
        ControlValue::List(v)
    }
}

/// One selectable entry of a dropdown, multi-select or checklist.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOption {
    pub label: String,
    pub value: ControlValue,
}

impl ControlOption {
    pub fn new(label: impl Into<String>, value: impl Into<ControlValue>) -> Self {
        ControlOption {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option whose label and value are the same text.
    pub fn text(value: &str) -> Self {
        ControlOption::new(value, value)
    }

    pub fn feature(feature: AudioFeature) -> Self {
        ControlOption::new(feature.label(), feature.column())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Dropdown(Vec<ControlOption>),
    MultiSelect(Vec<ControlOption>),
    Checklist(Vec<ControlOption>),
    Toggle,
    Slider { min: f64, max: f64, step: f64 },
    Number { min: f64, max: f64 },
}

/// A widget declared by a component's layout, with its default value.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
    pub default: ControlValue,
}

impl ControlSpec {
    pub fn new(id: &'static str, label: &'static str, kind: ControlKind, default: impl Into<ControlValue>) -> Self {
        ControlSpec {
            id,
            label,
            kind,
            default: default.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlValues – the values handed to one update
// ---------------------------------------------------------------------------

/// Current values of one component's controls, keyed by control id.
///
/// A missing control reads as its documented fallback, the way an unset
/// widget does; a present value of the wrong shape is an
/// [`ComponentError::InvalidControl`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlValues(BTreeMap<String, ControlValue>);

impl ControlValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values taken from the declared defaults of a layout.
    pub fn from_defaults(specs: &[ControlSpec]) -> Self {
        ControlValues(
            specs
                .iter()
                .map(|spec| (spec.id.to_string(), spec.default.clone()))
                .collect(),
        )
    }

    pub fn with(mut self, id: &str, value: impl Into<ControlValue>) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(&mut self, id: &str, value: impl Into<ControlValue>) {
        self.0.insert(id.to_string(), value.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<ControlValue> {
        self.0.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&ControlValue> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ControlValue> {
        self.0.get_mut(id)
    }

    fn invalid(id: &str, expected: &str, got: &ControlValue) -> ComponentError {
        ComponentError::InvalidControl {
            control: id.to_string(),
            reason: format!("expected {expected}, got {got:?}"),
        }
    }

    pub fn text_or<'a>(&'a self, id: &str, fallback: &'a str) -> Result<&'a str, ComponentError> {
        match self.get(id) {
            None => Ok(fallback),
            Some(ControlValue::Text(s)) if s.is_empty() => Ok(fallback),
            Some(ControlValue::Text(s)) => Ok(s),
            Some(other) => Err(Self::invalid(id, "text", other)),
        }
    }

    /// Numeric value; text input boxes hand over their raw string.
    pub fn number_or(&self, id: &str, fallback: f64) -> Result<f64, ComponentError> {
        match self.get(id) {
            None => Ok(fallback),
            Some(ControlValue::Number(v)) => Ok(*v),
            Some(ControlValue::Text(s)) if s.trim().is_empty() => Ok(fallback),
            Some(value @ ControlValue::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| Self::invalid(id, "a number", value)),
            Some(other) => Err(Self::invalid(id, "a number", other)),
        }
    }

    /// Multi-select value; a single text counts as a one-item list.
    pub fn list(&self, id: &str) -> Result<Vec<String>, ComponentError> {
        match self.get(id) {
            None => Ok(Vec::new()),
            Some(ControlValue::List(items)) => Ok(items.clone()),
            Some(ControlValue::Text(s)) if s.is_empty() => Ok(Vec::new()),
            Some(ControlValue::Text(s)) => Ok(vec![s.clone()]),
            Some(other) => Err(Self::invalid(id, "a list", other)),
        }
    }

    /// Toggle state. A checklist toggle is on when it lists `enabled`.
    pub fn flag(&self, id: &str) -> Result<bool, ComponentError> {
        match self.get(id) {
            None => Ok(false),
            Some(ControlValue::Flag(b)) => Ok(*b),
            Some(ControlValue::List(items)) => Ok(items.iter().any(|i| i == "enabled")),
            Some(other) => Err(Self::invalid(id, "a toggle", other)),
        }
    }

    /// One of `allowed`, named by its column.
    pub fn feature_or(
        &self,
        id: &str,
        fallback: AudioFeature,
        allowed: &[AudioFeature],
    ) -> Result<AudioFeature, ComponentError> {
        let name = self.text_or(id, fallback.column())?;
        AudioFeature::from_column(name)
            .filter(|f| allowed.contains(f))
            .ok_or_else(|| ComponentError::UnknownFeature(name.to_string()))
    }

    /// A list of features; unknown names are an error.
    pub fn features(&self, id: &str, allowed: &[AudioFeature]) -> Result<Vec<AudioFeature>, ComponentError> {
        self.list(id)?
            .iter()
            .map(|name| {
                AudioFeature::from_column(name)
                    .filter(|f| allowed.contains(f))
                    .ok_or_else(|| ComponentError::UnknownFeature(name.clone()))
            })
            .collect()
    }
}

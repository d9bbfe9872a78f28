use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Name of one field within a form.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(Cow<'static, str>);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Unset,
    Text(String),
    Bool(bool),
    Number(Decimal),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Unset`, or text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Unset => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed after trimming so that
    /// literal input from number fields compares as a number.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => Decimal::from_str(text.trim()).ok(),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Unset => "unset",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "bool",
            FieldValue::Number(_) => "number",
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Unset => Ok(()),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

/// Full set of field values held by a form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormValues(BTreeMap<FieldKey, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Like [`FormValues::get`] but missing keys read as [`FieldValue::Unset`].
    pub fn value(&self, key: &str) -> &FieldValue {
        static UNSET: FieldValue = FieldValue::Unset;
        self.0.get(key).unwrap_or(&UNSET)
    }

    pub fn insert(&mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Shallow merge: every entry of `patch` overwrites the same key here.
    pub fn merge(&mut self, patch: FormValues) {
        self.0.extend(patch.0);
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, FieldValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<FieldKey>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FormValues {
    type Item = (FieldKey, FieldValue);
    type IntoIter = btree_map::IntoIter<FieldKey, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Per-field error messages. A missing entry means the field has no error.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormErrors(BTreeMap<FieldKey, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keeps an existing message for `key`; the first error reported wins.
    pub fn add(&mut self, key: impl Into<FieldKey>, message: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| message.into());
    }

    pub fn insert(&mut self, key: impl Into<FieldKey>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, M> FromIterator<(K, M)> for FormErrors
where
    K: Into<FieldKey>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, M)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (key, message) in iter {
            errors.add(key, message);
        }
        errors
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("expected {expected} value, found {found}")]
pub struct FieldValueError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl FieldValueError {
    fn new(expected: &'static str, value: &FieldValue) -> Self {
        Self {
            expected,
            found: value.kind(),
        }
    }
}

/// Conversion between a typed record field and its form value.
pub trait FormField: Sized {
    fn to_field_value(&self) -> FieldValue;
    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError>;
}

impl FormField for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        match value {
            FieldValue::Unset => Ok(String::new()),
            FieldValue::Text(text) => Ok(text.clone()),
            FieldValue::Number(number) => Ok(number.to_string()),
            FieldValue::Bool(_) => Err(FieldValueError::new("text", value)),
        }
    }
}

impl FormField for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        match value {
            FieldValue::Unset => Ok(false),
            FieldValue::Bool(flag) => Ok(*flag),
            _ => Err(FieldValueError::new("bool", value)),
        }
    }
}

impl FormField for Decimal {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(*self)
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        value
            .as_decimal()
            .ok_or_else(|| FieldValueError::new("number", value))
    }
}

impl FormField for i64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(Decimal::from(*self))
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        value
            .as_decimal()
            .filter(|number| number.fract().is_zero())
            .and_then(|number| number.to_i64())
            .ok_or_else(|| FieldValueError::new("integer", value))
    }
}

impl FormField for u32 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(Decimal::from(*self))
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        value
            .as_decimal()
            .filter(|number| number.fract().is_zero())
            .and_then(|number| number.to_u32())
            .ok_or_else(|| FieldValueError::new("unsigned integer", value))
    }
}

impl<T> FormField for Option<T>
where
    T: FormField,
{
    fn to_field_value(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Unset, T::to_field_value)
    }

    fn from_field_value(value: &FieldValue) -> Result<Self, FieldValueError> {
        if value.is_blank() {
            return Ok(None);
        }
        T::from_field_value(value).map(Some)
    }
}

/// A typed record that can populate a form and be read back from it.
/// Usually derived with `#[derive(FormModel)]`.
pub trait FormModel: Sized {
    fn field_keys() -> Vec<FieldKey>;
    fn to_values(&self) -> FormValues;
    fn from_values(values: &FormValues) -> Result<Self, (FieldKey, FieldValueError)>;
}

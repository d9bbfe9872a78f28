use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

use super::value::{FieldKey, FieldValue, FormErrors, FormValues};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

type ValidatorFn = Arc<dyn Fn(&FieldValue) -> Option<String> + Send + Sync>;

/// Checks a single field value, returning an error message on failure.
#[derive(Clone)]
pub struct Validator(ValidatorFn);

impl Validator {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn validate(&self, value: &FieldValue) -> Option<String> {
        (self.0)(value)
    }

    /// Replaces whatever message this validator reports with `message`.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |value| self.validate(value).map(|_| message.clone()))
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validator(..)")
    }
}

fn rejecting(
    message: String,
    fails: impl Fn(&FieldValue) -> bool + Send + Sync + 'static,
) -> Validator {
    Validator::new(move |value| {
        if value.is_blank() {
            return None;
        }
        fails(value).then(|| message.clone())
    })
}

fn char_len(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(text) => text.chars().count(),
        other => other.to_string().chars().count(),
    }
}

/// The only validator that rejects blank values, including whitespace-only text.
pub fn required() -> Validator {
    Validator::new(|value| {
        value
            .is_blank()
            .then(|| "Este campo es requerido".to_string())
    })
}

pub fn email() -> Validator {
    rejecting("Email inválido".to_string(), |value| match value {
        FieldValue::Text(text) => !EMAIL_PATTERN.is_match(text),
        _ => true,
    })
}

pub fn min_length(min: usize) -> Validator {
    rejecting(format!("Debe tener al menos {min} caracteres"), move |value| {
        char_len(value) < min
    })
}

pub fn max_length(max: usize) -> Validator {
    rejecting(format!("Debe tener máximo {max} caracteres"), move |value| {
        char_len(value) > max
    })
}

/// Accepts numbers and text that parses as a decimal.
pub fn min(min: Decimal) -> Validator {
    rejecting(format!("El valor mínimo es {min}"), move |value| {
        value.as_decimal().is_none_or(|number| number < min)
    })
}

pub fn max(max: Decimal) -> Validator {
    rejecting(format!("El valor máximo es {max}"), move |value| {
        value.as_decimal().is_none_or(|number| number > max)
    })
}

pub fn pattern(regex: Regex) -> Validator {
    rejecting("Formato inválido".to_string(), move |value| {
        !regex.is_match(&value.to_string())
    })
}

/// Runs `validators` in order and reports the first failure.
pub fn compose_validators(validators: impl IntoIterator<Item = Validator>) -> Validator {
    let validators: Vec<Validator> = validators.into_iter().collect();
    Validator::new(move |value| {
        validators
            .iter()
            .find_map(|validator| validator.validate(value))
    })
}

/// Computes every field error from the full set of values.
pub trait ValidationSchema: Send + Sync {
    fn validate(&self, values: &FormValues) -> FormErrors;
}

impl<F> ValidationSchema for F
where
    F: Fn(&FormValues) -> FormErrors + Send + Sync,
{
    fn validate(&self, values: &FormValues) -> FormErrors {
        (self)(values)
    }
}

type RuleFn = Arc<dyn Fn(&FormValues) -> Vec<(FieldKey, String)> + Send + Sync>;

/// Field validators plus cross-field rules. Field validators run first and
/// the first error recorded for a field wins.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(FieldKey, Validator)>,
    rules: Vec<RuleFn>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<FieldKey>, validator: Validator) -> Self {
        self.fields.push((key.into(), validator));
        self
    }

    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&FormValues) -> Vec<(FieldKey, String)> + Send + Sync + 'static,
    {
        self.rules.push(Arc::new(rule));
        self
    }
}

impl ValidationSchema for Schema {
    fn validate(&self, values: &FormValues) -> FormErrors {
        let mut errors = FormErrors::new();
        for (key, validator) in &self.fields {
            if errors.contains(key.as_str()) {
                continue;
            }
            if let Some(message) = validator.validate(values.value(key.as_str())) {
                errors.add(key.clone(), message);
            }
        }
        for rule in &self.rules {
            for (key, message) in rule(values) {
                errors.add(key, message);
            }
        }
        errors
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field(
                "fields",
                &self.fields.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .field("rules", &self.rules.len())
            .finish()
    }
}

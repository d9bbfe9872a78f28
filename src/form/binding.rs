use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::warn;

use super::controller::{FormController, FormResult, read_lock};
use super::value::{FieldKey, FieldValue};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InputKind {
    #[default]
    Text,
    Password,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Switch,
}

impl InputKind {
    pub fn is_checkbox_like(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Switch)
    }
}

/// Change notification from an input control.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub name: FieldKey,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

impl ChangeEvent {
    pub fn new(name: impl Into<FieldKey>, kind: InputKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            checked: false,
        }
    }

    pub fn text(name: impl Into<FieldKey>, value: impl Into<String>) -> Self {
        Self::new(name, InputKind::Text, value)
    }

    pub fn checkbox(name: impl Into<FieldKey>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(name, InputKind::Checkbox, "on")
        }
    }

    /// Checkbox-like controls report their checked state; everything else
    /// reports the literal input text, number fields included.
    pub fn field_value(&self) -> FieldValue {
        if self.kind.is_checkbox_like() {
            FieldValue::Bool(self.checked)
        } else {
            FieldValue::Text(self.value.clone())
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlurEvent {
    pub name: FieldKey,
}

impl BlurEvent {
    pub fn new(name: impl Into<FieldKey>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type ChangeHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;
pub type BlurHandler = Arc<dyn Fn(&BlurEvent) + Send + Sync>;

/// Everything an input control needs to bind to one field.
#[derive(Clone)]
pub struct FieldProps {
    pub name: FieldKey,
    pub value: FieldValue,
    pub on_change: ChangeHandler,
    pub on_blur: BlurHandler,
    /// Present only once the field has been touched.
    pub error: Option<String>,
}

impl Debug for FieldProps {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProps")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl FormController {
    pub fn handle_change(&self, event: &ChangeEvent) -> FormResult<()> {
        self.mark_touched_silently(&event.name)?;
        self.set_value(event.name.clone(), event.field_value())
    }

    pub fn handle_blur(&self, event: &BlurEvent) -> FormResult<()> {
        self.mark_touched(event.name.clone())
    }

    pub fn field_props(&self, key: impl Into<FieldKey>) -> FormResult<FieldProps> {
        let key = key.into();
        let value = self.value(key.as_str())?;
        let error = self.field_error_for_display(key.as_str())?;

        let controller = self.clone();
        let on_change: ChangeHandler = Arc::new(move |event: &ChangeEvent| {
            if let Err(error) = controller.handle_change(event) {
                warn!(field = %event.name, %error, "dropping field change");
            }
        });
        let controller = self.clone();
        let on_blur: BlurHandler = Arc::new(move |event: &BlurEvent| {
            if let Err(error) = controller.handle_blur(event) {
                warn!(field = %event.name, %error, "dropping field blur");
            }
        });

        Ok(FieldProps {
            name: key,
            value,
            on_change,
            on_blur,
            error,
        })
    }

    /// The field's error, hidden until the field has been touched.
    pub fn field_error_for_display(&self, key: &str) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading display error message")?;
        if !state.touched.contains(key) {
            return Ok(None);
        }
        Ok(state.errors.get(key).map(str::to_owned))
    }
}

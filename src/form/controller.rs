use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, error, trace};

use super::binding::SubmitEvent;
use super::validation::ValidationSchema;
use super::value::{FieldKey, FieldValue, FieldValueError, FormErrors, FormModel, FormValues};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

/// When field-level validation runs. Submit always validates the whole form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_on_change: bool,
    pub validate_on_blur: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            validate_on_blur: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormSnapshot {
    pub values: FormValues,
    pub errors: FormErrors,
    pub touched: BTreeSet<FieldKey>,
    pub is_submitting: bool,
    pub submit_count: u32,
    pub is_valid: bool,
    pub is_dirty: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the submit handler was not called.
    Invalid(FormErrors),
    Submitted,
    /// The submit handler failed and its error went to the reporter.
    Failed,
    NoHandler,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("field `{field}` cannot be converted: {source}")]
    FieldConversion {
        field: FieldKey,
        #[source]
        source: FieldValueError,
    },
}

pub type FormResult<T> = Result<T, FormError>;

pub type SubmitHandler =
    Arc<dyn Fn(FormValues) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
pub type SubmitErrorReporter = Arc<dyn Fn(FormId, &anyhow::Error) + Send + Sync>;

pub(super) struct FormState {
    pub(super) initial_values: FormValues,
    pub(super) values: FormValues,
    pub(super) errors: FormErrors,
    pub(super) touched: BTreeSet<FieldKey>,
    pub(super) submitting: bool,
    pub(super) submit_count: u32,
}

impl FormState {
    fn set_field_error(&mut self, key: FieldKey, message: Option<String>) {
        match message {
            Some(message) => self.errors.insert(key, message),
            None => {
                self.errors.remove(key.as_str());
            }
        }
    }
}

/// Owns the values, errors and touched state of one mounted form.
///
/// Clones share the same state, which is how bound field handlers reach back
/// into the form. `is_valid` and `is_dirty` are computed on every read.
#[derive(Clone)]
pub struct FormController {
    pub(super) id: FormId,
    pub(super) options: FormOptions,
    pub(super) schema: Option<Arc<dyn ValidationSchema>>,
    pub(super) on_submit: Option<SubmitHandler>,
    pub(super) report_submit_error: SubmitErrorReporter,
    pub(super) state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn new(initial: FormValues, options: FormOptions) -> Self {
        Self {
            id: FormId::next(),
            options,
            schema: None,
            on_submit: None,
            report_submit_error: Arc::new(log_submit_error),
            state: Arc::new(RwLock::new(FormState {
                initial_values: initial.clone(),
                values: initial,
                errors: FormErrors::new(),
                touched: BTreeSet::new(),
                submitting: false,
                submit_count: 0,
            })),
        }
    }

    pub fn from_model<M>(model: &M, options: FormOptions) -> Self
    where
        M: FormModel,
    {
        Self::new(model.to_values(), options)
    }

    pub fn with_schema(mut self, schema: impl ValidationSchema + 'static) -> Self {
        let schema: Arc<dyn ValidationSchema> = Arc::new(schema);
        self.schema = Some(schema);
        self
    }

    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let wrapped: SubmitHandler = Arc::new(move |values: FormValues| handler(values).boxed());
        self.on_submit = Some(wrapped);
        self
    }

    /// Replaces the default reporter, which logs the failure with `tracing`.
    pub fn on_submit_error(
        mut self,
        reporter: impl Fn(FormId, &anyhow::Error) + Send + Sync + 'static,
    ) -> Self {
        self.report_submit_error = Arc::new(reporter);
        self
    }

    pub fn form_id(&self) -> FormId {
        self.id
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    /// Writes `value` and, when change validation is on, refreshes only
    /// this field's error. Other error entries are left as they are.
    pub fn set_value(
        &self,
        key: impl Into<FieldKey>,
        value: impl Into<FieldValue>,
    ) -> FormResult<()> {
        let key = key.into();
        {
            let mut state = write_lock(&self.state, "writing field value")?;
            state.values.insert(key.clone(), value.into());
        }

        if self.options.validate_on_change {
            self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    pub fn mark_touched(&self, key: impl Into<FieldKey>) -> FormResult<()> {
        let key = key.into();
        {
            let mut state = write_lock(&self.state, "touching field")?;
            state.touched.insert(key.clone());
        }

        if self.options.validate_on_blur {
            self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    /// Shallow-merges `patch` into the current values without validating.
    pub fn set_form_values(&self, patch: FormValues) -> FormResult<()> {
        let mut state = write_lock(&self.state, "merging form values")?;
        state.values.merge(patch);
        Ok(())
    }

    pub fn set_form_model<M>(&self, model: &M) -> FormResult<()>
    where
        M: FormModel,
    {
        self.set_form_values(model.to_values())
    }

    pub fn model<M>(&self) -> FormResult<M>
    where
        M: FormModel,
    {
        let state = read_lock(&self.state, "reading form model")?;
        M::from_values(&state.values)
            .map_err(|(field, source)| FormError::FieldConversion { field, source })
    }

    /// Replaces the whole error set with the schema's verdict, or clears it
    /// when the form has no schema.
    pub fn validate_form(&self) -> FormResult<FormErrors> {
        let values = self.values()?;
        let errors = match &self.schema {
            Some(schema) => schema.validate(&values),
            None => FormErrors::new(),
        };
        trace!(form_id = self.id.0, errors = errors.len(), "validated form");

        let mut state = write_lock(&self.state, "applying form validation result")?;
        state.errors = errors.clone();
        Ok(errors)
    }

    /// Touches every field, validates the whole form and, when it is clean,
    /// awaits the submit handler with the current values.
    ///
    /// The submitting flag is released however this future finishes. Calls
    /// made while a submit is in flight are not rejected; callers gate on
    /// [`FormController::is_submitting`].
    pub async fn submit(&self, event: &mut SubmitEvent) -> FormResult<SubmitOutcome> {
        event.prevent_default();
        {
            let mut state = write_lock(&self.state, "preparing submit")?;
            state.submitting = true;
            state.submit_count = state.submit_count.saturating_add(1);
            let keys = state.values.keys().cloned().collect::<Vec<_>>();
            state.touched.extend(keys);
        }
        let _release = SubmittingGuard { state: &self.state };

        let errors = self.validate_form()?;
        if !errors.is_empty() {
            debug!(
                form_id = self.id.0,
                errors = errors.len(),
                "submit stopped by validation"
            );
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let Some(handler) = self.on_submit.clone() else {
            return Ok(SubmitOutcome::NoHandler);
        };
        let values = self.values()?;
        debug!(form_id = self.id.0, fields = values.len(), "submitting form");
        match handler(values).await {
            Ok(()) => {
                debug!(form_id = self.id.0, "form submitted");
                Ok(SubmitOutcome::Submitted)
            }
            Err(error) => {
                (self.report_submit_error)(self.id, &error);
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    pub fn reset(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.values = state.initial_values.clone();
        state.errors.clear();
        state.touched.clear();
        state.submitting = false;
        Ok(())
    }

    pub fn values(&self) -> FormResult<FormValues> {
        Ok(read_lock(&self.state, "reading form values")?.values.clone())
    }

    pub fn value(&self, key: &str) -> FormResult<FieldValue> {
        Ok(read_lock(&self.state, "reading field value")?
            .values
            .value(key)
            .clone())
    }

    pub fn errors(&self) -> FormResult<FormErrors> {
        Ok(read_lock(&self.state, "reading form errors")?.errors.clone())
    }

    pub fn touched(&self) -> FormResult<BTreeSet<FieldKey>> {
        Ok(read_lock(&self.state, "reading touched fields")?
            .touched
            .clone())
    }

    pub fn is_touched(&self, key: &str) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading touched field")?
            .touched
            .contains(key))
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit flag")?.submitting)
    }

    pub fn submit_count(&self) -> FormResult<u32> {
        Ok(read_lock(&self.state, "reading submit count")?.submit_count)
    }

    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading validity")?.errors.is_empty())
    }

    pub fn is_dirty(&self) -> FormResult<bool> {
        let state = read_lock(&self.state, "reading dirty state")?;
        Ok(state.values != state.initial_values)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            values: state.values.clone(),
            errors: state.errors.clone(),
            touched: state.touched.clone(),
            is_submitting: state.submitting,
            submit_count: state.submit_count,
            is_valid: state.errors.is_empty(),
            is_dirty: state.values != state.initial_values,
        })
    }

    pub(super) fn validate_field_by_key(&self, key: FieldKey) -> FormResult<()> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        let values = self.values()?;
        let message = schema.validate(&values).remove(key.as_str());
        trace!(
            form_id = self.id.0,
            field = %key,
            failed = message.is_some(),
            "validated field"
        );

        let mut state = write_lock(&self.state, "writing field validation result")?;
        state.set_field_error(key, message);
        Ok(())
    }

    pub(super) fn mark_touched_silently(&self, key: &FieldKey) -> FormResult<()> {
        let mut state = write_lock(&self.state, "touching changed field")?;
        state.touched.insert(key.clone());
        Ok(())
    }
}

struct SubmittingGuard<'a> {
    state: &'a RwLock<FormState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.submitting = false;
    }
}

fn log_submit_error(form_id: FormId, error: &anyhow::Error) {
    error!(form_id = form_id.0, error = %error, "form submit handler failed");
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}

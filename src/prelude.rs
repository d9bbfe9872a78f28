pub use crate::form::{
    BlurEvent, ChangeEvent, FieldKey, FieldProps, FieldValue, FormController, FormErrors,
    FormModel, FormOptions, FormResult, FormValues, InputKind, Schema, SubmitEvent, SubmitOutcome,
    ValidationSchema, Validator, compose_validators, email, max, max_length, min, min_length,
    pattern, required,
};

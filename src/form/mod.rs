mod binding;
mod controller;
pub mod schemas;
mod validation;
mod value;


pub use binding::{
    BlurEvent, BlurHandler, ChangeEvent, ChangeHandler, FieldProps, InputKind, SubmitEvent,
};
pub use controller::{
    FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot, SubmitErrorReporter,
    SubmitHandler, SubmitOutcome,
};
pub use ferreteria_form_derive::FormModel;
pub use validation::{
    Schema, ValidationSchema, Validator, compose_validators, email, max, max_length, min,
    min_length, pattern, required,
};
pub use value::{
    FieldKey, FieldValue, FieldValueError, FormErrors, FormField, FormModel, FormValues,
};

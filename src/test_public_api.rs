use crate::form::FormModel as _;
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq, crate::form::FormModel)]
struct ApiSmokeForm {
    title: String,
    enabled: bool,
    amount: Decimal,
}

fn validate_smoke_title(values: &crate::form::FormValues) -> crate::form::FormErrors {
    let mut errors = crate::form::FormErrors::new();
    if values.value("title").is_blank() {
        errors.add("title", "title required");
    }
    errors
}

#[test]
fn prelude_exports_form_engine_surface() {
    use crate::prelude::*;

    let controller = FormController::new(FormValues::new(), FormOptions::default())
        .with_schema(Schema::new().field("title", compose_validators([required()])));
    let props: FieldProps = controller.field_props("title").expect("field props");
    assert_eq!(props.value, FieldValue::Unset);
    assert_eq!(props.error, None);
    let _ = (BlurEvent::new("title"), ChangeEvent::text("title", "x"), InputKind::Text);
    let _ = SubmitEvent::new();
}

#[test]
fn schemas_module_is_public() {
    let _ = crate::form::schemas::login_schema();
    let _ = crate::form::schemas::product_schema();
    let _ = crate::form::schemas::client_schema();
    assert_eq!(crate::form::schemas::fields::TAX_ID.as_str(), "tax_id");
}

#[test]
fn derived_model_drives_controller() {
    let model = ApiSmokeForm {
        title: String::new(),
        enabled: true,
        amount: Decimal::ONE,
    };
    let controller =
        crate::form::FormController::from_model(&model, crate::form::FormOptions::default())
            .with_schema(validate_smoke_title);

    assert_eq!(ApiSmokeForm::field_keys().len(), 3);
    assert!(!controller.validate_form().expect("validate form").is_empty());
    controller
        .set_value("title", "Catálogo de herramientas")
        .expect("set title");
    assert!(controller.is_valid().expect("is valid"));
    assert_eq!(
        controller.model::<ApiSmokeForm>().expect("model").title,
        "Catálogo de herramientas"
    );
}

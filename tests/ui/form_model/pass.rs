use ferreteria::form::{FieldValue, FormModel};
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq, ferreteria::form::FormModel)]
struct ProductForm {
    name: String,
    price: Decimal,
    active: bool,
    supplier: Option<String>,
}

fn main() {
    let product = ProductForm {
        name: "Martillo".to_string(),
        price: Decimal::new(1250, 2),
        active: true,
        supplier: None,
    };
    let values = product.to_values();
    assert_eq!(values.get("name"), Some(&FieldValue::text("Martillo")));
    assert_eq!(values.get("supplier"), Some(&FieldValue::Unset));
    assert_eq!(ProductForm::field_keys().len(), 4);
    assert_eq!(ProductForm::from_values(&values), Ok(product));
}

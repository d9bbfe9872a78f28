//! Schemas for the admin panel's login, product and client forms.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::validation::{
    Schema, compose_validators, email, max_length, min, min_length, pattern, required,
};
use super::value::{FieldKey, FormValues};

static PRODUCT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9-]{3,20}$").expect("product code pattern must compile")
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9 ()-]{7,20}$").expect("phone pattern must compile")
});
static WHOLE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("whole number pattern must compile"));

pub mod fields {
    use super::FieldKey;

    pub const EMAIL: FieldKey = FieldKey::new("email");
    pub const PASSWORD: FieldKey = FieldKey::new("password");
    pub const NAME: FieldKey = FieldKey::new("name");
    pub const CODE: FieldKey = FieldKey::new("code");
    pub const PRICE: FieldKey = FieldKey::new("price");
    pub const COST: FieldKey = FieldKey::new("cost");
    pub const STOCK: FieldKey = FieldKey::new("stock");
    pub const PHONE: FieldKey = FieldKey::new("phone");
    pub const TAX_ID: FieldKey = FieldKey::new("tax_id");
}

pub fn login_schema() -> Schema {
    Schema::new()
        .field(
            fields::EMAIL,
            compose_validators([required().with_message("El email es requerido"), email()]),
        )
        .field(
            fields::PASSWORD,
            compose_validators([
                required().with_message("La contraseña es requerida"),
                min_length(6),
            ]),
        )
}

pub fn product_schema() -> Schema {
    Schema::new()
        .field(
            fields::NAME,
            compose_validators([
                required().with_message("El nombre es requerido"),
                max_length(100),
            ]),
        )
        .field(
            fields::CODE,
            pattern(PRODUCT_CODE.clone())
                .with_message("Código inválido (A-Z, 0-9 y guiones, 3 a 20 caracteres)"),
        )
        .field(
            fields::PRICE,
            compose_validators([
                required().with_message("El precio es requerido"),
                min(Decimal::ZERO),
            ]),
        )
        .field(fields::COST, min(Decimal::ZERO))
        .field(
            fields::STOCK,
            compose_validators([
                min(Decimal::ZERO),
                pattern(WHOLE_NUMBER.clone()).with_message("El stock debe ser un número entero"),
            ]),
        )
        .rule(price_not_below_cost)
}

pub fn client_schema() -> Schema {
    Schema::new()
        .field(
            fields::NAME,
            compose_validators([
                required().with_message("El nombre es requerido"),
                max_length(120),
            ]),
        )
        .field(fields::EMAIL, email())
        .field(
            fields::PHONE,
            pattern(PHONE.clone()).with_message("Teléfono inválido"),
        )
        .field(fields::TAX_ID, max_length(13))
}

fn price_not_below_cost(values: &FormValues) -> Vec<(FieldKey, String)> {
    let price = values.value(fields::PRICE.as_str()).as_decimal();
    let cost = values.value(fields::COST.as_str()).as_decimal();
    match (price, cost) {
        (Some(price), Some(cost)) if price < cost => vec![(
            fields::PRICE,
            "El precio de venta no puede ser menor al costo".to_string(),
        )],
        _ => Vec::new(),
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{
    dto::orders::CreatedOrder,
    services::order_service::CREDIT_CARD,
    shop::{
        ApiClient, ClientError, ORDER_FAILED,
        cart::{Cart, CartItem, CartStore},
    },
};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{16}$").expect("valid card number pattern"));
static CARD_EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}$").expect("valid expiry pattern"));
static CARD_CVC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("valid cvc pattern"));

static SHIPPING_FIELDS: [Field; 7] = [
    Field::FirstName,
    Field::LastName,
    Field::Email,
    Field::Address,
    Field::City,
    Field::PostalCode,
    Field::Country,
];
static PAYMENT_FIELDS: [Field; 3] = [Field::CardNumber, Field::CardExpiry, Field::CardCvc];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Shipping,
    Payment,
    Review,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Shipping => 1,
            Step::Payment => 2,
            Step::Review => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Shipping => "Shipping Information",
            Step::Payment => "Payment Information",
            Step::Review => "Order Summary",
        }
    }

    /// Form fields entered on this step.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Shipping => &SHIPPING_FIELDS,
            Step::Payment => &PAYMENT_FIELDS,
            Step::Review => &[],
        }
    }

    fn next(self) -> Self {
        match self {
            Step::Shipping => Step::Payment,
            Step::Payment | Step::Review => Step::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            Step::Shipping | Step::Payment => Step::Shipping,
            Step::Review => Step::Payment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Address,
    City,
    PostalCode,
    Country,
    CardNumber,
    CardExpiry,
    CardCvc,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Address,
        Field::City,
        Field::PostalCode,
        Field::Country,
        Field::CardNumber,
        Field::CardExpiry,
        Field::CardCvc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Email => "Email Address",
            Field::Address => "Address",
            Field::City => "City",
            Field::PostalCode => "Postal Code",
            Field::Country => "Country",
            Field::CardNumber => "Card Number",
            Field::CardExpiry => "Expiry Date (MM/YY)",
            Field::CardCvc => "CVC",
        }
    }

    /// Validation message for `value`, or `None` when it is acceptable.
    pub fn check(self, value: &str) -> Option<&'static str> {
        let value = value.trim();
        if value.is_empty() {
            return Some("Required");
        }
        let (pattern, message) = match self {
            Field::Email => (&EMAIL, "Invalid email"),
            Field::CardNumber => (&CARD_NUMBER, "Invalid card number"),
            Field::CardExpiry => (&CARD_EXPIRY, "Invalid expiry date"),
            Field::CardCvc => (&CARD_CVC, "Invalid CVC"),
            _ => return None,
        };
        (!pattern.is_match(value)).then_some(message)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub type FieldErrors = BTreeMap<Field, &'static str>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

impl CheckoutForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::PostalCode => &self.postal_code,
            Field::Country => &self.country,
            Field::CardNumber => &self.card_number,
            Field::CardExpiry => &self.card_expiry,
            Field::CardCvc => &self.card_cvc,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::PostalCode => &mut self.postal_code,
            Field::Country => &mut self.country,
            Field::CardNumber => &mut self.card_number,
            Field::CardExpiry => &mut self.card_expiry,
            Field::CardCvc => &mut self.card_cvc,
        };
        *slot = value.into();
    }

    pub fn shipping_address(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.postal_code.trim(),
            self.country.trim()
        )
    }

    fn errors_for(&self, fields: &[Field]) -> FieldErrors {
        fields
            .iter()
            .filter_map(|field| field.check(self.value(*field)).map(|msg| (*field, msg)))
            .collect()
    }
}

/// Body posted to `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("the order can only be placed from the review step")]
    NotAtReview,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("{} field(s) need attention", .0.len())]
    Invalid(FieldErrors),

    #[error("{}", ORDER_FAILED)]
    Submit(#[source] ClientError),
}

/// Shipping -> Payment -> Review wizard over a single form.
#[derive(Debug, Clone)]
pub struct Checkout {
    step: Step,
    form: CheckoutForm,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    pub fn new() -> Self {
        Self::with_form(CheckoutForm::default())
    }

    pub fn with_form(form: CheckoutForm) -> Self {
        Self {
            step: Step::Shipping,
            form,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Advance once the current step's fields are valid.
    pub fn next(&mut self) -> Result<Step, FieldErrors> {
        let errors = self.form.errors_for(self.step.fields());
        if !errors.is_empty() {
            return Err(errors);
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let errors = self.form.errors_for(&Field::ALL);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn order_request(&self, cart: &Cart) -> OrderRequest {
        OrderRequest {
            items: cart.items().to_vec(),
            total: cart.totals().total,
            shipping_address: self.form.shipping_address(),
            payment_method: CREDIT_CARD.to_string(),
        }
    }

    /// Place the order for the stored cart and empty it on success. On
    /// failure the cart is left as it was.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        store: &mut CartStore,
    ) -> Result<CreatedOrder, CheckoutError> {
        if self.step != Step::Review {
            return Err(CheckoutError::NotAtReview);
        }
        self.validate().map_err(CheckoutError::Invalid)?;
        if store.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = self.order_request(store.cart());
        let created = client.create_order(&request).await.map_err(|err| {
            tracing::warn!(error = %err, "order submission failed");
            CheckoutError::Submit(err)
        })?;

        if let Err(err) = store.clear() {
            tracing::warn!(error = %err, order_id = created.order.id, "order placed but cart was not cleared");
        }
        *self = Checkout::new();
        Ok(created)
    }
}

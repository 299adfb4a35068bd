use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartForm {
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSummary {
    /// Lines whose product owner could not be notified.
    pub warnings: Vec<String>,
}

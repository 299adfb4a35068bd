use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account from the relational store.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn parsed_role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Customer)
    }
}

/// Account role gating product creation/deletion and the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "customer" => Some(Role::Customer),
            "supplier" => Some(Role::Supplier),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Product document from the catalog store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: String,
    /// Owning user id; references the relational store, no foreign key.
    pub user_id: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Cart line with name/price snapshotted at add time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: i32,
    /// String form of the referenced product id.
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

use uuid::Uuid;

use crate::{
    entity::{cart, products},
    error::AppResult,
    models::User,
    routes::params::ProductQuery,
};

pub mod cart_store;
pub mod product_store;
pub mod user_store;

pub use cart_store::SeaOrmCartRepository;
pub use product_store::SeaOrmProductRepository;
pub use user_store::PgUserRepository;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
}

/// Partial update; only populated fields are written.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub user_id: i32,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub user_id: i32,
    pub product_id: String,
    pub name: String,
    pub price: i64,
}

/// Contract of the relational user store. `Ok(None)` means "absent";
/// infrastructure failures surface as `Err`, never as a sentinel.
#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn save(&self, user: &NewUser) -> AppResult<User>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn update(&self, id: i32, changes: &UserChanges) -> AppResult<bool>;
    async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<bool>;
    async fn list_all(&self) -> AppResult<Vec<User>>;
}

/// Contract of the product document store.
#[allow(async_fn_in_trait)]
pub trait ProductRepository {
    async fn insert(&self, product: &NewProduct) -> AppResult<products::Model>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<products::Model>>;
    /// Filtered, sorted, paginated listing; returns the page and the total count.
    async fn search(&self, query: &ProductQuery) -> AppResult<(Vec<products::Model>, i64)>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Contract of the per-user cart store.
#[allow(async_fn_in_trait)]
pub trait CartRepository {
    async fn lines_for_user(&self, user_id: i32) -> AppResult<Vec<cart::Model>>;
    async fn find_line(&self, user_id: i32, product_id: &str) -> AppResult<Option<cart::Model>>;
    async fn find_line_by_id(&self, id: Uuid, user_id: i32) -> AppResult<Option<cart::Model>>;
    async fn insert_line(&self, line: &NewCartLine) -> AppResult<cart::Model>;
    /// Store-side atomic increment; no application-level locking.
    async fn increment_quantity(&self, id: Uuid) -> AppResult<()>;
    async fn set_quantity(&self, id: Uuid, user_id: i32, quantity: i32) -> AppResult<bool>;
    async fn delete_line(&self, id: Uuid, user_id: i32) -> AppResult<bool>;
    async fn clear_user(&self, user_id: i32) -> AppResult<u64>;
}

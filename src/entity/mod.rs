pub mod cart;
pub mod products;

pub use cart::Entity as Cart;
pub use products::Entity as Products;

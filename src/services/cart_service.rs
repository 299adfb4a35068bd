use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::cart::{CartView, CheckoutSummary},
    entity::cart::Model as CartModel,
    error::{AppError, AppResult},
    mailer::CartAction,
    middleware::auth::AuthUser,
    models::CartItem,
    repository::{CartRepository, NewCartLine, ProductRepository, UserRepository},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub enum AddToCart {
    Added,
    /// The referenced product no longer exists; the caller redirects to the
    /// listing without touching the cart.
    ProductMissing,
}

/// First add creates a line with quantity 1 snapshotting the current
/// name/price; repeated adds increment store-side.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<AddToCart> {
    let Some(product) = state.products.find_by_id(product_id).await? else {
        return Ok(AddToCart::ProductMissing);
    };

    let key = product.id.to_string();
    match state.cart.find_line(user.user_id, &key).await? {
        Some(line) => state.cart.increment_quantity(line.id).await?,
        None => {
            state
                .cart
                .insert_line(&NewCartLine {
                    user_id: user.user_id,
                    product_id: key,
                    name: product.name.clone(),
                    price: product.price,
                })
                .await?;
        }
    }

    notify_cart_change(state, user.user_id, CartAction::Add, &product.name).await;
    Ok(AddToCart::Added)
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let items: Vec<CartItem> = state
        .cart
        .lines_for_user(user.user_id)
        .await?
        .into_iter()
        .map(cart_item_from_entity)
        .collect();

    let total = items.iter().map(|item| item.price * item.quantity as i64).sum();

    Ok(ApiResponse::success("OK", CartView { items, total }, None))
}

/// A positive quantity replaces the stored one; zero or negative removes the
/// line. Quantities are never stored non-positive.
pub async fn update_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    let line = state.cart.find_line_by_id(item_id, user.user_id).await?;
    let Some(line) = line else {
        // Updating an absent line is a no-op, not an error.
        return Ok(());
    };

    if quantity > 0 {
        state.cart.set_quantity(item_id, user.user_id, quantity).await?;
        notify_cart_change(state, user.user_id, CartAction::Update, &line.name).await;
    } else {
        state.cart.delete_line(item_id, user.user_id).await?;
        notify_cart_change(state, user.user_id, CartAction::Remove, &line.name).await;
    }
    Ok(())
}

/// Idempotent; removing an absent line is not an error.
pub async fn remove_from_cart(state: &AppState, user: &AuthUser, item_id: Uuid) -> AppResult<()> {
    let line = state.cart.find_line_by_id(item_id, user.user_id).await?;
    let removed = state.cart.delete_line(item_id, user.user_id).await?;

    if removed {
        let name = line.map(|l| l.name).unwrap_or_else(|| "Ürün".to_string());
        notify_cart_change(state, user.user_id, CartAction::Remove, &name).await;
    }
    Ok(())
}

/// Notify every product owner, then clear the cart. A missing owner address
/// is a per-line warning; a hard send failure aborts with the cart intact.
/// There is no transaction spanning the two stores.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CheckoutSummary>> {
    let lines = state.cart.lines_for_user(user.user_id).await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("Sepetiniz boş!".to_string()));
    }

    let mut warnings = Vec::new();
    for line in &lines {
        let Ok(product_id) = line.product_id.parse::<Uuid>() else {
            continue;
        };
        let Some(product) = state.products.find_by_id(product_id).await? else {
            continue;
        };

        match state.users.find_by_id(product.user_id).await? {
            Some(owner) if !owner.email.is_empty() => {
                state
                    .mailer
                    .send_sale_notification(&owner, &cart_item_from_entity(line.clone()))
                    .await?;
            }
            _ => {
                let warning = format!(
                    "Ürün sahibi ({}) için e-posta adresi bulunamadı.",
                    product.created_by
                );
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    state.cart.clear_user(user.user_id).await?;

    Ok(ApiResponse::success(
        "Satın alma başarılı! Ürün sahiplerine e-posta gönderildi.",
        CheckoutSummary { warnings },
        Some(Meta::empty()),
    ))
}

async fn notify_cart_change(state: &AppState, user_id: i32, action: CartAction, name: &str) {
    match state.users.find_by_id(user_id).await {
        Ok(Some(user)) => state.mailer.send_cart_update(&user.email, action, name).await,
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "user lookup for cart mail failed"),
    }
}

pub fn cart_item_from_entity(model: CartModel) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
        added_at: model.added_at.with_timezone(&Utc),
    }
}

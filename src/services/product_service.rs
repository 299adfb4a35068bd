use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList},
    entity::products::Model as ProductModel,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_supplier},
    models::{Product, Role},
    repository::{NewProduct, ProductRepository},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, _) = query.pagination.normalize();
    let (items, total) = state.products.search(&query).await?;

    let items = items.into_iter().map(product_from_entity).collect();
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ürünler", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_supplier(user)?;

    let (Some(name), Some(price), Some(description)) =
        (payload.name, payload.price, payload.description)
    else {
        return Err(AppError::BadRequest("Ürün detayları eksik!".to_string()));
    };
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Ürün detayları eksik!".to_string()));
    }
    if price < 0 {
        return Err(AppError::BadRequest("Geçersiz fiyat".to_string()));
    }

    let product = state
        .products
        .insert(&NewProduct {
            name: name.trim().to_string(),
            price,
            description,
            user_id: user.user_id,
            created_by: user.username.clone(),
        })
        .await?;

    Ok(ApiResponse::success(
        "Ürün başarıyla eklendi",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Deletion is limited to the product's creator and admins.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if user.role != Role::Admin {
        let product = state.products.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if product.created_by != user.username {
            return Err(AppError::Forbidden(
                "Bu ürünü silme yetkiniz yok!".to_string(),
            ));
        }
    }

    if !state.products.delete(id).await? {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Ürün silindi",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        description: model.description,
        user_id: model.user_id,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

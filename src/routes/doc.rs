use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileUpdateRequest,
            ProfileUpdateResponse, ResetPasswordRequest, SignupRequest, UserList,
        },
        cart::{CartView, CheckoutSummary, UpdateCartForm},
        products::{CreateProductRequest, CreatedProduct, ProductList},
    },
    models::{CartItem, Product, Role, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::logout,
        auth::profile,
        auth::update_profile,
        auth::forget_password,
        auth::verify_reset,
        auth::reset_password_form,
        auth::reset_password,
        products::list_products,
        products::add_product,
        products::delete_product,
        products::api_list_products,
        products::api_create_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_cart,
        cart::remove_from_cart,
        cart::checkout,
        admin::admin_dashboard
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            CartItem,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            ProfileUpdateRequest,
            ProfileUpdateResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UserList,
            CreateProductRequest,
            CreatedProduct,
            ProductList,
            UpdateCartForm,
            CartView,
            CheckoutSummary,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login, profile and password reset"),
        (name = "Products", description = "Product listing and management"),
        (name = "Cart", description = "Cart and checkout"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

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
        auth::{LoginRequest, RegisterRequest, UserWithToken},
        orders::{OrderDetail, OrderItemRequest, PlaceOrderRequest, ShippingAddressRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        users::{AdminUpdateUserRequest, UpdateProfileRequest},
    },
    error::ErrorDetail,
    models::{Order, OrderItem, Product, ShippingAddress, User},
    routes::{health, orders, params, products, users},
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
        users::register,
        users::login,
        users::get_profile,
        users::update_profile,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::place_order,
        orders::list_my_orders,
        orders::list_all_orders,
        orders::get_order,
        orders::pay_order,
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            OrderItem,
            ShippingAddress,
            OrderDetail,
            PlaceOrderRequest,
            OrderItemRequest,
            ShippingAddressRequest,
            RegisterRequest,
            LoginRequest,
            UserWithToken,
            UpdateProfileRequest,
            AdminUpdateUserRequest,
            CreateProductRequest,
            UpdateProductRequest,
            params::ProductQuery,
            ErrorDetail,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Authentication and user management"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Orders", description = "Order placement and queries"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderDetail, PlaceOrderRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(place_order))
        .route("/myorders", get(list_my_orders))
        .route("/", get(list_all_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/pay", put(pay_order))
}

#[utoipa::path(
    post,
    path = "/api/orders/add",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderDetail),
        (status = 400, description = "Empty cart, unknown product, or insufficient stock"),
        (status = 409, description = "Stock was claimed by a concurrent order"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let detail = order_service::place_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/orders/myorders",
    responses(
        (status = 200, description = "Orders owned by the caller, newest first", body = Vec<Order>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_my_orders(&state, &user).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders, newest first (admin only)", body = Vec<Order>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_all_orders(&state, &user).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with shipping address and items", body = OrderDetail),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let detail = order_service::get_order(&state, &user, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order marked as paid", body = OrderDetail),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Order already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn pay_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let detail = order_service::pay_order(&state, &user, id).await?;
    Ok(Json(detail))
}

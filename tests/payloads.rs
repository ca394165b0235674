use rust_decimal::Decimal;
use storefront_api::dto::orders::PlaceOrderRequest;

fn full_payload() -> serde_json::Value {
    serde_json::json!({
        "orderItems": [
            { "productId": "7f8a6f0e-2f1d-4a8e-9c57-0a6f3b1a2c3d", "qty": 2, "price": "10.00" },
            { "productId": "f1f3a1f0-0d8e-4f9b-8d3c-111213141516", "qty": 1 }
        ],
        "paymentMethod": "PayPal",
        "taxPrice": "1.50",
        "shippingPrice": "4.99",
        "totalPrice": "26.49",
        "shippingAddress": {
            "address": "1 Main St",
            "city": "Springfield",
            "postalCode": "12345",
            "country": "USA"
        }
    })
}

#[test]
fn order_payload_deserializes() {
    let payload: PlaceOrderRequest = serde_json::from_value(full_payload()).unwrap();
    assert_eq!(payload.order_items.len(), 2);
    assert_eq!(payload.order_items[0].qty, 2);
    assert_eq!(payload.order_items[0].price, Some(Decimal::new(1000, 2)));
    // second line leaves the price to the catalog
    assert_eq!(payload.order_items[1].price, None);
    assert_eq!(payload.payment_method, "PayPal");
    assert_eq!(payload.shipping_address.postal_code, "12345");
    assert_eq!(payload.total_price, Decimal::new(2649, 2));
}

#[test]
fn order_payload_rejects_unknown_fields() {
    let mut value = full_payload();
    value["surpriseField"] = serde_json::json!(true);
    let result: Result<PlaceOrderRequest, _> = serde_json::from_value(value);
    assert!(result.is_err());
}

#[test]
fn order_line_rejects_unknown_fields() {
    let mut value = full_payload();
    value["orderItems"][0]["discount"] = serde_json::json!("50%");
    let result: Result<PlaceOrderRequest, _> = serde_json::from_value(value);
    assert!(result.is_err());
}

#[test]
fn missing_order_items_deserializes_to_empty_cart() {
    // The service is responsible for rejecting the empty cart; the payload
    // itself parses so the caller gets a domain error, not a serde error.
    let mut value = full_payload();
    value.as_object_mut().unwrap().remove("orderItems");
    let payload: PlaceOrderRequest = serde_json::from_value(value).unwrap();
    assert!(payload.order_items.is_empty());
}

#[test]
fn shipping_address_requires_all_fields() {
    let mut value = full_payload();
    value["shippingAddress"].as_object_mut().unwrap().remove("city");
    let result: Result<PlaceOrderRequest, _> = serde_json::from_value(value);
    assert!(result.is_err());
}

//! Route definitions for the PharmaNet console

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/catalog", catalog_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/pharmacies", pharmacy_routes())
        .nest("/reports", report_routes())
        .nest("/purchasing", purchasing_routes())
}

/// Price lists, search and comparison
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::search_catalog))
        .route("/suppliers", get(handlers::list_price_lists))
        .route("/products/:code/comparison", get(handlers::get_product_comparison))
        .route("/products/:code/offers", get(handlers::get_product_offers))
        .route("/upload/:supplier_id", post(handlers::upload_price_list))
}

/// Supplier directory
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route("/stats", get(handlers::get_supplier_stats))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route("/:supplier_id/activate", put(handlers::activate_supplier))
        .route("/:supplier_id/deactivate", put(handlers::deactivate_supplier))
        .route(
            "/:supplier_id/prices",
            get(handlers::get_price_list).post(handlers::upsert_offer),
        )
}

/// Pharmacy directory and stock
fn pharmacy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pharmacies).post(handlers::create_pharmacy))
        .route(
            "/:pharmacy_id",
            get(handlers::get_pharmacy)
                .put(handlers::update_pharmacy)
                .delete(handlers::delete_pharmacy),
        )
        .route("/:pharmacy_id/discount", put(handlers::apply_daily_discount))
        .route(
            "/:pharmacy_id/stock",
            get(handlers::list_stock).post(handlers::import_stock),
        )
}

/// Stock reports
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/shortfall", get(handlers::get_shortfall_report))
        .route("/overstock", get(handlers::get_overstock_report))
        .route("/shortfall-stats", get(handlers::get_shortfall_stats))
}

/// Purchase plan
fn purchasing_routes() -> Router<AppState> {
    Router::new()
        .route("/consolidation", get(handlers::get_consolidation))
        .route("/order-lines", get(handlers::get_order_lines))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::persistence::Repository;
    use crate::{create_app, AppState};

    fn app() -> Router {
        create_app(AppState::new(Config::default(), Repository::default()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    fn decimal(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn create_supplier(app: &Router, name: &str, commercial: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({
                "name": name,
                "creditDays": 30,
                "commercialDiscountPct": commercial,
                "earlyPaymentDiscountPct": "2"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_pharmacy(app: &Router, name: &str) -> String {
        let (status, body) = send(app, Method::POST, "/api/v1/pharmacies", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "in-memory");
    }

    #[tokio::test]
    async fn test_upload_and_search_flow() {
        let app = app();
        let cobeca = create_supplier(&app, "Cobeca", "20").await;
        let drolanca = create_supplier(&app, "Drolanca", "0").await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/catalog/upload/{}", cobeca),
            Some(json!([
                {"code": "AMX-500", "description": "Amoxicilina 500mg", "lab": "Leti", "listPrice": "100"}
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inserted"], 1);

        send(
            &app,
            Method::POST,
            &format!("/api/v1/catalog/upload/{}", drolanca),
            Some(json!([
                {"code": "AMX-500", "description": "Amoxicilina 500mg", "lab": "Leti", "listPrice": "85"}
            ])),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/api/v1/catalog/search?q=amoxi", None).await;
        assert_eq!(status, StatusCode::OK);
        let offers = body[0]["offers"].as_array().unwrap();
        assert_eq!(body[0]["lab"], "Leti");
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0]["supplierName"], "Cobeca");
        assert_eq!(decimal(&offers[0]["finalPrice"]), Decimal::from(80));
        assert_eq!(offers[0]["isBest"], true);
        assert_eq!(offers[1]["isBest"], false);

        let (_, body) = send(&app, Method::GET, "/api/v1/catalog/suppliers", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_comparison_for_unknown_code_is_empty() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/catalog/products/NOPE/comparison", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["offers"], json!([]));
    }

    #[tokio::test]
    async fn test_negative_price_upload_rejected() {
        let app = app();
        let cobeca = create_supplier(&app, "Cobeca", "0").await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/catalog/upload/{}", cobeca),
            Some(json!([{"code": "P1", "listPrice": "-5"}])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "rows[0].listPrice");
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_404() {
        let uri = format!("/api/v1/suppliers/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_supplier_email_rejected() {
        let (status, _) = send(
            &app(),
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({"name": "Cobeca", "email": "not-an-email"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stock_import_and_consolidation() {
        let app = app();
        let cobeca = create_supplier(&app, "Cobeca", "0").await;
        let p1 = create_pharmacy(&app, "Farmacia Uno").await;
        let p2 = create_pharmacy(&app, "Farmacia Dos").await;

        send(
            &app,
            Method::POST,
            &format!("/api/v1/catalog/upload/{}", cobeca),
            Some(json!([{"code": "X", "description": "Producto X", "lab": "Lab", "listPrice": "2"}])),
        )
        .await;
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/pharmacies/{}/stock", p1),
            Some(json!([{"code": "X", "quantity": 0}])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        send(
            &app,
            Method::POST,
            &format!("/api/v1/pharmacies/{}/stock", p2),
            Some(json!([{"code": "X", "quantity": 3}])),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/api/v1/purchasing/consolidation?threshold=5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"][0]["code"], "X");
        assert_eq!(body["products"][0]["priority"], "Alta");
        assert_eq!(body["products"][0]["totalNeeded"], 7);
        assert_eq!(body["summary"]["totalUnitsNeeded"], 7);
        assert_eq!(decimal(&body["summary"]["totalEstimatedValue"]), Decimal::from(14));

        let (_, lines) = send(&app, Method::GET, "/api/v1/purchasing/order-lines", None).await;
        assert_eq!(lines[0]["supplierId"], cobeca.as_str());
        assert_eq!(lines[0]["quantity"], 7);
    }

    #[tokio::test]
    async fn test_shortfall_csv_export() {
        let app = app();
        let p1 = create_pharmacy(&app, "Farmacia Uno").await;
        send(
            &app,
            Method::POST,
            &format!("/api/v1/pharmacies/{}/stock", p1),
            Some(json!([{"code": "X", "quantity": 1}])),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/api/v1/reports/shortfall?format=csv", None).await;
        assert_eq!(status, StatusCode::OK);
        let csv = body.as_str().unwrap();
        assert!(csv.starts_with("code,description,lab,priority"));
        assert!(csv.contains("X,,,Media,4,0,1,,,"));
    }

    #[tokio::test]
    async fn test_oversized_threshold_rejected() {
        let app = app();
        let p1 = create_pharmacy(&app, "Farmacia Uno").await;
        send(
            &app,
            Method::POST,
            &format!("/api/v1/pharmacies/{}/stock", p1),
            Some(json!([{"code": "X", "quantity": 0}])),
        )
        .await;

        for uri in [
            "/api/v1/purchasing/consolidation?threshold=9223372036854775807",
            "/api/v1/purchasing/order-lines?threshold=1000001",
            "/api/v1/reports/overstock?threshold=9223372036854775807",
        ] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"]["field"], "threshold");
        }
    }

    #[tokio::test]
    async fn test_pharmacy_update_and_delete() {
        let app = app();
        let p1 = create_pharmacy(&app, "Farmacia Uno").await;
        create_pharmacy(&app, "Farmacia Dos").await;
        let uri = format!("/api/v1/pharmacies/{}", p1);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"name": "Farmacia Uno Centro", "phone": "0212-5550000"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Farmacia Uno Centro");
        assert_eq!(body["phone"], "0212-5550000");

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"name": "farmacia dos"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/api/v1/pharmacies", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_supplier_deactivation_and_price_list() {
        let app = app();
        let cobeca = create_supplier(&app, "Cobeca", "20").await;
        let drolanca = create_supplier(&app, "Drolanca", "0").await;
        let prices = format!("/api/v1/suppliers/{}/prices", cobeca);

        for (code, price) in [("AMX-500", "100"), ("IBU-400", "10")] {
            let (status, body) = send(
                &app,
                Method::POST,
                &prices,
                Some(json!({"code": code, "description": "Producto", "lab": "Leti", "listPrice": price})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["inserted"], 1);
        }
        send(
            &app,
            Method::POST,
            &format!("/api/v1/suppliers/{}/prices", drolanca),
            Some(json!({"code": "AMX-500", "listPrice": "85"})),
        )
        .await;

        let (status, body) = send(&app, Method::GET, &prices, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["code"], "AMX-500");
        assert_eq!(body[0]["available"], true);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/suppliers/{}/deactivate", cobeca),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], false);

        let (_, comparison) = send(&app, Method::GET, "/api/v1/catalog/products/AMX-500/comparison", None).await;
        assert_eq!(comparison["offers"].as_array().unwrap().len(), 1);
        assert_eq!(comparison["offers"][0]["supplierId"], drolanca.as_str());

        let (_, stats) = send(&app, Method::GET, "/api/v1/suppliers/stats", None).await;
        assert_eq!(stats["totalSuppliers"], 1);

        // price list survives deactivation
        let (_, body) = send(&app, Method::GET, &prices, None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        send(
            &app,
            Method::PUT,
            &format!("/api/v1/suppliers/{}/activate", cobeca),
            None,
        )
        .await;
        send(
            &app,
            Method::POST,
            &format!("/api/v1/suppliers/{}/prices", drolanca),
            Some(json!({"code": "AMX-500", "listPrice": "85", "available": false})),
        )
        .await;
        let (_, comparison) = send(&app, Method::GET, "/api/v1/catalog/products/AMX-500/comparison", None).await;
        assert_eq!(comparison["offers"].as_array().unwrap().len(), 1);
        assert_eq!(comparison["offers"][0]["supplierId"], cobeca.as_str());

        let missing = format!("/api/v1/suppliers/{}/prices", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::GET, &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_are_gzipped_on_request() {
        let app = app();
        create_supplier(&app, "Cobeca", "20").await;

        let request = Request::builder()
            .uri("/api/v1/suppliers")
            .header(header::ACCEPT_ENCODING, "gzip")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    }
}

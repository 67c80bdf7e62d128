//! Orders list route handler.

use axum::{
    Json,
    extract::{RawQuery, State},
};
use chrono::Utc;
use tracing::instrument;
use url::form_urlencoded;

use orders_dashboard_core::{OrdersQuery, OrdersResponse, Page, PageRequest};

use crate::error::Result;
use crate::state::AppState;

/// List one page of orders.
///
/// Query parameters: `cursor`, `limit`, `sortBy`, `sortDirection`. The first
/// occurrence of a repeated parameter wins. The page and the total count are
/// read concurrently; either failing fails the whole request, so a response
/// never carries partial data.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<OrdersResponse>> {
    let query = OrdersQuery::from_pairs(form_urlencoded::parse(
        raw.as_deref().unwrap_or_default().as_bytes(),
    ));
    let request = PageRequest::parse(&query, state.page_limits())?;
    let seek = request.seek();
    let store = state.store();

    let (rows, total_count) = tokio::try_join!(
        store.fetch_page(request.sort, seek.as_ref(), request.fetch_limit()),
        store.count(),
    )?;

    let page = Page::from_lookahead(rows, request.limit, request.sort);
    tracing::debug!(
        rows = page.rows.len(),
        has_next_page = page.has_next_page,
        total_count,
        "Serving orders page"
    );

    let response = page.into_response(request.sort, total_count, Utc::now().timestamp_millis())?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use orders_dashboard_core::{
        ErrorBody, Order, OrderId, OrderItems, OrderStatus, PageLimits, SortColumn, SortDirection,
        SortOrder,
    };

    use super::*;
    use crate::db::MemoryOrderStore;
    use crate::routes::app;

    fn orders(n: u32) -> Vec<Order> {
        let base = Utc
            .with_ymd_and_hms(2025, 2, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        (1..=n)
            .map(|i| Order {
                id: OrderId::new(uuid::Uuid::from_u128(u128::from(i))),
                customer_name: format!("Customer {:03}", i % 7),
                order_amount: Decimal::new(i64::from(i % 5) * 1000, 2),
                status: OrderStatus::ALL[(i % 4) as usize],
                items: OrderItems::default(),
                created_at: base + Duration::hours(i64::from(i % 9)),
            })
            .collect()
    }

    fn state_with(store: Arc<MemoryOrderStore>) -> AppState {
        AppState::new(store, PageLimits::default())
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app(state)
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    async fn get_page(state: AppState, uri: &str) -> OrdersResponse {
        let (status, body) = get(state, uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_value(body).expect("orders response")
    }

    #[tokio::test]
    async fn test_first_page_with_defaults() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(60))));
        let page = get_page(state, "/api/orders").await;

        assert_eq!(page.data.len(), 50);
        assert!(page.has_next_page);
        assert!(page.next_cursor.is_some());
        assert_eq!(page.total_count, 60);
        assert_eq!(page.metadata.sort_by, SortColumn::CreatedAt);
        assert_eq!(page.metadata.sort_direction, SortDirection::Desc);
        assert!(page.metadata.response_time > 0);
    }

    #[tokio::test]
    async fn test_walks_every_row_exactly_once() {
        let all = orders(37);
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&all)));
        let sort = SortOrder::new(SortColumn::OrderAmount, SortDirection::Asc);

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let uri = match &cursor {
                Some(c) => format!("/api/orders?sortBy=orderAmount&sortDirection=asc&limit=10&cursor={c}"),
                None => "/api/orders?sortBy=orderAmount&sortDirection=asc&limit=10".to_string(),
            };
            let page = get_page(state.clone(), &uri).await;
            seen.extend(page.data);
            if !page.has_next_page {
                assert!(page.next_cursor.is_none());
                break;
            }
            cursor = page.next_cursor;
        }

        let mut expected: Vec<_> = all.iter().map(Order::summary).collect();
        expected.sort_by(|a, b| sort.compare(a, b));
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_next_page() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(10))));
        let page = get_page(state, "/api/orders?limit=10").await;

        assert_eq!(page.data.len(), 10);
        assert!(!page.has_next_page);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let state = state_with(Arc::new(MemoryOrderStore::new()));
        let page = get_page(state, "/api/orders").await;

        assert!(page.data.is_empty());
        assert!(!page.has_next_page);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(520))));
        let page = get_page(state, "/api/orders?limit=100000").await;

        assert_eq!(page.data.len(), 500);
        assert!(page.has_next_page);
    }

    #[tokio::test]
    async fn test_junk_limit_uses_default() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(60))));
        let page = get_page(state, "/api/orders?limit=lots").await;

        assert_eq!(page.data.len(), 50);
    }

    #[tokio::test]
    async fn test_unknown_sort_column_is_400() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(5))));
        let (status, body) = get(state, "/api/orders?sortBy=password").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_value(body).expect("error body");
        assert_eq!(body.error, "unknown sort column: password");
    }

    #[tokio::test]
    async fn test_invalid_direction_is_400() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(5))));
        let (status, _) = get(state, "/api/orders?sortDirection=up").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_400() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(5))));
        let (status, body) = get(state, "/api/orders?cursor=definitely-not-a-cursor").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_cursor_from_other_sort_is_400() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(20))));
        let first = get_page(state.clone(), "/api/orders?limit=5").await;
        let cursor = first.next_cursor.expect("cursor");

        let (status, _) = get(
            state,
            &format!("/api/orders?limit=5&sortBy=customerName&cursor={cursor}"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_repeated_parameter_uses_first_value() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(20))));
        let page = get_page(state, "/api/orders?limit=5&limit=6&sortBy=id&sortBy=status").await;

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.metadata.sort_by, SortColumn::Id);
    }

    #[tokio::test]
    async fn test_badly_encoded_parameters_answer_with_json() {
        let state = state_with(Arc::new(MemoryOrderStore::with_orders(&orders(60))));

        let page = get_page(state.clone(), "/api/orders?limit=%ZZ").await;
        assert_eq!(page.data.len(), 50);

        let (status, body) = get(state.clone(), "/api/orders?sortBy=%FF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = get(state, "/api/orders?cursor=%E2%28").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_generic_body() {
        let store = Arc::new(MemoryOrderStore::with_orders(&orders(5)));
        store.set_unavailable(true);
        let (status, body) = get(state_with(store), "/api/orders").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch orders" }));
    }

    #[tokio::test]
    async fn test_health_routes() {
        let store = Arc::new(MemoryOrderStore::new());
        let state = state_with(Arc::clone(&store));

        let live = app(state.clone())
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(live.status(), StatusCode::OK);

        store.set_unavailable(true);
        let ready = app(state)
            .oneshot(Request::get("/health/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

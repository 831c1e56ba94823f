//! Shared harness: the full router over an in-memory store.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use dental_bookings::extractors::{USER_ID_HEADER, USER_ROLE_HEADER};
use dental_bookings::{build_router, AppState, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("root", "admin");

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        TestApp {
            router: build_router(state, 64 * 1024),
        }
    }

    /// Send a request as `who` (user id, role); `None` sends no identity headers.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        who: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = who {
            req = req.header(USER_ID_HEADER, id).header(USER_ROLE_HEADER, role);
        }
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        self.call(req).await
    }

    /// Send a prepared request; bodies that are not JSON come back as a string value.
    pub async fn call(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, who: Option<(&str, &str)>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, who, None).await
    }

    /// Create a dentist as admin and return its id.
    pub async fn dentist(&self, name: &str, years: i64, areas: &[&str]) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/dentists",
                Some(ADMIN),
                Some(json!({"name": name, "yearsOfExperience": years, "areaOfExpertise": areas})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Book `dentist` on `date` as `who`.
    pub async fn book(&self, dentist: &str, date: &str, who: (&str, &str)) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            &format!("/dentists/{dentist}/bookings"),
            Some(who),
            Some(json!({"bookDate": date})),
        )
        .await
    }
}

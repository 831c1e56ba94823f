//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub success: bool,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: Vec<T>,
}

/// Links to neighbouring pages; each side is present only when that page exists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: String) -> Self {
        ErrorBody {
            success: false,
            message,
        }
    }
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { success: true, data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { success: true, data }))
}

/// `{success: true, data: {}}`, returned after deletes.
pub fn success_empty() -> (StatusCode, Json<SuccessOne<serde_json::Value>>) {
    success_one_ok(serde_json::json!({}))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            success: true,
            count,
            pagination: None,
            data,
        }),
    )
}

pub fn success_page<T: Serialize>(data: Vec<T>, pagination: Pagination) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            success: true,
            count,
            pagination: Some(pagination),
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_counts_items_and_hides_missing_pages() {
        let (status, Json(body)) = success_page(vec![1, 2, 3], Pagination::default());
        assert_eq!(status, StatusCode::OK);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["count"], 3);
        assert_eq!(v["pagination"], serde_json::json!({}));
    }

    #[test]
    fn error_body_has_success_false() {
        let v = serde_json::to_value(ErrorBody::new("nope".into())).unwrap();
        assert_eq!(v, serde_json::json!({"success": false, "message": "nope"}));
    }
}

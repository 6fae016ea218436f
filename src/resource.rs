//! REST resources
//!
//! A resource serves a collection under its base path:
//!
//! | Request               | Handler      |
//! |-----------------------|--------------|
//! | `GET base`            | `get_all`    |
//! | `GET base/{id}`       | `get`        |
//! | `POST base`           | `post`       |
//! | `PUT base`            | `put_all`    |
//! | `PUT base/{id}`       | `put`        |
//! | `DELETE base`         | `delete_all` |
//! | `DELETE base/{id}`    | `delete`     |
//!
//! Handlers that are not overridden answer `501 Not Implemented`.

use crate::error::Result as MountResult;
use crate::exception::ApplicationError;
use crate::mount::{Mounted, RouteKey, check_path, normalize};
use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, Request},
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::get,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Request bodies larger than this are rejected
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub type HandlerResult = Result<Response, ApplicationError>;

/// What a resource handler gets to see of the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RequestContext {
    pub async fn from_request(request: Request) -> Result<Self, ApplicationError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| ApplicationError::IllegalValue(format!("Unreadable body: {e}")))?;
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    /// Query string parameters; an unparsable query yields an empty map.
    pub fn query(&self) -> HashMap<String, String> {
        Query::<HashMap<String, String>>::try_from_uri(&self.uri)
            .map(|Query(params)| params)
            .unwrap_or_default()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApplicationError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApplicationError::IllegalValue(format!("Invalid JSON body: {e}")))
    }
}

fn not_implemented(handler: &str) -> HandlerResult {
    Err(ApplicationError::NotImplemented(format!(
        "{handler} is not implemented by this resource"
    )))
}

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Collection path, e.g. `/api/user`
    fn base_path(&self) -> &str;

    async fn get_all(&self, _request: RequestContext) -> HandlerResult {
        not_implemented("getAll")
    }

    async fn get(&self, _id: String, _request: RequestContext) -> HandlerResult {
        not_implemented("get")
    }

    async fn post(&self, _request: RequestContext) -> HandlerResult {
        not_implemented("post")
    }

    async fn put(&self, _id: String, _request: RequestContext) -> HandlerResult {
        not_implemented("put")
    }

    async fn put_all(&self, _request: RequestContext) -> HandlerResult {
        not_implemented("putAll")
    }

    async fn delete(&self, _id: String, _request: RequestContext) -> HandlerResult {
        not_implemented("delete")
    }

    async fn delete_all(&self, _request: RequestContext) -> HandlerResult {
        not_implemented("deleteAll")
    }
}

macro_rules! collection_handler {
    ($resource:expr, $method:ident) => {{
        let resource = Arc::clone(&$resource);
        move |request: Request| async move {
            let context = RequestContext::from_request(request).await?;
            resource.$method(context).await
        }
    }};
}

macro_rules! item_handler {
    ($resource:expr, $method:ident) => {{
        let resource = Arc::clone(&$resource);
        move |Path(id): Path<String>, request: Request| async move {
            let context = RequestContext::from_request(request).await?;
            resource.$method(id, context).await
        }
    }};
}

/// Build the router serving `resource`.
pub fn mount<R: Resource>(resource: Arc<R>) -> MountResult<Mounted> {
    let base = normalize(resource.base_path());
    let item = format!("{}/{{id}}", base.trim_end_matches('/'));
    check_path(&base)?;
    check_path(&item)?;
    tracing::debug!("Mounting resource at {}", base);

    let routes = [
        (Method::GET, &base),
        (Method::POST, &base),
        (Method::PUT, &base),
        (Method::DELETE, &base),
        (Method::GET, &item),
        (Method::PUT, &item),
        (Method::DELETE, &item),
    ]
    .into_iter()
    .map(|(method, path)| RouteKey::new(method, path.as_str()))
    .collect();

    let router = Router::new()
        .route(
            &base,
            get(collection_handler!(resource, get_all))
                .post(collection_handler!(resource, post))
                .put(collection_handler!(resource, put_all))
                .delete(collection_handler!(resource, delete_all)),
        )
        .route(
            &item,
            get(item_handler!(resource, get))
                .put(item_handler!(resource, put))
                .delete(item_handler!(resource, delete)),
        );
    Ok(Mounted { router, routes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json,
        body::Body,
        http::StatusCode,
        response::IntoResponse,
    };
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl Resource for Echo {
        fn base_path(&self) -> &str {
            "/echo/"
        }

        async fn get(&self, id: String, request: RequestContext) -> HandlerResult {
            let query = request.query();
            Ok(Json(serde_json::json!({ "id": id, "q": query.get("q") })).into_response())
        }

        async fn post(&self, request: RequestContext) -> HandlerResult {
            let value: serde_json::Value = request.json()?;
            Ok((StatusCode::CREATED, Json(value)).into_response())
        }
    }

    async fn call(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    struct Tenanted;

    #[async_trait]
    impl Resource for Tenanted {
        fn base_path(&self) -> &str {
            "/api/:tenant/user"
        }
    }

    struct Nested;

    #[async_trait]
    impl Resource for Nested {
        fn base_path(&self) -> &str {
            "/api/{id}/user"
        }
    }

    #[test]
    fn test_routes_served() {
        let mounted = mount(Arc::new(Echo)).unwrap();
        assert_eq!(mounted.routes.len(), 7);
        assert!(mounted.routes.contains(&RouteKey::new(Method::PUT, "/echo")));
        assert!(mounted.routes.contains(&RouteKey::new(Method::DELETE, "/echo/{id}")));
        assert!(!mounted.routes.contains(&RouteKey::new(Method::POST, "/echo/{id}")));
    }

    #[test]
    fn test_base_path_is_checked() {
        let err = mount(Arc::new(Tenanted)).err().unwrap();
        assert!(err.to_string().contains(":tenant"));

        let err = mount(Arc::new(Nested)).err().unwrap();
        assert!(err.to_string().contains("more than once"));
    }

    #[tokio::test]
    async fn test_item_route_with_query() {
        let router = mount(Arc::new(Echo)).unwrap().router;
        let (status, body) = call(router, "GET", "/echo/7?q=hello", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"id":"7","q":"hello"}"#);
    }

    #[tokio::test]
    async fn test_json_body() {
        let router = mount(Arc::new(Echo)).unwrap().router;
        let (status, body) = call(router.clone(), "POST", "/echo", r#"{"name":"Joe"}"#).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, r#"{"name":"Joe"}"#);

        let (status, _) = call(router, "POST", "/echo", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unimplemented_handlers() {
        let router = mount(Arc::new(Echo)).unwrap().router;
        for (method, uri) in [("GET", "/echo"), ("PUT", "/echo/1"), ("DELETE", "/echo")] {
            let (status, _) = call(router.clone(), method, uri, "").await;
            assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{method} {uri}");
        }
    }
}

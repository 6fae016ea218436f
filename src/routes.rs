//! Free-form route mappings
//!
//! For endpoints that don't fit the resource shape, such as rendered pages.
//!
//! ```rust,ignore
//! struct Pages;
//!
//! impl Routes for Pages {
//!     fn map(self: Arc<Self>, routes: RouteMapper) -> RouteMapper {
//!         routes.get("/app", || async { Html("<!DOCTYPE html><html></html>") })
//!     }
//! }
//! ```

use crate::error::{Result, TesseraError};
use crate::mount::{Mounted, RouteKey, RouteTable, check_path, normalize};
use axum::{
    Router,
    handler::Handler,
    http::Method,
    routing::{MethodFilter, on},
};
use std::sync::Arc;

pub trait Routes: Send + Sync + 'static {
    /// Prefix for every mapping
    fn base_path(&self) -> &str {
        "/"
    }

    /// Register this class's mappings.
    fn map(self: Arc<Self>, routes: RouteMapper) -> RouteMapper;
}

/// Collects mappings under a base path.
///
/// The first invalid or repeated mapping is kept and reported by
/// [`into_mounted`](Self::into_mounted); later mappings are ignored.
pub struct RouteMapper {
    base: String,
    router: Router,
    routes: Vec<RouteKey>,
    table: RouteTable,
    error: Option<TesseraError>,
}

impl RouteMapper {
    pub fn new(base: &str) -> Self {
        Self {
            base: normalize(base),
            router: Router::new(),
            routes: Vec::new(),
            table: RouteTable::new(),
            error: None,
        }
    }

    /// Map `method` requests on `path` (relative to the base) to `handler`.
    pub fn mapping<H, T>(mut self, method: Method, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        if self.error.is_some() {
            return self;
        }
        let route = RouteKey::new(method, self.join(path));
        match self.claim(&route) {
            Ok(filter) => {
                tracing::debug!("Mapping {} {}", route.method, route.path);
                self.router = self.router.route(&route.path, on(filter, handler));
                self.routes.push(route);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    pub fn get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.mapping(Method::GET, path, handler)
    }

    pub fn post<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.mapping(Method::POST, path, handler)
    }

    pub fn put<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.mapping(Method::PUT, path, handler)
    }

    pub fn patch<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.mapping(Method::PATCH, path, handler)
    }

    pub fn delete<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.mapping(Method::DELETE, path, handler)
    }

    /// The mapped router, or the first mapping error.
    pub fn into_mounted(self) -> Result<Mounted> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Mounted {
                router: self.router,
                routes: self.routes,
            }),
        }
    }

    fn claim(&mut self, route: &RouteKey) -> Result<MethodFilter> {
        check_path(&route.path)?;
        let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
            TesseraError::illegal_value(format!("{} cannot be mapped", route.method))
        })?;
        self.table.claim(&self.base, route)?;
        Ok(filter)
    }

    fn join(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        match (self.base.as_str(), path) {
            (base, "") => base.to_string(),
            ("/", path) => format!("/{path}"),
            (base, path) => format!("{base}/{path}"),
        }
    }
}

/// Build the router serving `routes`.
pub fn mount<R: Routes>(routes: Arc<R>) -> Result<Mounted> {
    let mapper = RouteMapper::new(routes.base_path());
    routes.map(mapper).into_mounted()
}

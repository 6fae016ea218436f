//! A users API assembled from a module, a resource and a routes class.

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;
use std::sync::Mutex;
use tessera::config;
use tessera::prelude::*;
use tower::ServiceExt;

#[derive(Clone, Serialize)]
struct User {
    id: u32,
    name: String,
}

struct Users {
    errors: Arc<ErrorKinds>,
    users: Vec<User>,
}

impl Users {
    fn find(&self, id: &str) -> std::result::Result<&User, ApplicationError> {
        let id: u32 = id
            .parse()
            .map_err(|_| self.errors.illegal_value(format!("'{id}' is not a user id")))?;
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| self.errors.not_found(format!("User {id} does not exist")))
    }
}

struct UsersResource {
    users: Arc<Users>,
}

#[async_trait]
impl Resource for UsersResource {
    fn base_path(&self) -> &str {
        "/api/user"
    }

    async fn get_all(&self, _request: RequestContext) -> HandlerResult {
        Ok(Json(&self.users.users).into_response())
    }

    async fn get(&self, id: String, _request: RequestContext) -> HandlerResult {
        Ok(Json(self.users.find(&id)?).into_response())
    }
}

struct Pages;

impl Routes for Pages {
    fn map(self: Arc<Self>, routes: RouteMapper) -> RouteMapper {
        routes
            .get("/app", || async { Html("<!DOCTYPE html><html></html>") })
            .get("/login", || async {
                Html("<!DOCTYPE html><html><head><title>login</title></head></html>")
            })
    }
}

fn users_app(events: &Arc<Mutex<Vec<String>>>) -> Application {
    let mut app = Application::new();
    app.set(config::HOST, "127.0.0.1");
    app.set(config::PORT, "0");

    let postinit = Arc::clone(events);
    let preclose = Arc::clone(events);
    app.module(
        ComponentDescriptor::module(|deps: &mut Injected| {
            Ok(Users {
                errors: deps.next()?,
                users: vec![
                    User {
                        id: 1,
                        name: "Joe".to_string(),
                    },
                    User {
                        id: 2,
                        name: "Jane".to_string(),
                    },
                ],
            })
        })
        .named("users")
        .inject(["$E"])
        .postinit(move |_: Arc<Users>| {
            let events = Arc::clone(&postinit);
            async move {
                events.lock().unwrap().push("postinit:users".to_string());
                Ok(())
            }
        })
        .preclose(move |_: Arc<Users>| {
            let events = Arc::clone(&preclose);
            async move {
                events.lock().unwrap().push("preclose:users".to_string());
                Ok(())
            }
        }),
    )
    .unwrap();

    app.resource(
        ComponentDescriptor::resource(|deps: &mut Injected| {
            let users = deps.next::<Users>()?;
            let _errors = deps.next::<ErrorKinds>()?;
            Ok(UsersResource { users })
        })
        .inject(["users", "$E"]),
    )
    .unwrap();

    app.routes(ComponentDescriptor::routes(|_: &mut Injected| Ok(Pages)))
        .unwrap();

    app
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_users_api() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut app = users_app(&events);
    app.init().await.unwrap();
    let router = app.router().unwrap();

    let (status, body) = get(router.clone(), "/api/user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":1,"name":"Joe"},{"id":2,"name":"Jane"}]"#);

    let (status, body) = get(router.clone(), "/api/user/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"id":1,"name":"Joe"}"#);

    let (status, body) = get(router.clone(), "/api/user/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["statusCode"], 404);
    assert_eq!(error["code"], "NotFound");

    let (status, _) = get(router.clone(), "/api/user/joe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(router.clone(), "/app").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<!DOCTYPE html><html></html>");

    let (status, body) = get(router, "/login").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "<!DOCTYPE html><html><head><title>login</title></head></html>"
    );
}

#[tokio::test]
async fn test_default_component_names() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut app = users_app(&events);
    app.init().await.unwrap();

    assert!(app.instance::<UsersResource>("usersResource").is_ok());
    assert!(app.instance::<Pages>("pages").is_ok());
    assert!(app.instance::<Users>("usersResource").is_err());
}

#[tokio::test]
async fn test_serves_over_tcp() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut app = users_app(&events);
    app.init().await.unwrap();
    let addr = app.listen().await.unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET /app HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .unwrap();
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("<!DOCTYPE html><html></html>"));

    app.close().await.unwrap();
    assert_eq!(app.state(), LifecycleState::Closed);
    assert_eq!(
        *events.lock().unwrap(),
        vec!["postinit:users", "preclose:users"]
    );
}

#[tokio::test]
async fn test_static_files_fallback() {
    let public = tempfile::TempDir::new().unwrap();
    std::fs::write(public.path().join("robots.txt"), "User-agent: *").unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut app = users_app(&events);
    app.set(
        config::PUBLIC_DIRECTORY,
        public.path().to_str().unwrap(),
    );
    app.init().await.unwrap();
    let router = app.router().unwrap();

    let (status, body) = get(router.clone(), "/robots.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User-agent: *");

    let (status, _) = get(router, "/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

use tessera::prelude::*;

const APP_PAGE: &str = "<!DOCTYPE html><html></html>";
const LOGIN_PAGE: &str = "<!DOCTYPE html><html><head><title>login</title></head></html>";

pub struct Pages;

impl Pages {
    pub fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::routes(|_: &mut Injected| Ok(Pages))
            .named("pages")
            .build()
    }
}

impl Routes for Pages {
    fn map(self: Arc<Self>, routes: RouteMapper) -> RouteMapper {
        routes
            .get("/app", || async { Html(APP_PAGE) })
            .get("/login", || async { Html(LOGIN_PAGE) })
    }
}

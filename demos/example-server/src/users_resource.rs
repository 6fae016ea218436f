use crate::users::Users;
use std::sync::Arc;
use tessera::prelude::*;

pub struct UsersResource {
    users: Arc<Users>,
    errors: Arc<ErrorKinds>,
}

impl UsersResource {
    pub fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::resource(|deps: &mut Injected| {
            Ok(UsersResource {
                users: deps.next()?,
                errors: deps.next()?,
            })
        })
        .named("usersResource")
        .inject(["users", "$E"])
        .build()
    }
}

#[async_trait]
impl Resource for UsersResource {
    fn base_path(&self) -> &str {
        "/api/user"
    }

    async fn get_all(&self, _request: RequestContext) -> HandlerResult {
        Ok(Json(self.users.all()).into_response())
    }

    async fn get(&self, id: String, _request: RequestContext) -> HandlerResult {
        let id: u32 = id
            .parse()
            .map_err(|_| self.errors.illegal_value(format!("'{id}' is not a user id")))?;
        let user = self.users.find(id)?;
        Ok(Json(user).into_response())
    }
}

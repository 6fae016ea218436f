use serde::Serialize;
use std::result::Result;
use std::sync::Arc;
use tessera::prelude::*;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u32,
    pub name: String,
}

/// In-memory user directory
pub struct Users {
    errors: Arc<ErrorKinds>,
    log: Arc<Logger>,
    users: Vec<User>,
}

impl Users {
    pub fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::module(|deps: &mut Injected| {
            Ok(Users {
                errors: deps.next()?,
                log: deps.next()?,
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
        .inject(["$E", "$log"])
        .postinit(|users: Arc<Users>| async move {
            users.log.info(format!("{} users loaded", users.users.len()));
            Ok(())
        })
        .preclose(|users: Arc<Users>| async move {
            users.log.info("Closing user directory");
            Ok(())
        })
        .build()
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    pub fn find(&self, id: u32) -> Result<&User, ApplicationError> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| self.errors.not_found(format!("User {id} does not exist")))
    }
}

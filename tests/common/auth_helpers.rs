//! Principal builders for tests

use tienda::backend::auth::{Principal, Role};

pub fn admin(id: &str, username: &str) -> Principal {
    Principal {
        id: id.to_string(),
        username: username.to_string(),
        role: Role::Admin,
    }
}

pub fn user(id: &str, username: &str) -> Principal {
    Principal {
        id: id.to_string(),
        username: username.to_string(),
        role: Role::User,
    }
}

use crate::error::CoreError;
use crate::store::{Store, USERS_TABLE};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const DEFAULT_USER: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";

fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Missing table bootstraps the stock admin credential, matching first-run
/// behavior of the desktop shell.
fn load_users(store: &Store) -> Result<BTreeMap<String, String>, CoreError> {
    match store.read_table::<BTreeMap<String, String>>(USERS_TABLE)? {
        Some(users) => Ok(users),
        None => {
            let mut users = BTreeMap::new();
            users.insert(DEFAULT_USER.to_string(), digest(DEFAULT_PASSWORD));
            store.write_table(USERS_TABLE, &users)?;
            Ok(users)
        }
    }
}

/// The single shared credential check. Unknown usernames simply fail.
pub fn verify(store: &Store, username: &str, password: &str) -> Result<bool, CoreError> {
    let _guard = store.begin_write();
    let users = load_users(store)?;
    Ok(users
        .get(username.trim())
        .map(|stored| *stored == digest(password))
        .unwrap_or(false))
}

pub fn set_password(store: &Store, username: &str, password: &str) -> Result<(), CoreError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CoreError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(CoreError::Validation(
            "password must not be empty".to_string(),
        ));
    }

    let _guard = store.begin_write();
    let mut users = load_users(store)?;
    users.insert(username.to_string(), digest(password));
    store.write_table(USERS_TABLE, &users)?;
    Ok(())
}

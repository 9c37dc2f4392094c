use crate::auth;
use crate::ipc::helpers::{required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn auth_verify(store: &Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let username = required_str(params, "username")?;
    let password = required_str(params, "password")?;
    let valid = auth::verify(store, &username, &password)?;
    Ok(json!({ "valid": valid }))
}

fn auth_set_password(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let username = required_str(params, "username")?;
    let password = required_str(params, "password")?;
    auth::set_password(store, &username, &password)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.verify" => Some(with_store(state, req, auth_verify)),
        "auth.setPassword" => Some(with_store(state, req, auth_set_password)),
        _ => None,
    }
}

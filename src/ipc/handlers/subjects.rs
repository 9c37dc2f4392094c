use crate::catalog;
use crate::ipc::helpers::{required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn subjects_define(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(params, "name")?;
    let code = required_str(params, "code")?;
    let subject = catalog::define_subject(store, &name, &code)?;
    Ok(json!({ "name": subject.name, "code": subject.code }))
}

fn subjects_list(store: &Store, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let subjects: Vec<serde_json::Value> = catalog::list_subjects(store)?
        .into_iter()
        .map(|s| json!({ "name": s.name, "code": s.code }))
        .collect();
    Ok(json!({ "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.define" => Some(with_store(state, req, subjects_define)),
        "subjects.list" => Some(with_store(state, req, subjects_list)),
        _ => None,
    }
}

use crate::authz;
use crate::ipc::helpers::{required_str, required_str_list, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn teachers_authorize(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher = required_str(params, "teacher")?;
    let sections = required_str_list(params, "sections")?;
    let stored = authz::authorize(store, &teacher, &sections)?;
    Ok(json!({ "teacher": teacher.trim(), "sections": stored }))
}

fn teachers_sections(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher = required_str(params, "teacher")?;
    let sections = authz::sections_for(store, &teacher)?;
    Ok(json!({ "teacher": teacher.trim(), "sections": sections }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.authorize" => Some(with_store(state, req, teachers_authorize)),
        "teachers.sections" => Some(with_store(state, req, teachers_sections)),
        _ => None,
    }
}

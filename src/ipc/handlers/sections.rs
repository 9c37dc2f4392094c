use crate::catalog;
use crate::ipc::helpers::{required_str, required_str_list, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn sections_define(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let code = required_str(params, "code")?;
    let created = catalog::define_section(store, &code)?;
    Ok(json!({ "code": created.code, "syllabus": created.syllabus }))
}

fn sections_list(store: &Store, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "sections": catalog::list_sections(store)? }))
}

fn sections_set_syllabus(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let section = required_str(params, "section")?;
    let subjects = required_str_list(params, "subjects")?;
    catalog::set_syllabus(store, &section, &subjects)?;
    Ok(json!({ "section": section.trim().to_uppercase(), "subjects": subjects }))
}

fn sections_syllabus(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let section = required_str(params, "section")?;
    let subjects = catalog::syllabus_for(store, &section)?;
    Ok(json!({ "section": section.trim().to_uppercase(), "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sections.define" => Some(with_store(state, req, sections_define)),
        "sections.list" => Some(with_store(state, req, sections_list)),
        "sections.setSyllabus" => Some(with_store(state, req, sections_set_syllabus)),
        "sections.syllabus" => Some(with_store(state, req, sections_syllabus)),
        _ => None,
    }
}

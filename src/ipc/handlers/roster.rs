use crate::ipc::helpers::{required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::rollnum::{self, Role};
use crate::roster;
use crate::store::Store;
use serde_json::json;

fn roster_allocate(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(params, "name")?;
    let role_raw = required_str(params, "role")?;
    let Some(role) = Role::parse(&role_raw) else {
        return Err(HandlerErr::bad_params(format!(
            "role must be student, teacher or admin, got {:?}",
            role_raw
        )));
    };
    let roll = rollnum::allocate(store, &name, role)?;
    Ok(json!({ "rollId": roll, "role": role.key() }))
}

fn roster_assign(store: &Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let section = required_str(params, "section")?;
    let assignment = roster::assign(store, &roll, &section)?;
    Ok(json!({
        "roll": roll.trim(),
        "section": assignment.section,
        "subjects": assignment.subjects,
        "entriesCreated": assignment.entries_created
    }))
}

fn roster_section_of(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let section = roster::section_of(store, &roll)?
        .unwrap_or_else(|| "Not assigned".to_string());
    Ok(json!({ "roll": roll.trim(), "section": section }))
}

fn roster_subjects_of(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let section = roster::section_of(store, &roll)?
        .unwrap_or_else(|| "Not assigned".to_string());
    let subjects = roster::subjects_of(store, &roll)?;
    Ok(json!({ "roll": roll.trim(), "section": section, "subjects": subjects }))
}

fn roster_assignments(
    store: &Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let rows: Vec<serde_json::Value> = roster::assignments_by_section(store)?
        .into_iter()
        .map(|(section, rolls)| json!({ "section": section, "rolls": rolls }))
        .collect();
    Ok(json!({ "sections": rows }))
}

fn roster_assign_unassigned(
    store: &Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let placed = roster::assign_unassigned(store)?;
    let rows: Vec<serde_json::Value> = placed
        .iter()
        .map(|(roll, section)| json!({ "roll": roll, "section": section }))
        .collect();
    Ok(json!({ "assigned": rows, "count": rows.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.allocate" => Some(with_store(state, req, roster_allocate)),
        "roster.assign" => Some(with_store(state, req, roster_assign)),
        "roster.sectionOf" => Some(with_store(state, req, roster_section_of)),
        "roster.subjectsOf" => Some(with_store(state, req, roster_subjects_of)),
        "roster.assignments" => Some(with_store(state, req, roster_assignments)),
        "roster.assignUnassigned" => Some(with_store(state, req, roster_assign_unassigned)),
        _ => None,
    }
}

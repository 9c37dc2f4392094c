use crate::ipc::helpers::{required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::store::Store;
use serde_json::json;

fn reports_attendance_by_subject(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let rows: Vec<serde_json::Value> = report::attendance_by_subject(store, &roll)?
        .into_iter()
        .map(|row| {
            json!({
                "subjectCode": row.subject_code,
                "subjectName": row.subject_name,
                "attendancePercentage": row.attendance_percentage
            })
        })
        .collect();
    Ok(json!({ "roll": roll.trim(), "rows": rows }))
}

fn reports_section_overview(
    store: &Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let rows: Vec<serde_json::Value> = report::section_overview(store)?
        .into_iter()
        .map(|row| json!({ "section": row.section, "rolls": row.rolls }))
        .collect();
    Ok(json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.attendanceBySubject" => Some(with_store(state, req, reports_attendance_by_subject)),
        "reports.sectionOverview" => Some(with_store(state, req, reports_section_overview)),
        _ => None,
    }
}

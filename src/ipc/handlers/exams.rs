use crate::exams;
use crate::ipc::helpers::{optional_str, required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn exams_set(store: &Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let subject_code = required_str(params, "subjectCode")?;
    let subject_name = required_str(params, "subjectName")?;
    let exam_date = required_str(params, "examDate")?;
    let entry = exams::set_exam(store, &subject_code, &subject_name, &exam_date)?;
    Ok(json!({
        "subjectCode": entry.subject_code,
        "subjectName": entry.subject_name,
        "examDate": entry.exam_date
    }))
}

fn exams_deadlines(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let subject_code = optional_str(params, "subjectCode");
    let rows: Vec<serde_json::Value> = exams::deadlines(store, subject_code.as_deref())?
        .into_iter()
        .map(|row| {
            json!({
                "subjectCode": row.subject_code,
                "subjectName": row.subject_name,
                "examDate": row.exam_date,
                "countdown": row.countdown
            })
        })
        .collect();
    Ok(json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exams.set" => Some(with_store(state, req, exams_set)),
        "exams.deadlines" => Some(with_store(state, req, exams_deadlines)),
        _ => None,
    }
}

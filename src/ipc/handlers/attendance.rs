use crate::ipc::helpers::{required_bool, required_i64, required_str, with_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::ledger::{self, Entry};
use crate::store::Store;
use serde_json::json;

fn entry_json(subject_code: &str, entry: &Entry) -> serde_json::Value {
    json!({
        "subjectCode": subject_code,
        "subjectName": entry.subject_name,
        "totalWorkingDays": entry.total_working_days,
        "totalPresentDays": entry.total_present_days,
        "attendancePercentage": entry.attendance_percentage,
        "lastUpdated": entry.last_updated
    })
}

fn attendance_mark(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher = required_str(params, "teacher")?;
    let roll = required_str(params, "roll")?;
    let subject_code = required_str(params, "subjectCode")?.trim().to_uppercase();
    let present = required_bool(params, "present")?;
    let entry = ledger::mark(store, &teacher, &roll, &subject_code, present)?;
    Ok(entry_json(&subject_code, &entry))
}

fn attendance_correct(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher = required_str(params, "teacher")?;
    let roll = required_str(params, "roll")?;
    let subject_code = required_str(params, "subjectCode")?.trim().to_uppercase();
    let working_days = required_i64(params, "workingDays")?;
    let present_days = required_i64(params, "presentDays")?;
    let entry = ledger::correct(
        store,
        &teacher,
        &roll,
        &subject_code,
        working_days,
        present_days,
    )?;
    Ok(entry_json(&subject_code, &entry))
}

fn attendance_summary(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let record = ledger::summary_of(store, &roll)?;
    let subjects: Vec<serde_json::Value> = record
        .subjects
        .iter()
        .map(|(code, entry)| entry_json(code, entry))
        .collect();
    Ok(json!({
        "roll": roll.trim(),
        "name": record.name,
        "section": record.section,
        "subjects": subjects
    }))
}

fn attendance_percentage(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = required_str(params, "roll")?;
    let subject_code = required_str(params, "subjectCode")?.trim().to_uppercase();
    let pct = ledger::percentage_of(store, &roll, &subject_code)?;
    Ok(json!({
        "roll": roll.trim(),
        "subjectCode": subject_code,
        "attendancePercentage": pct
    }))
}

fn attendance_metadata(
    store: &Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let meta = ledger::book_metadata(store)?;
    Ok(json!({
        "lastUpdated": meta.last_updated,
        "totalStudents": meta.total_students,
        "academicYear": meta.academic_year,
        "totalSubjects": meta.total_subjects
    }))
}

fn attendance_rebuild(
    store: &Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let summary = ledger::rebuild(store)?;
    Ok(json!({
        "recordsAdded": summary.records_added,
        "namesCorrected": summary.names_corrected
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(with_store(state, req, attendance_mark)),
        "attendance.correct" => Some(with_store(state, req, attendance_correct)),
        "attendance.summary" => Some(with_store(state, req, attendance_summary)),
        "attendance.percentage" => Some(with_store(state, req, attendance_percentage)),
        "attendance.metadata" => Some(with_store(state, req, attendance_metadata)),
        "attendance.rebuild" => Some(with_store(state, req, attendance_rebuild)),
        _ => None,
    }
}

use crate::error::CoreError;
use crate::store::{Store, EXAM_TABLE};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const EXAM_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamEntry {
    pub subject_code: String,
    pub subject_name: String,
    /// `DD/MM/YYYY`, the legacy on-disk format.
    pub exam_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamSchedule {
    #[serde(default)]
    pub exam_schedule: Vec<ExamEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamDeadline {
    pub subject_code: String,
    pub subject_name: String,
    pub exam_date: String,
    pub countdown: String,
}

fn parse_exam_date(s: &str) -> Result<NaiveDateTime, CoreError> {
    NaiveDate::parse_from_str(s.trim(), EXAM_DATE_FORMAT)
        .map_err(|_| CoreError::Validation(format!("exam date must be DD/MM/YYYY, got {:?}", s)))
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn countdown_from(exam: NaiveDateTime, now: NaiveDateTime) -> String {
    let delta = exam - now;
    if delta.num_seconds() < 0 {
        return "Exam already passed!".to_string();
    }
    let days = delta.num_days();
    let mut rem = delta.num_seconds() - days * 86_400;
    let hours = rem / 3_600;
    rem %= 3_600;
    let minutes = rem / 60;
    let seconds = rem % 60;
    format!("{}d {}h {}m {}s left", days, hours, minutes, seconds)
}

/// Upserts the exam date for a subject code.
pub fn set_exam(
    store: &Store,
    subject_code: &str,
    subject_name: &str,
    exam_date: &str,
) -> Result<ExamEntry, CoreError> {
    let code = subject_code.trim().to_uppercase();
    if code.is_empty() {
        return Err(CoreError::Validation(
            "subject code must not be empty".to_string(),
        ));
    }
    parse_exam_date(exam_date)?;
    let entry = ExamEntry {
        subject_code: code.clone(),
        subject_name: subject_name.trim().to_string(),
        exam_date: exam_date.trim().to_string(),
    };

    let _guard = store.begin_write();
    let mut schedule: ExamSchedule = store.read_table_or_default(EXAM_TABLE)?;
    match schedule
        .exam_schedule
        .iter_mut()
        .find(|e| e.subject_code.eq_ignore_ascii_case(&code))
    {
        Some(existing) => *existing = entry.clone(),
        None => schedule.exam_schedule.push(entry.clone()),
    }
    store.write_table(EXAM_TABLE, &schedule)?;
    Ok(entry)
}

/// Deadlines with a live countdown, for one subject code or the whole
/// schedule. A requested code with no scheduled exam is `NotFound`.
pub fn deadlines(store: &Store, subject_code: Option<&str>) -> Result<Vec<ExamDeadline>, CoreError> {
    let schedule: ExamSchedule = store.read_table_or_default(EXAM_TABLE)?;
    let now = Local::now().naive_local();

    let wanted = subject_code.map(|c| c.trim().to_uppercase());
    let mut rows = Vec::new();
    for entry in &schedule.exam_schedule {
        if let Some(code) = &wanted {
            if !entry.subject_code.eq_ignore_ascii_case(code) {
                continue;
            }
        }
        let exam = parse_exam_date(&entry.exam_date)?;
        rows.push(ExamDeadline {
            subject_code: entry.subject_code.clone(),
            subject_name: entry.subject_name.clone(),
            exam_date: entry.exam_date.clone(),
            countdown: countdown_from(exam, now),
        });
    }

    if let Some(code) = wanted {
        if rows.is_empty() {
            return Err(CoreError::NotFound(format!(
                "no exam scheduled for subject {}",
                code
            )));
        }
    }
    Ok(rows)
}

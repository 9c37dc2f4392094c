use crate::authz;
use crate::catalog;
use crate::error::CoreError;
use crate::rollnum;
use crate::roster;
use crate::store::{Store, ATTENDANCE_TABLE};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const ACADEMIC_YEAR: &str = "2025-26";

/// Per (roll, subject) cumulative counters. `attendance_percentage` is
/// derived from the two counters on every write and never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub subject_name: String,
    pub total_working_days: u32,
    pub total_present_days: u32,
    pub attendance_percentage: f64,
    pub last_updated: String,
}

impl Entry {
    fn zeroed(subject_name: &str) -> Entry {
        Entry {
            subject_name: subject_name.to_string(),
            total_working_days: 0,
            total_present_days: 0,
            attendance_percentage: 0.0,
            last_updated: today(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub section: String,
    #[serde(default)]
    pub subjects: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub total_subjects: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceBook {
    #[serde(default)]
    pub attendance_records: BTreeMap<String, StudentRecord>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default)]
pub struct RebuildSummary {
    pub records_added: usize,
    pub names_corrected: usize,
}

fn today() -> String {
    Local::now().date_naive().to_string()
}

/// `round(100 * present / working, 2)`; 0.0 for an empty denominator.
pub fn percentage(present: u32, working: u32) -> f64 {
    if working == 0 {
        return 0.0;
    }
    let pct = 100.0 * f64::from(present) / f64::from(working);
    (pct * 100.0).round() / 100.0
}

/// Records are keyed by the title-cased allocation name; rolls that were
/// allocated under a numeric name fall back to the roll itself.
fn display_name(alloc_name: &str, roll: &str) -> String {
    let trimmed = alloc_name.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit()) {
        return roll.to_string();
    }
    trimmed
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn subject_key(code_index: &BTreeMap<String, String>, subject_name: &str) -> String {
    code_index
        .get(subject_name)
        .cloned()
        .unwrap_or_else(|| subject_name.to_uppercase().replace(' ', "_"))
}

fn refresh_metadata(book: &mut AttendanceBook) {
    let codes: BTreeSet<&String> = book
        .attendance_records
        .values()
        .flat_map(|r| r.subjects.keys())
        .collect();
    book.metadata = Metadata {
        last_updated: today(),
        total_students: book.attendance_records.len() as u64,
        academic_year: ACADEMIC_YEAR.to_string(),
        total_subjects: codes.len() as u64,
    };
}

fn load_book(store: &Store) -> Result<AttendanceBook, CoreError> {
    store.read_table_or_default(ATTENDANCE_TABLE)
}

/// Creates a zeroed entry for every syllabus subject the roll does not
/// already have. Existing entries are never touched, so repeated calls (for
/// example on reassignment) are safe. Returns the number of entries created.
pub fn initialize(
    store: &Store,
    roll: &str,
    section: &str,
    subjects: &[String],
) -> Result<usize, CoreError> {
    if subjects.is_empty() {
        return Ok(0);
    }

    let name_index = rollnum::student_name_index(store)?;
    let code_index = catalog::subject_code_index(store)?;

    let _guard = store.begin_write();
    let mut book = load_book(store)?;

    let record = book
        .attendance_records
        .entry(roll.to_string())
        .or_insert_with(|| StudentRecord {
            name: display_name(name_index.get(roll).map(String::as_str).unwrap_or(""), roll),
            section: section.to_string(),
            subjects: BTreeMap::new(),
        });
    let section_changed = record.section != section;
    record.section = section.to_string();

    let mut created = 0usize;
    for subject_name in subjects {
        let key = subject_key(&code_index, subject_name);
        record.subjects.entry(key).or_insert_with(|| {
            created += 1;
            Entry::zeroed(subject_name)
        });
    }

    if created > 0 || section_changed {
        refresh_metadata(&mut book);
        store.write_table(ATTENDANCE_TABLE, &book)?;
    }
    Ok(created)
}

/// Resolves the roll's section and enforces the write gate. Order matters:
/// unassigned rolls are a lookup failure, not an authorization failure.
fn authorized_section(store: &Store, teacher: &str, roll: &str) -> Result<String, CoreError> {
    let section = roster::section_of(store, roll)?
        .ok_or_else(|| CoreError::NotFound(format!("roll {} is not assigned to a section", roll)))?;
    if !authz::is_authorized(store, teacher, &section)? {
        return Err(CoreError::Authorization {
            teacher: teacher.to_string(),
            section,
        });
    }
    Ok(section)
}

fn entry_mut<'a>(
    book: &'a mut AttendanceBook,
    roll: &str,
    subject_code: &str,
) -> Result<&'a mut Entry, CoreError> {
    let record = book
        .attendance_records
        .get_mut(roll)
        .ok_or_else(|| CoreError::NotFound(format!("no attendance record for roll {}", roll)))?;
    record.subjects.get_mut(subject_code).ok_or_else(|| {
        CoreError::NotFound(format!("no entry for subject {} under roll {}", subject_code, roll))
    })
}

/// One incremental attendance marking: +1 working day, +1 present day when
/// `present`. Irreversible at this layer; a mistaken mark is fixed with
/// `correct`.
pub fn mark(
    store: &Store,
    teacher: &str,
    roll: &str,
    subject_code: &str,
    present: bool,
) -> Result<Entry, CoreError> {
    let roll = roll.trim();
    let subject_code = subject_code.trim().to_uppercase();
    authorized_section(store, teacher, roll)?;

    let _guard = store.begin_write();
    let mut book = load_book(store)?;
    let entry = entry_mut(&mut book, roll, &subject_code)?;
    entry.total_working_days += 1;
    if present {
        entry.total_present_days += 1;
    }
    entry.attendance_percentage = percentage(entry.total_present_days, entry.total_working_days);
    entry.last_updated = today();
    let updated = entry.clone();

    refresh_metadata(&mut book);
    store.write_table(ATTENDANCE_TABLE, &book)?;
    Ok(updated)
}

/// Absolute correction: overwrites both counters, subject to
/// `0 <= present <= working`. A violating call leaves the entry unchanged.
pub fn correct(
    store: &Store,
    teacher: &str,
    roll: &str,
    subject_code: &str,
    new_working_days: i64,
    new_present_days: i64,
) -> Result<Entry, CoreError> {
    let roll = roll.trim();
    let subject_code = subject_code.trim().to_uppercase();
    authorized_section(store, teacher, roll)?;

    if new_working_days < 0 || new_present_days < 0 {
        return Err(CoreError::Validation(
            "day counts must not be negative".to_string(),
        ));
    }
    if new_present_days > new_working_days {
        return Err(CoreError::Validation(format!(
            "present days ({}) cannot exceed working days ({})",
            new_present_days, new_working_days
        )));
    }

    let _guard = store.begin_write();
    let mut book = load_book(store)?;
    let entry = entry_mut(&mut book, roll, &subject_code)?;
    entry.total_working_days = new_working_days as u32;
    entry.total_present_days = new_present_days as u32;
    entry.attendance_percentage = percentage(entry.total_present_days, entry.total_working_days);
    entry.last_updated = today();
    let updated = entry.clone();

    refresh_metadata(&mut book);
    store.write_table(ATTENDANCE_TABLE, &book)?;
    Ok(updated)
}

/// Whole-record view; reads are not authorization-gated.
pub fn summary_of(store: &Store, roll: &str) -> Result<StudentRecord, CoreError> {
    let book = load_book(store)?;
    book.attendance_records
        .get(roll.trim())
        .cloned()
        .ok_or_else(|| CoreError::NotFound(format!("no attendance record for roll {}", roll)))
}

pub fn percentage_of(store: &Store, roll: &str, subject_code: &str) -> Result<f64, CoreError> {
    let subject_code = subject_code.trim().to_uppercase();
    let record = summary_of(store, roll)?;
    record
        .subjects
        .get(&subject_code)
        .map(|e| e.attendance_percentage)
        .ok_or_else(|| {
            CoreError::NotFound(format!(
                "no entry for subject {} under roll {}",
                subject_code, roll
            ))
        })
}

pub fn book_metadata(store: &Store) -> Result<Metadata, CoreError> {
    Ok(load_book(store)?.metadata)
}

/// Maintenance repair: ensure every allocated student roll has a record,
/// correct display names that drifted, refresh metadata. Existing counters
/// are never touched.
pub fn rebuild(store: &Store) -> Result<RebuildSummary, CoreError> {
    let name_index = rollnum::student_name_index(store)?;
    let code_index = catalog::subject_code_index(store)?;
    let all_subjects = catalog::list_subjects(store)?;

    let _guard = store.begin_write();
    let mut book = load_book(store)?;
    let mut summary = RebuildSummary::default();

    for (roll, alloc_name) in &name_index {
        if let Some(record) = book.attendance_records.get_mut(roll) {
            let desired = display_name(alloc_name, roll);
            if record.name != desired {
                record.name = desired;
                summary.names_corrected += 1;
            }
            continue;
        }

        let section = roster::section_of(store, roll)?;
        let mut subject_names = match &section {
            Some(sec) => catalog::syllabus_for(store, sec)?,
            None => Vec::new(),
        };
        if subject_names.is_empty() {
            subject_names = roster::subjects_of(store, roll)?;
        }
        if subject_names.is_empty() {
            // Last resort so the record is not empty: the first five catalog
            // subjects.
            subject_names = all_subjects.iter().take(5).map(|s| s.name.clone()).collect();
        }

        let mut subjects = BTreeMap::new();
        for subject_name in &subject_names {
            subjects.insert(subject_key(&code_index, subject_name), Entry::zeroed(subject_name));
        }
        book.attendance_records.insert(
            roll.clone(),
            StudentRecord {
                name: display_name(alloc_name, roll),
                section: section.unwrap_or_else(|| "Not assigned".to_string()),
                subjects,
            },
        );
        summary.records_added += 1;
    }

    if summary.records_added > 0 || summary.names_corrected > 0 {
        refresh_metadata(&mut book);
        store.write_table(ATTENDANCE_TABLE, &book)?;
    }
    Ok(summary)
}

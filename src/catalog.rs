use crate::error::CoreError;
use crate::store::{
    Store, SECTION_LIST_TABLE, SECTION_SUBJECTS_TABLE, SUBJECTS_TABLE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectsTable {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Semester-bucket section codes ship with the stock syllabus for that
/// semester; any other code starts empty and gets an explicit syllabus.
fn default_syllabus(code: &str) -> Option<&'static [&'static str]> {
    match code {
        "AI" | "BI" | "CI" | "DI" => Some(&[
            "Basic Maths",
            "English-I",
            "C Lang",
            "Electronics",
            "Computer Networking",
        ]),
        "AIII" | "BIII" | "CIII" | "DIII" => Some(&[
            "DSA",
            "English-III",
            "Maths-III",
            "Artificial Intelligence",
            "Operating System",
        ]),
        "AV" | "BV" | "CV" | "DV" => Some(&[
            "English-V",
            "Machine Learning",
            "Algorithm",
            "OOP",
            "Database",
        ]),
        _ => None,
    }
}

fn normalize_code(code: &str) -> Result<String, CoreError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(CoreError::Validation("code must not be empty".to_string()));
    }
    Ok(code)
}

/// Subject `code` is globally unique (case-insensitive); `name` is not.
pub fn define_subject(store: &Store, name: &str, code: &str) -> Result<Subject, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "subject name must not be empty".to_string(),
        ));
    }
    let code = normalize_code(code)?;

    let _guard = store.begin_write();
    let mut table: SubjectsTable = store.read_table_or_default(SUBJECTS_TABLE)?;
    if table.subjects.iter().any(|s| s.code.eq_ignore_ascii_case(&code)) {
        return Err(CoreError::Duplicate {
            kind: "subject",
            key: code,
        });
    }
    let subject = Subject {
        name: name.to_string(),
        code,
    };
    table.subjects.push(subject.clone());
    store.write_table(SUBJECTS_TABLE, &table)?;
    Ok(subject)
}

pub fn list_subjects(store: &Store) -> Result<Vec<Subject>, CoreError> {
    let table: SubjectsTable = store.read_table_or_default(SUBJECTS_TABLE)?;
    Ok(table.subjects)
}

/// Lookup subject name -> code for resolving syllabus names into ledger keys.
pub fn subject_code_index(store: &Store) -> Result<BTreeMap<String, String>, CoreError> {
    let table: SubjectsTable = store.read_table_or_default(SUBJECTS_TABLE)?;
    Ok(table
        .subjects
        .into_iter()
        .map(|s| (s.name, s.code))
        .collect())
}

#[derive(Debug, Clone)]
pub struct SectionCreated {
    pub code: String,
    pub syllabus: Vec<String>,
}

pub fn define_section(store: &Store, code: &str) -> Result<SectionCreated, CoreError> {
    let code = normalize_code(code)?;

    let _guard = store.begin_write();
    let mut list = load_section_list(store)?;
    if list.iter().any(|s| s == &code) {
        return Err(CoreError::Duplicate {
            kind: "section",
            key: code,
        });
    }
    list.push(code.clone());
    list.sort();
    store.write_table(SECTION_LIST_TABLE, &list)?;

    let syllabus: Vec<String> = default_syllabus(&code)
        .map(|subjects| subjects.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default();
    if !syllabus.is_empty() {
        let mut map: BTreeMap<String, Vec<String>> =
            store.read_table_or_default(SECTION_SUBJECTS_TABLE)?;
        map.insert(code.clone(), syllabus.clone());
        store.write_table(SECTION_SUBJECTS_TABLE, &map)?;
    }

    Ok(SectionCreated { code, syllabus })
}

pub fn list_sections(store: &Store) -> Result<Vec<String>, CoreError> {
    load_section_list(store)
}

pub fn section_exists(store: &Store, code: &str) -> Result<bool, CoreError> {
    let code = code.trim().to_uppercase();
    Ok(load_section_list(store)?.iter().any(|s| s == &code))
}

/// Replaces the section's syllabus wholesale. The section must exist; the
/// subject names are kept in the given order.
pub fn set_syllabus(store: &Store, section: &str, subjects: &[String]) -> Result<(), CoreError> {
    let section = normalize_code(section)?;

    let _guard = store.begin_write();
    if !load_section_list(store)?.iter().any(|s| s == &section) {
        return Err(CoreError::UnknownSection(section));
    }
    let cleaned: Vec<String> = subjects
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let mut map: BTreeMap<String, Vec<String>> =
        store.read_table_or_default(SECTION_SUBJECTS_TABLE)?;
    map.insert(section, cleaned);
    store.write_table(SECTION_SUBJECTS_TABLE, &map)?;
    Ok(())
}

/// Empty when the section is unknown or has no syllabus yet; not an error.
pub fn syllabus_for(store: &Store, section: &str) -> Result<Vec<String>, CoreError> {
    let section = section.trim().to_uppercase();
    let map: BTreeMap<String, Vec<String>> =
        store.read_table_or_default(SECTION_SUBJECTS_TABLE)?;
    Ok(map.get(&section).cloned().unwrap_or_default())
}

fn load_section_list(store: &Store) -> Result<Vec<String>, CoreError> {
    let raw: Vec<String> = store.read_table_or_default(SECTION_LIST_TABLE)?;
    // Legacy files may carry stray whitespace or case; normalize on load.
    let mut list: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    list.sort();
    list.dedup();
    Ok(list)
}

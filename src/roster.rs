use crate::catalog;
use crate::error::CoreError;
use crate::ledger;
use crate::rollnum;
use crate::store::{Store, ROLL_NUMBERS_TABLE, ROLL_SECTIONS_TABLE, STUDENT_SUBJECTS_TABLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cached view of a student's section and subject list, mirrored from the
/// section syllabus at assignment time. Later syllabus edits do not flow back
/// into rows already cached here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentSubjects {
    pub section: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub section: String,
    pub subjects: Vec<String>,
    pub entries_created: usize,
}

/// Binds `roll` to `section` (reassignment overwrites), caches the syllabus,
/// and initializes attendance entries for any syllabus subject the student
/// does not already have. Prior-section ledger entries are left in place.
pub fn assign(store: &Store, roll: &str, section: &str) -> Result<Assignment, CoreError> {
    let roll = roll.trim();
    if roll.is_empty() {
        return Err(CoreError::Validation("roll must not be empty".to_string()));
    }
    let section = section.trim().to_uppercase();
    if !catalog::section_exists(store, &section)? {
        return Err(CoreError::UnknownSection(section));
    }
    let subjects = catalog::syllabus_for(store, &section)?;

    {
        let _guard = store.begin_write();
        let mut map: BTreeMap<String, String> =
            store.read_table_or_default(ROLL_SECTIONS_TABLE)?;
        map.insert(roll.to_string(), section.clone());
        store.write_table(ROLL_SECTIONS_TABLE, &map)?;

        let mut cache: BTreeMap<String, StudentSubjects> =
            store.read_table_or_default(STUDENT_SUBJECTS_TABLE)?;
        cache.insert(
            roll.to_string(),
            StudentSubjects {
                section: section.clone(),
                subjects: subjects.clone(),
            },
        );
        store.write_table(STUDENT_SUBJECTS_TABLE, &cache)?;
    }

    // Ledger initialization takes the write guard itself.
    let entries_created = if subjects.is_empty() {
        0
    } else {
        ledger::initialize(store, roll, &section, &subjects)?
    };

    Ok(Assignment {
        section,
        subjects,
        entries_created,
    })
}

/// `None` when the roll has never been assigned.
pub fn section_of(store: &Store, roll: &str) -> Result<Option<String>, CoreError> {
    let map: BTreeMap<String, String> = store.read_table_or_default(ROLL_SECTIONS_TABLE)?;
    Ok(map.get(roll.trim()).map(|s| s.trim().to_uppercase()))
}

/// The cached subject list from assignment time; empty if unassigned.
pub fn subjects_of(store: &Store, roll: &str) -> Result<Vec<String>, CoreError> {
    let cache: BTreeMap<String, StudentSubjects> =
        store.read_table_or_default(STUDENT_SUBJECTS_TABLE)?;
    Ok(cache
        .get(roll.trim())
        .map(|s| s.subjects.clone())
        .unwrap_or_default())
}

/// Current assignments grouped by section, rolls sorted within each.
pub fn assignments_by_section(store: &Store) -> Result<BTreeMap<String, Vec<String>>, CoreError> {
    let map: BTreeMap<String, String> = store.read_table_or_default(ROLL_SECTIONS_TABLE)?;
    let mut by_section: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (roll, section) in map {
        by_section
            .entry(section.trim().to_uppercase())
            .or_default()
            .push(roll);
    }
    for rolls in by_section.values_mut() {
        rolls.sort();
    }
    Ok(by_section)
}

/// Distributes every allocated-but-unassigned student round-robin across the
/// defined sections. Existing assignments are preserved.
pub fn assign_unassigned(store: &Store) -> Result<Vec<(String, String)>, CoreError> {
    let sections = catalog::list_sections(store)?;
    if sections.is_empty() {
        return Err(CoreError::Validation("no sections available".to_string()));
    }

    let rolls: Vec<String> = {
        let table: rollnum::RollTable = store.read_table_or_default(ROLL_NUMBERS_TABLE)?;
        let mut rolls: Vec<String> = table.map.student.values().cloned().collect();
        rolls.sort();
        rolls
    };
    let assigned: BTreeMap<String, String> = store.read_table_or_default(ROLL_SECTIONS_TABLE)?;

    let mut placed = Vec::new();
    let mut idx = 0usize;
    for roll in rolls {
        if assigned.contains_key(&roll) {
            continue;
        }
        let section = sections[idx % sections.len()].clone();
        assign(store, &roll, &section)?;
        placed.push((roll, section));
        idx += 1;
    }
    Ok(placed)
}

use crate::error::CoreError;
use crate::ledger;
use crate::roster;
use crate::store::Store;
use serde::Serialize;

/// Chart feed for one student: one row per subject, in ledger key order.
/// Read-only; display clients own the rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectAttendance {
    pub subject_code: String,
    pub subject_name: String,
    pub attendance_percentage: f64,
}

pub fn attendance_by_subject(store: &Store, roll: &str) -> Result<Vec<SubjectAttendance>, CoreError> {
    let record = ledger::summary_of(store, roll)?;
    Ok(record
        .subjects
        .into_iter()
        .map(|(code, entry)| SubjectAttendance {
            subject_code: code,
            subject_name: entry.subject_name,
            attendance_percentage: entry.attendance_percentage,
        })
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionOverviewRow {
    pub section: String,
    pub rolls: Vec<String>,
}

/// Current section assignments, one row per section with sorted rolls.
pub fn section_overview(store: &Store) -> Result<Vec<SectionOverviewRow>, CoreError> {
    Ok(roster::assignments_by_section(store)?
        .into_iter()
        .map(|(section, rolls)| SectionOverviewRow { section, rolls })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollnum::{self, Role};
    use crate::{authz, catalog, roster};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_store(prefix: &str) -> Store {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        Store::open(&p).expect("open store")
    }

    #[test]
    fn chart_rows_carry_code_name_and_percentage() {
        let store = temp_store("edutrack-report-rows");
        catalog::define_subject(&store, "Maths", "MTH101").expect("subject");
        catalog::define_section(&store, "A").expect("section");
        catalog::set_syllabus(&store, "A", &["Maths".to_string()]).expect("syllabus");
        authz::authorize(&store, "T0001", &["A".to_string()]).expect("authorize");
        let roll = rollnum::allocate(&store, "Asha", Role::Student).expect("roll");
        roster::assign(&store, &roll, "A").expect("assign");
        crate::ledger::mark(&store, "T0001", &roll, "MTH101", true).expect("mark");

        let rows = attendance_by_subject(&store, &roll).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject_code, "MTH101");
        assert_eq!(rows[0].subject_name, "Maths");
        assert_eq!(rows[0].attendance_percentage, 100.0);
    }

    #[test]
    fn overview_groups_rolls_by_section() {
        let store = temp_store("edutrack-report-overview");
        catalog::define_section(&store, "A").expect("a");
        catalog::define_section(&store, "B").expect("b");
        roster::assign(&store, "20250002", "A").expect("assign 2");
        roster::assign(&store, "20250001", "A").expect("assign 1");
        roster::assign(&store, "20250003", "B").expect("assign 3");

        let rows = section_overview(&store).expect("overview");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].section, "A");
        assert_eq!(rows[0].rolls, vec!["20250001", "20250002"]);
        assert_eq!(rows[1].section, "B");
    }
}

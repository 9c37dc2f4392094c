use crate::error::CoreError;
use crate::store::{Store, TEACHER_SECTIONS_TABLE};
use std::collections::BTreeMap;

/// Replaces the teacher's whole authorized-section set. Passing the same set
/// again is a no-op on the stored state.
pub fn authorize(store: &Store, teacher: &str, sections: &[String]) -> Result<Vec<String>, CoreError> {
    let teacher = teacher.trim();
    if teacher.is_empty() {
        return Err(CoreError::Validation(
            "teacher id must not be empty".to_string(),
        ));
    }
    let mut cleaned: Vec<String> = sections
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    cleaned.sort();
    cleaned.dedup();

    let _guard = store.begin_write();
    let mut table: BTreeMap<String, Vec<String>> =
        store.read_table_or_default(TEACHER_SECTIONS_TABLE)?;
    table.insert(teacher.to_string(), cleaned.clone());
    store.write_table(TEACHER_SECTIONS_TABLE, &table)?;
    Ok(cleaned)
}

pub fn sections_for(store: &Store, teacher: &str) -> Result<Vec<String>, CoreError> {
    let table: BTreeMap<String, Vec<String>> =
        store.read_table_or_default(TEACHER_SECTIONS_TABLE)?;
    Ok(table.get(teacher.trim()).cloned().unwrap_or_default())
}

/// Case-insensitive membership test. A teacher with no record is authorized
/// for nothing.
pub fn is_authorized(store: &Store, teacher: &str, section: &str) -> Result<bool, CoreError> {
    let wanted = section.trim().to_uppercase();
    Ok(sections_for(store, teacher)?
        .iter()
        .any(|s| s.to_uppercase() == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn authorize_replaces_the_full_set() {
        let store = temp_store("edutrack-authz-replace");
        authorize(&store, "T0001", &["A".to_string(), "B".to_string()]).expect("first");
        authorize(&store, "T0001", &["C".to_string()]).expect("second");
        assert_eq!(sections_for(&store, "T0001").unwrap(), vec!["C".to_string()]);
        assert!(!is_authorized(&store, "T0001", "A").unwrap());
    }

    #[test]
    fn membership_is_case_insensitive() {
        let store = temp_store("edutrack-authz-case");
        authorize(&store, "T0001", &["av".to_string()]).expect("authorize");
        assert!(is_authorized(&store, "T0001", "Av").unwrap());
    }

    #[test]
    fn unknown_teacher_is_authorized_for_nothing() {
        let store = temp_store("edutrack-authz-none");
        assert!(!is_authorized(&store, "T0099", "A").unwrap());
        assert!(sections_for(&store, "T0099").unwrap().is_empty());
    }
}

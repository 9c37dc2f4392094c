mod test_support;

use serde_json::json;
use test_support::{request_ok, seed_basic_class, spawn_sidecar, temp_dir};

#[test]
fn the_ledger_file_keeps_the_legacy_field_names() {
    let workspace = temp_dir("edutrack-persist");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "present": true }),
    );

    let text =
        std::fs::read_to_string(workspace.join("attendance_master.json")).expect("ledger file");
    let doc: serde_json::Value = serde_json::from_str(&text).expect("ledger json");

    let entry = &doc["attendance_records"][&roll]["subjects"]["MTH101"];
    assert_eq!(entry["subject_name"], "Maths");
    assert_eq!(entry["total_working_days"], 1);
    assert_eq!(entry["total_present_days"], 1);
    assert_eq!(entry["attendance_percentage"].as_f64(), Some(100.0));
    assert!(entry["last_updated"].as_str().is_some());

    let record = &doc["attendance_records"][&roll];
    assert_eq!(record["name"], "Asha");
    assert_eq!(record["section"], "A");

    let metadata = &doc["metadata"];
    assert_eq!(metadata["total_students"], 1);
    assert_eq!(metadata["total_subjects"], 1);
    assert_eq!(metadata["academic_year"], "2025-26");
    assert!(metadata["last_updated"].as_str().is_some());

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn roll_allocation_store_keeps_the_legacy_shape() {
    let workspace = temp_dir("edutrack-persist-rolls");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "roster.allocate",
        json!({ "name": "Asha", "role": "student" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "roster.allocate",
        json!({ "name": "Mira", "role": "teacher" }),
    );

    let text = std::fs::read_to_string(workspace.join("rollnumbers.json")).expect("roll table");
    let doc: serde_json::Value = serde_json::from_str(&text).expect("roll json");
    assert_eq!(doc["map"]["student"]["Asha"], "20250001");
    assert_eq!(doc["map"]["teacher"]["Mira"], "T0001");
    assert_eq!(doc["counters"]["student"], 1);
    assert_eq!(doc["counters"]["teacher"], 1);
    assert_eq!(doc["counters"]["admin"], 0);

    let _ = std::fs::remove_dir_all(workspace);
}

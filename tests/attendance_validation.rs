mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, seed_basic_class, spawn_sidecar, temp_dir};

#[test]
fn correction_cannot_break_the_counter_invariant() {
    let workspace = temp_dir("edutrack-validate");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "present": true }),
    );

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.correct",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "workingDays": 5, "presentDays": 6 }),
    );
    assert_eq!(code, "validation_failed");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.correct",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "workingDays": -1, "presentDays": 0 }),
    );
    assert_eq!(code, "validation_failed");

    // The rejected corrections left the entry exactly as the mark put it.
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.summary",
        json!({ "roll": roll }),
    );
    let entry = &summary["subjects"][0];
    assert_eq!(entry["totalWorkingDays"], 1);
    assert_eq!(entry["totalPresentDays"], 1);
    assert_eq!(entry["attendancePercentage"].as_f64(), Some(100.0));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn correcting_to_zero_days_zeroes_the_percentage() {
    let workspace = temp_dir("edutrack-validate-zero");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "present": true }),
    );
    let entry = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.correct",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "workingDays": 0, "presentDays": 0 }),
    );
    assert_eq!(entry["attendancePercentage"].as_f64(), Some(0.0));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn marking_an_unknown_subject_is_not_found() {
    let workspace = temp_dir("edutrack-validate-subject");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "PHY101", "present": true }),
    );
    assert_eq!(code, "not_found");

    let _ = std::fs::remove_dir_all(workspace);
}

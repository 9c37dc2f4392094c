mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, seed_basic_class, spawn_sidecar, temp_dir};

#[test]
fn unauthorized_teacher_cannot_write_and_state_is_untouched() {
    let workspace = temp_dir("edutrack-authz");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    let ledger_path = workspace.join("attendance_master.json");
    let before = std::fs::read(&ledger_path).expect("ledger snapshot");

    // t2 has no authorization record at all.
    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t2", "roll": roll, "subjectCode": "MTH101", "present": true }),
    );
    assert_eq!(code, "not_authorized");

    // t3 is authorized, but for a different section.
    request_ok(&mut stdin, &mut reader, "2", "sections.define", json!({ "code": "B" }));
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.authorize",
        json!({ "teacher": "t3", "sections": ["B"] }),
    );
    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.correct",
        json!({ "teacher": "t3", "roll": roll, "subjectCode": "MTH101", "workingDays": 3, "presentDays": 3 }),
    );
    assert_eq!(code, "not_authorized");

    let after = std::fs::read(&ledger_path).expect("ledger after");
    assert_eq!(before, after, "failed writes must not alter the ledger file");

    // Reads stay open to anyone.
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.summary",
        json!({ "roll": roll }),
    );
    assert_eq!(summary["section"], "A");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn unassigned_roll_fails_lookup_before_authorization() {
    let workspace = temp_dir("edutrack-authz-unassigned");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed_basic_class(&mut stdin, &mut reader, &workspace);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": "20259999", "subjectCode": "MTH101", "present": true }),
    );
    assert_eq!(code, "not_found");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn authorization_replacement_revokes_old_sections() {
    let workspace = temp_dir("edutrack-authz-replace");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let roll = seed_basic_class(&mut stdin, &mut reader, &workspace);

    request_ok(&mut stdin, &mut reader, "1", "sections.define", json!({ "code": "B" }));
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.authorize",
        json!({ "teacher": "t1", "sections": ["B"] }),
    );

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.mark",
        json!({ "teacher": "t1", "roll": roll, "subjectCode": "MTH101", "present": true }),
    );
    assert_eq!(code, "not_authorized");

    let sections = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.sections",
        json!({ "teacher": "t1" }),
    );
    assert_eq!(sections["sections"], json!(["B"]));

    let _ = std::fs::remove_dir_all(workspace);
}

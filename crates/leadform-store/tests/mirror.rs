use leadform_spec::{ElementType, FormBuilderSession, FormDefinition};
use leadform_store::{ElementMirror, PersistError, StorageKey};
use serde_json::Value;

fn fixture() -> FormDefinition {
    serde_json::from_str(include_str!("fixtures/lead_form.json")).expect("fixture definition")
}

fn read_raw(mirror: &ElementMirror) -> Value {
    serde_json::from_slice(&std::fs::read(mirror.path()).expect("read")).expect("json")
}

#[test]
fn missing_file_loads_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("storage.json"));
    assert!(mirror.load().expect("load").is_none());
    assert!(mirror.read().expect("read").elements.is_empty());
}

#[test]
fn flush_writes_only_dirty_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("nested").join("storage.json"));
    let mut session = FormBuilderSession::new("Enquiry");

    assert!(!mirror.flush(&mut session).expect("clean flush"));
    assert!(!mirror.exists());

    session.add_element(ElementType::ShortAnswer).expect("add");
    assert!(mirror.flush(&mut session).expect("dirty flush"));
    assert!(!session.is_dirty());
    assert!(!mirror.flush(&mut session).expect("second flush"));

    let raw = read_raw(&mirror);
    assert_eq!(raw[StorageKey::FormTitle.as_str()], "Enquiry");
    assert_eq!(
        raw[StorageKey::FormElements.as_str()][0]["type"],
        "Short Answer"
    );
    assert!(raw[StorageKey::SavedAt.as_str()].is_string());
    let lock = std::fs::File::open(dir.path().join("nested").join("formElements.lock"))
        .expect("lock file");
    lock.try_lock().expect("lock released after flush");
}

#[test]
fn load_restores_the_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("storage.json"));
    let session =
        FormBuilderSession::from_definition(Some("f-1".into()), fixture()).expect("session");
    mirror.save(&session).expect("save");

    let restored = mirror.load().expect("load").expect("stored session");
    assert_eq!(restored.form_id(), Some("f-1"));
    assert_eq!(restored.title(), "Kitchen remodel enquiry");
    assert_eq!(restored.elements(), session.elements());
    assert_eq!(restored.automations().len(), 1);
    assert!(!restored.is_dirty());
}

#[test]
fn unrelated_keys_survive_a_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");
    std::fs::write(&path, r#"{"theme":"dark"}"#).expect("seed");
    let mirror = ElementMirror::new(&path);

    let mut session = FormBuilderSession::new("Enquiry");
    session.set_title("Renamed");
    mirror.flush(&mut session).expect("flush");

    let raw = read_raw(&mirror);
    assert_eq!(raw["theme"], "dark");
    assert_eq!(raw["formTitle"], "Renamed");
    assert_eq!(raw["formId"], Value::Null);
}

#[test]
fn held_lock_reports_busy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("storage.json"));
    let holder = std::fs::File::create(dir.path().join("formElements.lock")).expect("lock");
    holder.try_lock().expect("hold lock");

    let mut session = FormBuilderSession::new("Enquiry");
    session.set_title("Changed");
    assert!(matches!(
        mirror.flush(&mut session),
        Err(PersistError::Busy(_))
    ));
    assert!(session.is_dirty());

    drop(holder);
    assert!(mirror.flush(&mut session).expect("flush after release"));
}

#[test]
fn leftover_lock_file_from_a_killed_writer_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("storage.json"));
    std::fs::write(dir.path().join("formElements.lock"), "").expect("stale lock");

    mirror.save(&FormBuilderSession::new("Enquiry")).expect("save");
    assert!(mirror.exists());
    mirror.clear().expect("clear");
    assert!(!mirror.exists());
}

#[test]
fn clear_removes_the_working_copy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mirror = ElementMirror::new(dir.path().join("storage.json"));
    mirror.save(&FormBuilderSession::new("Enquiry")).expect("save");
    assert!(mirror.exists());
    mirror.clear().expect("clear");
    assert!(!mirror.exists());
    mirror.clear().expect("clear twice");
}

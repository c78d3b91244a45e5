use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let storage = dir.child("storage.json");
        let forms = dir.child("forms");
        dir.child("config.toml")
            .write_str(&format!(
                "storage_path = {:?}\nforms_dir = {:?}\n",
                storage.path(),
                forms.path()
            ))
            .expect("config");
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_leadform"));
        cmd.arg("--config")
            .arg(self.dir.child("config.toml").path())
            .env_remove("LEADFORM_API_URL")
            .env_remove("LEADFORM_API_TOKEN")
            .env_remove("LEADFORM_STORAGE")
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run leadform");
        assert!(
            output.status.success(),
            "leadform {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json output")
    }

    fn add(&self, element_type: &str) -> String {
        self.json(&["add", element_type])["id"]
            .as_str()
            .expect("id")
            .to_string()
    }
}

#[test]
fn commands_need_a_form_in_progress() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["add", "email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("leadform init"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let ws = Workspace::new();
    ws.cmd().args(["init", "--title", "Enquiry"]).assert().success();
    ws.cmd()
        .args(["init", "--title", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    ws.cmd()
        .args(["init", "--title", "Other", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started form 'Other'"));
}

#[test]
fn structural_check_tracks_required_elements() {
    let ws = Workspace::new();
    ws.cmd().args(["init", "--title", "Enquiry"]).assert().success();
    ws.cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Empty Form"))
        .stdout(predicate::str::contains("Missing Client Details"));

    ws.add("short-answer");
    ws.cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing Client Details"))
        .stdout(predicate::str::contains("Empty Form").not());

    ws.add("Client Details");
    ws.cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ready to save"));

    ws.cmd()
        .args(["add", "client-details"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has a Client Details"));
}

#[test]
fn conditions_drive_the_preview() {
    let ws = Workspace::new();
    ws.cmd().args(["init", "--title", "Kitchen"]).assert().success();
    let budget = ws.add("radio-buttons");
    let amount = ws.add("number");
    ws.add("client-details");

    ws.json(&["option", "update", &budget, "0", "yes"]);
    ws.json(&[
        "condition", "add", &amount, "--source", &budget, "--operator", "equals", "--value", "yes",
    ]);
    ws.json(&["edit", &amount, "--min", "5", "--title", "Budget amount"]);

    let values = ws.dir.child("values.json");
    values
        .write_str(&format!(r#"{{"{budget}": "yes", "{amount}": 3}}"#))
        .expect("values");
    ws.cmd()
        .args(["preview", "--values"])
        .arg(values.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("- [Number] Budget amount: 3"))
        .stdout(predicate::str::contains("! Minimum value is 5"));

    values
        .write_str(&format!(r#"{{"{budget}": "Option 2"}}"#))
        .expect("values");
    let preview = ws.json(&["preview", "--values", values.path().to_str().expect("utf8")]);
    assert_eq!(preview["progress"]["visible"], 2);
    assert_eq!(preview["progress"]["total"], 3);
}

#[test]
fn moving_the_source_below_prunes_the_condition() {
    let ws = Workspace::new();
    ws.cmd().args(["init"]).assert().success();
    let first = ws.add("dropdown");
    let second = ws.add("short-answer");
    ws.json(&[
        "condition", "add", &second, "--source", &first, "--operator", "is-not-empty",
    ]);

    ws.cmd()
        .args(["reorder", &second, &first])
        .assert()
        .success()
        .stderr(predicate::str::contains("removed condition"));

    let show = ws.json(&["show"]);
    let elements = show["definition"]["elements"].as_array().expect("elements");
    assert_eq!(elements[0]["id"], second.as_str());
    assert!(elements[0].get("conditions").is_none());
}

#[test]
fn equals_accepts_an_empty_operand() {
    let ws = Workspace::new();
    ws.cmd().args(["init"]).assert().success();
    let first = ws.add("dropdown");
    let second = ws.add("short-answer");
    let added = ws.json(&[
        "condition", "add", &second, "--source", &first, "--operator", "equals",
    ]);
    assert_eq!(added["value"], "");

    let show = ws.json(&["show"]);
    let condition = &show["definition"]["elements"][1]["conditions"][0];
    assert_eq!(condition["operator"], "equals");
    assert_eq!(condition["value"], "");

    ws.cmd()
        .args([
            "condition", "add", &second, "--source", &first, "--operator", "is-empty", "--value",
            "x",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("ignores --value"));
}

#[test]
fn stale_ids_are_ignored() {
    let ws = Workspace::new();
    ws.cmd().args(["init"]).assert().success();
    ws.cmd()
        .args(["remove", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No element ghost"));
    let out = ws.json(&["duplicate", "ghost"]);
    assert_eq!(out["copy"], Value::Null);
}

#[test]
fn push_saves_locally_and_pull_restores() {
    let ws = Workspace::new();
    ws.cmd().args(["init", "--title", "Enquiry"]).assert().success();
    ws.cmd()
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("structural issue"));

    ws.add("email");
    ws.add("client-details");
    let pushed = ws.json(&["push"]);
    assert_eq!(pushed["redirect"], "/leads");
    assert_eq!(pushed["created"], true);
    let id = pushed["id"].as_str().expect("id").to_string();
    ws.dir
        .child("forms")
        .child(format!("{id}.json"))
        .assert(predicate::path::exists());

    let again = ws.json(&["push"]);
    assert_eq!(again["id"], id.as_str());
    assert_eq!(again["created"], false);

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()))
        .stdout(predicate::str::contains("Enquiry"));

    ws.cmd().args(["init", "--title", "Scratch", "--force"]).assert().success();
    ws.cmd()
        .args(["pull", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    ws.cmd()
        .args(["pull", &id, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 'Enquiry' (2 elements)"));
}

#[test]
fn schema_and_palette_print_without_a_form() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"$schema\""));
    let palette = ws.json(&["palette"]);
    assert_eq!(palette.as_array().map(Vec::len), Some(15));
    assert_eq!(palette[0]["type"], "Text Block");
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Every test gets its own data and config directory so nothing touches
/// the real home directory and tests can run in parallel.
struct Sandbox {
    _dir: TempDir,
    data_dir: String,
    config_dir: String,
}

impl Sandbox {
    fn new() -> Sandbox {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data").to_string_lossy().to_string();
        let config_dir = dir.path().join("config").to_string_lossy().to_string();
        Sandbox {
            _dir: dir,
            data_dir,
            config_dir,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("auditthis").unwrap();
        cmd.env("AUDITTHIS_DATA_DIR", &self.data_dir);
        cmd.env("AUDITTHIS_CONFIG_DIR", &self.config_dir);
        cmd
    }

    fn init(&self) {
        self.cmd().arg("init").assert().success();
    }
}

#[test]
fn init_bootstraps_the_demo_company() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo Company"))
        .stdout(predicate::str::contains("Welcome!"));
}

#[test]
fn commands_require_init_first() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["company", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("auditthis init"));
}

#[test]
fn company_lifecycle() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .args(["company", "add", "Salon Nine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salon Nine"));

    sandbox
        .cmd()
        .args(["company", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo Company"))
        .stdout(predicate::str::contains("Salon Nine"));

    sandbox
        .cmd()
        .args(["company", "delete", "Salon Nine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active company is now Demo Company"));

    // The survivor is protected.
    sandbox
        .cmd()
        .args(["company", "delete", "Demo Company"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("last remaining company"));
}

#[test]
fn income_add_computes_net_and_lists() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .args([
            "income", "add", "--date", "2025-01-17", "--category", "Hair Services",
            "--amount", "2800", "--tax", "170",
        ])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["income", "list", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2,630.00"));
}

#[test]
fn income_add_rejects_missing_category() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox
        .cmd()
        .args(["income", "add", "--date", "2025-01-17", "--category", " ", "--amount", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category is required"));
}

#[test]
fn expense_split_apportions_tax() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .args([
            "expense", "split", "--total", "200", "--tax", "10", "--date", "2025-01-06",
            "--part", "Color Tubes=150", "--part", "Hair Tools=50",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Split into 2 expense entries"));

    sandbox
        .cmd()
        .args(["expense", "list", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("142.50"))
        .stdout(predicate::str::contains("47.50"));
}

#[test]
fn reconcile_finish_rejects_unbalanced_period() {
    let sandbox = Sandbox::new();
    sandbox.init();
    // Fresh books with no reconciled entries: opening 0, claimed ending 50.
    sandbox
        .cmd()
        .args([
            "company", "add", "Clean Books",
        ])
        .assert()
        .success();
    sandbox
        .cmd()
        .args([
            "reconcile", "finish", "--from", "2025-01-01", "--to", "2025-01-31",
            "--opening", "0", "--ending", "50",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("50.00 must be resolved"));
}

#[test]
fn reconcile_mark_and_finish_balanced_period() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox
        .cmd()
        .args(["company", "add", "Clean Books"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args([
            "income", "add", "--date", "2025-01-10", "--category", "Consulting",
            "--amount", "500",
        ])
        .assert()
        .success();

    // Find the entry id from the list output.
    let output = sandbox
        .cmd()
        .args(["income", "list"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    // Entry ids are a millisecond timestamp plus a random suffix, much
    // longer than any other token in the table.
    let id = stdout
        .lines()
        .find(|l| l.contains("2025-01-10"))
        .and_then(|l| {
            l.split(|c: char| !c.is_ascii_alphanumeric())
                .find(|token| token.len() >= 20)
                .map(str::to_string)
        })
        .expect("entry id in list output");

    sandbox
        .cmd()
        .args([
            "reconcile", "mark", "--from", "2025-01-01", "--to", "2025-01-31",
            "--income", &id,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked income"));

    sandbox
        .cmd()
        .args([
            "reconcile", "finish", "--from", "2025-01-01", "--to", "2025-01-31",
            "--opening", "0", "--ending", "500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconciled"));

    // The next period's defaults chain from the finished one.
    sandbox
        .cmd()
        .args(["setup", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("through 2025-01-31"));
}

#[test]
fn backup_export_import_roundtrip() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let backup_path = format!("{}/demo.dawg", sandbox.data_dir);
    sandbox
        .cmd()
        .args(["backup", "export", "--output", &backup_path])
        .assert()
        .success();

    // Restoring the active company's own backup applies in place.
    sandbox
        .cmd()
        .args(["backup", "import", &backup_path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 2 income and 6 expense entries"));
}

#[test]
fn backup_import_rejects_wrong_extension() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox
        .cmd()
        .args(["backup", "import", "backup.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".dawg or .json"));
}

#[test]
fn backup_import_foreign_company_needs_a_choice() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let backup_path = format!("{}/demo.dawg", sandbox.data_dir);
    sandbox
        .cmd()
        .args(["backup", "export", "--output", &backup_path])
        .assert()
        .success();

    // Switch to a different company, then import the demo backup.
    sandbox
        .cmd()
        .args(["company", "add", "Salon Nine"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["backup", "import", &backup_path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--as-new"));

    sandbox
        .cmd()
        .args(["backup", "import", &backup_path, "--as-new"])
        .assert()
        .success();
}

#[test]
fn status_reports_active_company() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Company:    Demo Company"))
        .stdout(predicate::str::contains("Income entries:   2"));
}

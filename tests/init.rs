use crate::common::command::{init_repository_dir, repository_dir, run_dbver_command};
use crate::common::file::write_changescript;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_ledger_and_script_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_path = repository_dir.path().canonicalize()?.join(common::DATABASE);

    run_dbver_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized versioning ledger in"))
        .stdout(predicate::str::contains(database_path.display().to_string()));

    assert!(repository_dir.path().join(common::SCRIPTS_DIR).is_dir());
    assert!(common::table_exists(
        repository_dir.path(),
        "swoosh_db_versioning_history"
    ));
    assert_eq!(
        common::meta_value(repository_dir.path(), "current_version"),
        Some("0".to_string())
    );
    assert_eq!(
        common::meta_value(repository_dir.path(), "fallback_version"),
        Some("0".to_string())
    );
    assert_eq!(
        common::meta_value(repository_dir.path(), "last_exception_version"),
        None
    );

    Ok(())
}

#[rstest]
fn init_again_keeps_existing_state(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    run_dbver_command(dir, &["checkout"]).assert().success();

    run_dbver_command(dir, &["init"]).assert().success();

    assert_eq!(common::applied_versions(dir), vec!["100"]);
    assert_eq!(
        common::meta_value(dir, "current_version"),
        Some("100".to_string())
    );
}

#[rstest]
fn init_honors_paths_from_environment(repository_dir: TempDir) {
    run_dbver_command(repository_dir.path(), &["init"])
        .env("DBVER_DATABASE", "state/app.sqlite")
        .env("DBVER_SCRIPTS", "migrations")
        .assert()
        .success();

    assert!(repository_dir.path().join("state").join("app.sqlite").is_file());
    assert!(repository_dir.path().join("migrations").is_dir());
}

#[rstest]
#[case::checkout(&["checkout"])]
#[case::status(&["status"])]
#[case::version(&["version"])]
#[case::history(&["history"])]
fn commands_before_init_fail(repository_dir: TempDir, #[case] args: &[&str]) {
    run_dbver_command(repository_dir.path(), args)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("run `dbver init` first"));

    assert!(!repository_dir.path().join(common::DATABASE).exists());
}

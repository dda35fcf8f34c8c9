use crate::common::command::{
    init_repository_dir, repository_with_changescripts, run_dbver_command,
};
use crate::common::file::write_changescript;
use assert_cmd::Command;
use assert_fs::TempDir;
use fake::Fake;
use fake::faker::lorem::en::Word;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn checkout_applies_pending_changescripts_once(repository_with_changescripts: TempDir) {
    let dir = repository_with_changescripts.path();

    run_dbver_command(dir, &["checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 changescripts:"))
        .stdout(predicate::str::contains("Current version: 200"));

    assert_eq!(common::applied_versions(dir), vec!["100", "200"]);
    assert_eq!(common::meta_value(dir, "current_version"), Some("200".to_string()));
    assert_eq!(common::meta_value(dir, "fallback_version"), Some("0".to_string()));

    run_dbver_command(dir, &["checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date (2 skipped)"));

    assert_eq!(common::applied_versions(dir), vec!["100", "200"]);
    assert_eq!(common::meta_value(dir, "fallback_version"), Some("200".to_string()));
}

#[rstest]
fn checkout_continues_past_a_failing_changescript(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    write_changescript(dir, "200", "ALTER TABLE t ADD COLUMN;");
    write_changescript(dir, "300", "CREATE TABLE u(id INTEGER);");

    run_dbver_command(dir, &["checkout"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Applied 2 changescripts:"))
        .stdout(predicate::str::contains("Failed 1 changescript:"))
        .stdout(predicate::str::is_match(r"(?m)^    200  execution failed: .*syntax error")
            .expect("valid regex"));

    assert_eq!(common::applied_versions(dir), vec!["100", "300"]);
    assert!(common::table_exists(dir, "u"));

    run_dbver_command(dir, &["version", "--all"])
        .assert()
        .success()
        .stdout("current_version: 300\nfallback_version: 0\nlast_exception_version: 200\n");
}

#[rstest]
fn checkout_can_abort_on_first_failure(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    write_changescript(dir, "200", "THIS IS NOT SQL;");
    write_changescript(dir, "300", "CREATE TABLE u(id INTEGER);");

    run_dbver_command(dir, &["checkout", "--abort-on-failure"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not attempted after failure:"))
        .stdout(predicate::str::contains("    300"));

    assert_eq!(common::applied_versions(dir), vec!["100"]);
    assert!(!common::table_exists(dir, "u"));

    // fixing the broken changescript lets the next run catch up
    write_changescript(dir, "200", "ALTER TABLE t ADD COLUMN x TEXT;");
    run_dbver_command(dir, &["checkout"]).assert().success();

    assert_eq!(common::applied_versions(dir), vec!["100", "200", "300"]);
}

#[rstest]
fn checkout_orders_by_number_not_by_name(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "10", "ALTER TABLE t ADD COLUMN ten TEXT;");
    write_changescript(dir, "9", "ALTER TABLE t ADD COLUMN nine TEXT;");
    write_changescript(dir, "1", "CREATE TABLE t(id INTEGER);");

    run_dbver_command(dir, &["checkout"]).assert().success();

    assert_eq!(common::applied_versions(dir), vec!["1", "9", "10"]);
    assert_eq!(common::meta_value(dir, "current_version"), Some("10".to_string()));
}

#[rstest]
fn checkout_picks_up_changescripts_added_later(repository_with_changescripts: TempDir) {
    let dir = repository_with_changescripts.path();
    run_dbver_command(dir, &["checkout"]).assert().success();

    let table = Word().fake::<String>();
    write_changescript(dir, "300", &format!("CREATE TABLE \"{table}\"(id INTEGER);"));

    run_dbver_command(dir, &["checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 changescript:"))
        .stdout(predicate::str::contains("Skipped 2 already applied changescripts"));

    assert!(common::table_exists(dir, &table));
    assert_eq!(common::meta_value(dir, "fallback_version"), Some("200".to_string()));
}

#[rstest]
fn checkout_times_out_long_running_changescripts(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(
        dir,
        "100",
        "CREATE TABLE endless AS
            WITH RECURSIVE counter(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM counter)
            SELECT count(*) AS total FROM counter;",
    );
    write_changescript(dir, "200", "CREATE TABLE t(id INTEGER);");

    run_dbver_command(dir, &["checkout", "--timeout", "1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("100  execution timed out after 1s"));

    assert_eq!(common::applied_versions(dir), vec!["200"]);
    assert_eq!(
        common::meta_value(dir, "last_exception_version"),
        Some("100".to_string())
    );
}

#[rstest]
fn checkout_without_script_directory_changes_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    std::fs::remove_dir_all(dir.join(common::SCRIPTS_DIR)).expect("Failed to remove scripts");

    run_dbver_command(dir, &["checkout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is unavailable"));

    assert!(common::applied_versions(dir).is_empty());
    assert_eq!(common::meta_value(dir, "fallback_version"), Some("0".to_string()));
}

#[rstest]
fn checkout_continues_past_a_failing_transaction(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    write_changescript(
        dir,
        "200",
        "BEGIN;\nCREATE TABLE b(id INTEGER);\nALTER TABLE nope ADD COLUMN x;\nCOMMIT;",
    );
    write_changescript(dir, "300", "CREATE TABLE u(id INTEGER);");

    run_dbver_command(dir, &["checkout"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Applied 2 changescripts:"))
        .stdout(predicate::str::contains("no such table: nope"));

    assert_eq!(common::applied_versions(dir), vec!["100", "300"]);
    assert!(!common::table_exists(dir, "b"));
    assert_eq!(
        common::meta_value(dir, "last_exception_version"),
        Some("200".to_string())
    );
}

#[rstest]
fn checkout_with_unreadable_changescript_changes_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    std::fs::write(dir.join(common::SCRIPTS_DIR).join("200.sql"), [0xFF, 0xFE, 0x00])
        .expect("Failed to write changescript");
    write_changescript(dir, "300", "CREATE TABLE u(id INTEGER);");

    run_dbver_command(dir, &["checkout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is unavailable"));

    assert!(common::applied_versions(dir).is_empty());
    assert!(!common::table_exists(dir, "t"));
    assert_eq!(common::meta_value(dir, "current_version"), Some("0".to_string()));
    assert_eq!(common::meta_value(dir, "fallback_version"), Some("0".to_string()));
}

#[rstest]
fn checkout_rejects_ambiguous_changescript_names(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_changescript(dir, "100", "CREATE TABLE t(id INTEGER);");
    write_changescript(dir, "0100", "CREATE TABLE u(id INTEGER);");

    run_dbver_command(dir, &["checkout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("share the ordering key 100"));

    assert!(common::applied_versions(dir).is_empty());
}

#[rstest]
#[tokio::test]
async fn concurrent_checkouts_apply_each_changescript_once(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository_dir = init_repository_dir;
    for n in 1..=30 {
        write_changescript(
            repository_dir.path(),
            &n.to_string(),
            &format!("CREATE TABLE t{n}(id INTEGER);"),
        );
    }

    let dir_path = repository_dir.path().to_path_buf();
    let dir_path_clone = dir_path.clone();

    // both processes race for the checkout lock; the loser must find nothing left to do
    let (first, second) = tokio::join!(
        tokio::spawn(async move {
            let mut cmd = Command::cargo_bin("dbver").unwrap();
            cmd.current_dir(&dir_path).arg("checkout").assert().success();
        }),
        tokio::spawn(async move {
            let mut cmd = Command::cargo_bin("dbver").unwrap();
            cmd.current_dir(&dir_path_clone)
                .arg("checkout")
                .assert()
                .success();
        })
    );
    first?;
    second?;

    let applied = common::applied_versions(repository_dir.path());
    let expected = (1..=30).map(|n| n.to_string()).collect::<Vec<_>>();
    assert_eq!(applied, expected);
    assert_eq!(
        common::meta_value(repository_dir.path(), "current_version"),
        Some("30".to_string())
    );

    Ok(())
}

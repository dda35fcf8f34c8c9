use crate::common::file::write_changescript;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub fn run_dbver_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("dbver").expect("Failed to find dbver binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("NO_COLOR", "1")]);
    cmd.env_remove("DBVER_DATABASE");
    cmd.env_remove("DBVER_SCRIPTS");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_dbver_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Initialized repository holding a table and a column changescript
#[fixture]
pub fn repository_with_changescripts(init_repository_dir: TempDir) -> TempDir {
    write_changescript(
        init_repository_dir.path(),
        "100",
        "CREATE TABLE t(id INTEGER PRIMARY KEY);",
    );
    write_changescript(
        init_repository_dir.path(),
        "200",
        "ALTER TABLE t ADD COLUMN x TEXT;",
    );

    init_repository_dir
}

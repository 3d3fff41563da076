use crate::common::COMMIT_DATE;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_sprout_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Repository with `f.txt` = "A\n" committed on main
#[fixture]
pub fn committed_repository_dir(init_repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        init_repository_dir.path().join("f.txt"),
        "A\n".to_string(),
    ));
    sprout_add(init_repository_dir.path(), "f.txt")
        .assert()
        .success();
    sprout_commit(init_repository_dir.path(), "add f")
        .assert()
        .success();

    init_repository_dir
}

pub fn run_sprout_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("sprout").expect("Failed to find sprout binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("SPROUT_COMMIT_DATE", COMMIT_DATE)]);
    cmd.env_remove("SPROUT_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn sprout_add(dir: &Path, file_name: &str) -> Command {
    run_sprout_command(dir, &["add", file_name])
}

pub fn sprout_commit(dir: &Path, message: &str) -> Command {
    run_sprout_command(dir, &["commit", "-m", message])
}

/// Write `content` to `file_name`, stage it and commit
pub fn commit_file(dir: &Path, file_name: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(file_name), content.to_string()));
    sprout_add(dir, file_name).assert().success();
    sprout_commit(dir, message).assert().success();
}

/// Stage the removal of `file_name` and commit
pub fn commit_removal(dir: &Path, file_name: &str, message: &str) {
    run_sprout_command(dir, &["rm", file_name])
        .assert()
        .success();
    sprout_commit(dir, message).assert().success();
}

pub fn current_branch(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".sprout").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}

pub fn branch_tip(dir: &Path, branch: &str) -> String {
    std::fs::read_to_string(dir.join(".sprout").join("branches").join(branch))
        .expect("Failed to read branch")
        .trim()
        .to_string()
}

pub fn head_oid(dir: &Path) -> String {
    branch_tip(dir, &current_branch(dir))
}

/// Ids printed by `find`, one per line
pub fn find_commits(dir: &Path, message: &str) -> Vec<String> {
    let output = run_sprout_command(dir, &["find", message])
        .output()
        .expect("Failed to run find");

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

use crate::common::command::{
    branch_tip, commit_file, committed_repository_dir, current_branch, head_oid,
    init_repository_dir, run_sprout_command, sprout_add,
};
use crate::common::file::{FileSpec, read_file, snapshot, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn branch_points_at_head_without_switching(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();

    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();

    assert_eq!(branch_tip(dir, "feature"), head_oid(dir));
    assert_eq!(current_branch(dir), "main");
}

#[rstest]
fn duplicate_branch_is_rejected(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();

    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name already exists: feature",
        ));
}

#[rstest]
#[case("fea:ture")]
#[case("feature.lock")]
#[case("fea..ture")]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    run_sprout_command(init_repository_dir.path(), &["branch", "--", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));
}

#[rstest]
fn rm_branch_keeps_the_commits(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();
    let tip = branch_tip(dir, "feature");

    run_sprout_command(dir, &["rm-branch", "feature"])
        .assert()
        .success();

    assert!(!dir.join(".sprout/branches/feature").exists());
    run_sprout_command(dir, &["reset", &tip]).assert().success();
}

#[rstest]
#[case("main", "Cannot remove the current branch.")]
#[case("ghost", "No such branch exists: ghost")]
fn rm_branch_failures(init_repository_dir: TempDir, #[case] name: &str, #[case] message: &str) {
    run_sprout_command(init_repository_dir.path(), &["rm-branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
}

#[rstest]
fn checkout_branch_swaps_the_working_tree(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir, "f.txt", "B\n", "main changes f");
    commit_file(dir, "only_main.txt", "M\n", "main adds a file");

    run_sprout_command(dir, &["checkout", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch 'feature'"));

    assert_eq!(current_branch(dir), "feature");
    assert_eq!(read_file(dir, "f.txt"), "A\n");
    assert!(!dir.join("only_main.txt").exists());

    run_sprout_command(dir, &["checkout", "main"])
        .assert()
        .success();
    assert_eq!(read_file(dir, "f.txt"), "B\n");
    assert_eq!(read_file(dir, "only_main.txt"), "M\n");
}

#[rstest]
fn checkout_branch_clears_the_staging_area(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("f.txt"), "B\n".to_string()));
    sprout_add(dir, "f.txt").assert().success();

    run_sprout_command(dir, &["checkout", "feature"])
        .assert()
        .success();

    assert!(
        std::fs::read_dir(dir.join(".sprout/staging/add"))
            .map(|entries| entries.count() == 0)
            .unwrap_or(true)
    );
    assert_eq!(read_file(dir, "f.txt"), "A\n");
}

#[rstest]
fn checkout_branch_failures(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_sprout_command(dir, &["checkout", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such branch exists: ghost"));
    run_sprout_command(dir, &["checkout", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No need to checkout the current branch.",
        ));
}

#[rstest]
fn checkout_refuses_to_overwrite_untracked_files(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_sprout_command(dir, &["branch", "feature"])
        .assert()
        .success();
    run_sprout_command(dir, &["checkout", "feature"])
        .assert()
        .success();
    commit_file(dir, "g.txt", "tracked on feature\n", "feature adds g");
    run_sprout_command(dir, &["checkout", "main"])
        .assert()
        .success();

    write_file(FileSpec::new(dir.join("g.txt"), "untracked\n".to_string()));
    write_file(FileSpec::new(dir.join("f.txt"), "edited\n".to_string()));
    let before = snapshot(dir);
    let main_tip = head_oid(dir);

    run_sprout_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "There is an untracked file in the way",
        ));

    assert_eq!(snapshot(dir), before);
    assert_eq!(current_branch(dir), "main");
    assert_eq!(head_oid(dir), main_tip);
}

#[rstest]
fn checkout_file_from_head_and_from_commit(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    let first = head_oid(dir);
    commit_file(dir, "f.txt", "B\n", "change f");

    write_file(FileSpec::new(dir.join("f.txt"), "scratch\n".to_string()));
    run_sprout_command(dir, &["checkout", "--", "f.txt"])
        .assert()
        .success();
    assert_eq!(read_file(dir, "f.txt"), "B\n");

    run_sprout_command(dir, &["checkout", &first[..8], "--", "f.txt"])
        .assert()
        .success();
    assert_eq!(read_file(dir, "f.txt"), "A\n");
    assert_ne!(head_oid(dir), first);
}

#[rstest]
fn checkout_file_from_unknown_commit_fails(committed_repository_dir: TempDir) {
    run_sprout_command(
        committed_repository_dir.path(),
        &["checkout", "deadbeef", "--", "f.txt"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("No commit with that id exists."));
}

#[rstest]
fn reset_moves_the_current_branch(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    let first = head_oid(dir);
    commit_file(dir, "f.txt", "B\n", "change f");
    commit_file(dir, "g.txt", "G\n", "add g");

    run_sprout_command(dir, &["reset", &first]).assert().success();

    assert_eq!(head_oid(dir), first);
    assert_eq!(branch_tip(dir, "main"), first);
    assert_eq!(read_file(dir, "f.txt"), "A\n");
    assert!(!dir.join("g.txt").exists());
}

#[rstest]
fn reset_to_unknown_commit_fails(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    let tip = head_oid(dir);

    run_sprout_command(dir, &["reset", "0000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No commit with that id exists."));
    assert_eq!(head_oid(dir), tip);
}

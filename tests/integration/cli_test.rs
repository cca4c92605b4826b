use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// Core streams created by `init`, in creation order.
const EVERYONE: &str = "1";
const FOLLOWING: &str = "2";
const STARRED: &str = "3";
const MY_ORG: &str = "4";

fn murmur() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("murmur").unwrap()
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = murmur()
        .args(args)
        .current_dir(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).unwrap()
}

fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    serde_json::from_str(&run(dir, &full)).unwrap()
}

fn ids(dir: &TempDir, stream: &str, viewer: &str) -> Vec<i64> {
    serde_json::from_value(run_json(dir, &["stream", "ids", stream, "--as", viewer])).unwrap()
}

fn post(dir: &TempDir, actor: &str, to: &str, body: &str) -> i64 {
    run_json(dir, &["post", body, "--as", actor, "--to", to])["id"]
        .as_i64()
        .unwrap()
}

/// Repository with a root org, two people and a group.
fn springfield() -> TempDir {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    run(&dir, &["org", "add", "springfield", "--name", "Springfield"]);
    run(&dir, &["person", "add", "smithers", "--org", "springfield"]);
    run(&dir, &["person", "add", "mrburns", "--org", "springfield"]);
    run(&dir, &["group", "add", "plant", "--name", "Power Plant", "--org", "springfield"]);
    dir
}

#[test]
fn init_creates_murmur_dir() {
    let dir = TempDir::new().unwrap();
    murmur()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".murmur"));

    assert!(dir.path().join(".murmur/config.toml").exists());
    assert!(dir.path().join(".murmur/records.json").exists());
    assert!(dir.path().join(".murmur/cache.json").exists());
}

#[test]
fn init_twice_fails() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    murmur()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_outside_repository_fail() {
    let dir = TempDir::new().unwrap();
    murmur()
        .args(["stream", "list"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a murmur repository"));
}

#[test]
fn stream_list_shows_core_streams() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    let out = run(&dir, &["stream", "list"]);
    for name in ["everyone", "followed", "starred", "parent_org"] {
        assert!(out.contains(name), "missing {name} in {out}");
    }
}

#[test]
fn everyone_stream_is_newest_first() {
    let dir = springfield();
    let first = post(&dir, "smithers", "person:smithers", "first");
    assert_eq!(ids(&dir, EVERYONE, "mrburns"), vec![first]);

    let second = post(&dir, "mrburns", "person:mrburns", "second");
    assert_eq!(ids(&dir, EVERYONE, "mrburns"), vec![second, first]);
}

#[test]
fn hidden_posts_stay_out_of_everyone() {
    let dir = springfield();
    let visible = post(&dir, "smithers", "person:smithers", "visible");
    ids(&dir, EVERYONE, "smithers");
    run(&dir, &["post", "secret", "--as", "smithers", "--hidden"]);
    assert_eq!(ids(&dir, EVERYONE, "smithers"), vec![visible]);
}

#[test]
fn followers_see_new_posts() {
    let dir = springfield();
    run(&dir, &["follow", "mrburns", "person:smithers"]);
    assert!(ids(&dir, FOLLOWING, "mrburns").is_empty());

    let a = post(&dir, "smithers", "person:smithers", "excellent");
    assert_eq!(ids(&dir, FOLLOWING, "mrburns"), vec![a]);
    assert!(ids(&dir, FOLLOWING, "smithers").is_empty());
}

#[test]
fn group_followers_see_group_posts() {
    let dir = springfield();
    run(&dir, &["follow", "mrburns", "group:plant"]);
    assert!(ids(&dir, FOLLOWING, "mrburns").is_empty());

    let a = post(&dir, "smithers", "group:plant", "safety first");
    assert_eq!(ids(&dir, FOLLOWING, "mrburns"), vec![a]);
    assert_eq!(ids(&dir, EVERYONE, "mrburns"), vec![a]);
}

#[test]
fn posting_to_an_organization_fails() {
    let dir = springfield();
    murmur()
        .args(["post", "hello", "--as", "smithers", "--to", "org:springfield"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported destination"));
}

#[test]
fn delete_removes_activity_everywhere() {
    let dir = springfield();
    run(&dir, &["follow", "mrburns", "person:smithers"]);
    let keep = post(&dir, "smithers", "person:smithers", "keep");
    let gone = post(&dir, "smithers", "person:smithers", "gone");
    assert_eq!(ids(&dir, EVERYONE, "mrburns"), vec![gone, keep]);
    assert_eq!(ids(&dir, FOLLOWING, "mrburns"), vec![gone, keep]);
    assert_eq!(ids(&dir, MY_ORG, "mrburns"), vec![gone, keep]);

    run(&dir, &["delete", &gone.to_string()]);

    assert_eq!(ids(&dir, EVERYONE, "mrburns"), vec![keep]);
    assert_eq!(ids(&dir, FOLLOWING, "mrburns"), vec![keep]);
    assert_eq!(ids(&dir, MY_ORG, "mrburns"), vec![keep]);
    murmur()
        .args(["show", &gone.to_string()])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn comment_boundaries_follow_deletes() {
    let dir = springfield();
    let a = post(&dir, "smithers", "person:smithers", "thread");
    let a_str = a.to_string();
    let mut comments = Vec::new();
    for body in ["one", "two", "three"] {
        let c = run_json(&dir, &["comment", "add", &a_str, body, "--as", "mrburns"]);
        comments.push(c["id"].as_i64().unwrap());
    }

    let shown = run_json(&dir, &["show", &a_str]);
    assert_eq!(shown["activity"]["comment_count"], 3);
    assert_eq!(shown["activity"]["first_comment"]["id"], comments[0]);
    assert_eq!(shown["activity"]["last_comment"]["id"], comments[2]);

    run(&dir, &["comment", "delete", &comments[1].to_string()]);
    let shown = run_json(&dir, &["show", &a_str]);
    assert_eq!(shown["activity"]["comment_count"], 2);
    assert_eq!(shown["activity"]["first_comment"]["id"], comments[0]);
    assert_eq!(shown["activity"]["last_comment"]["id"], comments[2]);

    run(&dir, &["comment", "delete", &comments[0].to_string()]);
    let shown = run_json(&dir, &["show", &a_str]);
    assert_eq!(shown["activity"]["comment_count"], 1);
    assert_eq!(shown["activity"]["first_comment"]["id"], comments[2]);
    assert_eq!(shown["activity"]["last_comment"]["id"], comments[2]);

    run(&dir, &["comment", "delete", &comments[2].to_string()]);
    let shown = run_json(&dir, &["show", &a_str]);
    assert_eq!(shown["activity"]["comment_count"], 0);
    assert!(shown["activity"].get("first_comment").is_none());
    assert!(shown["activity"].get("last_comment").is_none());
}

#[test]
fn empty_comment_is_a_validation_error() {
    let dir = springfield();
    let a = post(&dir, "smithers", "person:smithers", "thread");
    murmur()
        .args(["comment", "add", &a.to_string(), "   ", "--as", "mrburns"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("body"));
}

#[test]
fn deleting_unknown_comment_fails() {
    let dir = springfield();
    murmur()
        .args(["comment", "delete", "42"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("comment #42 not found"));
}

#[test]
fn starred_stream_tracks_stars() {
    let dir = springfield();
    let a = post(&dir, "smithers", "person:smithers", "star me");
    assert!(ids(&dir, STARRED, "mrburns").is_empty());
    run(&dir, &["star", &a.to_string(), "--as", "mrburns"]);
    assert_eq!(ids(&dir, STARRED, "mrburns"), vec![a]);
}

#[test]
fn custom_stream_lifecycle() {
    let dir = springfield();
    let a = post(&dir, "smithers", "person:smithers", "one");
    let b = post(&dir, "mrburns", "person:mrburns", "two");

    let view = run_json(
        &dir,
        &["stream", "create", "watch", "--as", "mrburns", "--scope", "person:smithers"],
    );
    let id = view["id"].as_i64().unwrap().to_string();
    assert_eq!(ids(&dir, &id, "mrburns"), vec![a]);

    run(&dir, &["stream", "add-scope", &id, "person:mrburns"]);
    assert_eq!(ids(&dir, &id, "mrburns"), vec![b, a]);

    run(&dir, &["stream", "remove-scope", &id, "person:smithers"]);
    assert_eq!(ids(&dir, &id, "mrburns"), vec![b]);

    run(&dir, &["stream", "delete", &id]);
    murmur()
        .args(["stream", "ids", &id, "--as", "mrburns"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("composite stream not found"));
}

#[test]
fn core_streams_cannot_be_edited() {
    let dir = springfield();
    murmur()
        .args(["stream", "add-scope", EVERYONE, "person:smithers"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a custom stream"));
}

#[test]
fn disabled_loader_is_reported() {
    let dir = springfield();
    std::fs::write(
        dir.path().join(".murmur/config.toml"),
        "[cache]\nloaders = [\"everyone\", \"custom\"]\n",
    )
    .unwrap();
    murmur()
        .args(["stream", "ids", STARRED, "--as", "smithers"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no loader registered"));
}

#[test]
fn shared_links_are_queryable() {
    let dir = springfield();
    let a = run_json(
        &dir,
        &["post", "look", "--as", "smithers", "--link", "http://example.com"],
    )["id"]
        .as_i64()
        .unwrap();
    post(&dir, "smithers", "person:smithers", "no link");
    let found: Vec<i64> =
        serde_json::from_value(run_json(&dir, &["stream", "resource", "http://example.com"]))
            .unwrap();
    assert_eq!(found, vec![a]);
}

#[test]
fn warm_rebuilds_from_records() {
    let dir = springfield();
    let a = post(&dir, "smithers", "person:smithers", "hello");
    std::fs::remove_file(dir.path().join(".murmur/cache.json")).unwrap();

    let report = run_json(&dir, &["warm"]);
    assert_eq!(report["people"], 2);
    assert_eq!(report["everyone"], 1);
    assert_eq!(ids(&dir, EVERYONE, "smithers"), vec![a]);
}

#[test]
fn tampered_cache_is_rejected() {
    let dir = springfield();
    let path = dir.path().join(".murmur/cache.json");
    let mut data = std::fs::read(&path).unwrap();
    data.extend_from_slice(b"garbage");
    std::fs::write(&path, data).unwrap();

    murmur()
        .args(["stream", "list"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("integrity check failed"));
}

#[test]
fn logging_goes_to_stderr() {
    let dir = springfield();
    murmur()
        .args(["stream", "ids", EVERYONE, "--as", "smithers"])
        .env("MURMUR_LOG", "debug")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("DEBUG").not())
        .stderr(predicate::str::contains("cache miss"));
}

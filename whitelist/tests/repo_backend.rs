//! End-to-end tests for the repository backend against a local bare remote.
//!
//! Each test seeds a bare repository, runs commands through
//! `WhitelistService`, and inspects what actually landed on the remote.

use whitelist::core::command::{Action, EosId, Location, Target, WhitelistCommand};
use whitelist::core::types::Disposition;
use whitelist::io::backend::Backend;
use whitelist::io::config::RepoConfig;
use whitelist::io::repo_store::RepoBackend;
use whitelist::service::WhitelistService;
use whitelist::test_support::TestRemote;

fn repo_backend(remote: &TestRemote, default_path: Option<&str>) -> RepoBackend {
    let cfg = RepoConfig {
        default_path: default_path.map(str::to_string),
        ..RepoConfig::default()
    };
    RepoBackend::new(&cfg, remote.credentials())
}

fn scoped(action: Action, id: &str, folder: &str, file: &str) -> WhitelistCommand {
    WhitelistCommand::new(
        action,
        EosId::new(id).expect("id"),
        Target::At(Location::new(folder, file).expect("location")),
    )
}

#[test]
fn add_commits_pretty_json_as_bot() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[("eu/main.json", r#"{"ExclusiveJoin":["P1"]}"#)])
        .expect("seed");
    let service = WhitelistService::new(repo_backend(&remote, None));

    let disposition = service.execute(&scoped(Action::Add, "P2", "eu", "main.json"));

    assert_eq!(disposition, Disposition::Added);
    assert_eq!(
        remote.read("eu/main.json").expect("read").as_deref(),
        Some("{\n    \"ExclusiveJoin\": [\n        \"P1\",\n        \"P2\"\n    ]\n}\n")
    );
    assert_eq!(
        remote.head_author().expect("author"),
        "Whitelist Bot <whitelist-bot@users.noreply.github.com>"
    );
}

#[test]
fn already_present_pushes_nothing() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[("eu/main.json", r#"{"ExclusiveJoin":["P1"]}"#)])
        .expect("seed");
    let before = remote.commit_count().expect("count");
    let service = WhitelistService::new(repo_backend(&remote, None));

    let disposition = service.execute(&scoped(Action::Add, "P1", "eu", "main.json"));

    assert_eq!(disposition, Disposition::AlreadyPresent);
    assert_eq!(remote.commit_count().expect("count"), before);
}

#[test]
fn remove_then_not_present() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[("eu/main.json", r#"{"ExclusiveJoin":["P1","P2"]}"#)])
        .expect("seed");
    let service = WhitelistService::new(repo_backend(&remote, None));

    assert_eq!(
        service.execute(&scoped(Action::Remove, "P1", "eu", "main.json")),
        Disposition::Removed
    );
    assert_eq!(
        service.execute(&scoped(Action::Remove, "P1", "eu", "main.json")),
        Disposition::NotPresent
    );
    let stored = service
        .read(&Target::At(Location::new("eu", "main.json").expect("location")))
        .expect("read back");
    assert_eq!(stored.exclusive_join, vec!["P2"]);
}

#[test]
fn missing_file_is_created_on_first_add() {
    let remote = TestRemote::new().expect("remote");
    remote.seed(&[("README.md", "whitelists\n")]).expect("seed");
    let service = WhitelistService::new(repo_backend(&remote, Some("whitelist.json")));

    let cmd = WhitelistCommand::new(Action::Add, EosId::new("P1").expect("id"), Target::Default);
    assert_eq!(service.execute(&cmd), Disposition::Added);
    assert_eq!(
        remote.read("whitelist.json").expect("read").as_deref(),
        Some("{\n    \"ExclusiveJoin\": [\n        \"P1\"\n    ]\n}\n")
    );
}

#[test]
fn malformed_document_is_reported_without_writing() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[("eu/main.json", r#"{"Players":[]}"#)])
        .expect("seed");
    let before = remote.commit_count().expect("count");
    let service = WhitelistService::new(repo_backend(&remote, None));

    let disposition = service.execute(&scoped(Action::Add, "P1", "eu", "main.json"));

    assert!(
        matches!(disposition, Disposition::Error(ref detail) if detail.contains("malformed")),
        "{disposition:?}"
    );
    assert_eq!(remote.commit_count().expect("count"), before);
}

#[test]
fn unscoped_command_without_default_path_fails() {
    let remote = TestRemote::new().expect("remote");
    remote.seed(&[("README.md", "x\n")]).expect("seed");
    let service = WhitelistService::new(repo_backend(&remote, None));

    let cmd = WhitelistCommand::new(Action::Add, EosId::new("P1").expect("id"), Target::Default);
    assert!(matches!(service.execute(&cmd), Disposition::Error(_)));
}

#[cfg(unix)]
#[test]
fn rejected_push_leaves_remote_unchanged() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[("eu/main.json", r#"{"ExclusiveJoin":["P1"]}"#)])
        .expect("seed");
    remote.reject_pushes().expect("hook");
    let service = WhitelistService::new(repo_backend(&remote, None));

    let disposition = service.execute(&scoped(Action::Add, "P2", "eu", "main.json"));

    assert!(matches!(disposition, Disposition::Error(_)), "{disposition:?}");
    assert_eq!(
        remote.read("eu/main.json").expect("read").as_deref(),
        Some(r#"{"ExclusiveJoin":["P1"]}"#)
    );
}

#[test]
fn lists_folder_file_locations() {
    let remote = TestRemote::new().expect("remote");
    remote
        .seed(&[
            ("eu/main.json", "{}"),
            ("eu/event.json", "{}"),
            ("us/main.json", "{}"),
            ("README.md", "x"),
        ])
        .expect("seed");
    let backend = repo_backend(&remote, None);

    let locations = backend.locations().expect("locations");
    let rendered: Vec<String> = locations.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["eu/event.json", "eu/main.json", "us/main.json"]);
}

#[test]
fn unreachable_remote_is_transport_error() {
    let remote = TestRemote::new().expect("remote");
    let mut creds = remote.credentials();
    creds.url = format!("{}-missing", creds.url);
    let backend = RepoBackend::new(&RepoConfig::default(), creds);

    let err = backend
        .fetch(&Target::At(Location::new("eu", "main.json").expect("location")))
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
}

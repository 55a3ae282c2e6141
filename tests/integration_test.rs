// tests/integration_test.rs
use ghsemver::config::Config;
use ghsemver::{current_version_in, next_version_in, VersionQuery};
use git2::{Oid, Repository, Signature};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Temporary repository whose HEAD starts on `main`
struct TestRepo {
    dir: TempDir,
    repo: Repository,
    counter: usize,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = Repository::init(dir.path()).expect("Could not init git repo");
        repo.set_head("refs/heads/main").expect("Could not point HEAD at main");
        {
            let mut config = repo.config().expect("Could not get config");
            config
                .set_str("user.name", "Test User")
                .expect("Could not set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Could not set user.email");
        }
        TestRepo {
            dir,
            repo,
            counter: 0,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn commit(&mut self, message: &str) -> Oid {
        self.counter += 1;
        let file = self.dir.path().join("CHANGELOG.md");
        fs::write(&file, format!("change {}\n", self.counter)).expect("Could not write file");

        let mut index = self.repo.index().expect("Could not get index");
        index
            .add_path(Path::new("CHANGELOG.md"))
            .expect("Could not add file to index");
        index.write().expect("Could not write index");
        let tree_id = index.write_tree().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");

        let sig = Signature::now("Test User", "test@example.com").expect("Could not get sig");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Could not create commit")
    }

    fn tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).expect("Could not find object");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Could not create tag");
    }

    fn annotated_tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).expect("Could not find object");
        let sig = Signature::now("Test User", "test@example.com").expect("Could not get sig");
        self.repo
            .tag(name, &object, &sig, "release", false)
            .expect("Could not create tag");
    }

    /// Create `branch` at HEAD and check it out
    fn checkout_new_branch(&self, branch: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Could not resolve HEAD");
        self.repo
            .branch(branch, &head, false)
            .expect("Could not create branch");
        self.repo
            .set_head(&format!("refs/heads/{}", branch))
            .expect("Could not check out branch");
    }
}

/// Config pointing the GitHub source at `server`, which answers 404 unless a
/// test mounts something
fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.github.api_url = server.uri();
    config.github.repository = Some("octo/widgets".to_string());
    config.versioning.main_branch = Some("main".to_string());
    config
}

#[tokio::test]
async fn test_next_version_on_main() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("chore: initial commit");
    repo.tag("v1.0.0", first);
    repo.commit("fix: handle empty input");
    repo.commit("feat: add export command");

    let config = config_for(&server);
    let query = VersionQuery::new();
    assert_eq!(
        current_version_in(repo.path(), &config, &query).await.unwrap(),
        "1.0.0"
    );
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "1.1.0"
    );
}

#[tokio::test]
async fn test_next_version_breaking_footer() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("feat: initial");
    repo.annotated_tag("v0.3.1", first);
    repo.commit("fix: rename field\n\nBREAKING CHANGE: `id` is now `key`");

    let config = config_for(&server);
    assert_eq!(
        next_version_in(repo.path(), &config, &VersionQuery::new())
            .await
            .unwrap(),
        "1.0.0"
    );
}

#[tokio::test]
async fn test_next_version_without_tags_starts_from_zero() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    repo.commit("feat: first feature");

    let config = config_for(&server);
    let query = VersionQuery::new();
    assert_eq!(current_version_in(repo.path(), &config, &query).await.unwrap(), "");
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "0.1.0"
    );
}

#[tokio::test]
async fn test_no_release_commits_is_empty() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("feat: initial");
    repo.tag("v1.0.0", first);
    repo.commit("docs: update readme");
    repo.commit("chore: bump deps");

    let config = config_for(&server);
    assert_eq!(
        next_version_in(repo.path(), &config, &VersionQuery::new())
            .await
            .unwrap(),
        ""
    );
}

#[tokio::test]
async fn test_prerelease_series_on_feature_branch() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("feat: initial");
    repo.tag("v1.0.0", first);
    repo.checkout_new_branch("feature/api");
    let fix = repo.commit("fix: validate payload");

    let config = config_for(&server);
    let query = VersionQuery::new();
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "1.0.1-feature-api.1"
    );

    // Publishing the proposal makes the same state a no-op
    repo.tag("v1.0.1-feature-api.1", fix);
    assert_eq!(next_version_in(repo.path(), &config, &query).await.unwrap(), "");
    assert_eq!(
        current_version_in(repo.path(), &config, &query).await.unwrap(),
        "1.0.1-feature-api.1"
    );

    // Another fix continues the series
    repo.commit("fix: tighten limits");
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "1.0.1-feature-api.2"
    );
}

#[tokio::test]
async fn test_prerelease_suffix_override() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("feat: initial");
    repo.tag("v1.2.3", first);
    repo.checkout_new_branch("develop");
    repo.commit("feat!: new storage format");

    let config = config_for(&server);
    let query = VersionQuery::new().with_prerelease_suffix("next");
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "2.0.0-next.1"
    );
}

#[tokio::test]
async fn test_tags_from_remote_when_missing_locally() {
    let server = MockServer::start().await;
    let mut repo = TestRepo::new();
    let first = repo.commit("chore: initial");
    repo.commit("fix: remote-tagged base follows");
    repo.commit("feat: new endpoint");

    // The clone has no tags; GitHub knows v2.4.0 on the first commit
    let first_sha = first.to_string();
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "sha": first_sha, "commit": { "message": "chore: initial" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "v2.4.0", "commit": { "sha": first_sha } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/git/ref/tags/v2.4.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": { "sha": first_sha, "type": "commit" }
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let query = VersionQuery::new();
    assert_eq!(
        current_version_in(repo.path(), &config, &query).await.unwrap(),
        "2.4.0"
    );
    assert_eq!(
        next_version_in(repo.path(), &config, &query).await.unwrap(),
        "2.5.0"
    );
}

#[tokio::test]
async fn test_unknown_repository_is_empty() {
    let mut repo = TestRepo::new();
    repo.commit("feat: initial");

    // No remote configured and no repository override
    let mut config = Config::default();
    config.github.api_url = "http://127.0.0.1:9".to_string();
    let query = VersionQuery::new().with_main_branch("main");
    assert_eq!(current_version_in(repo.path(), &config, &query).await.unwrap(), "");
    assert_eq!(next_version_in(repo.path(), &config, &query).await.unwrap(), "");
}

#[tokio::test]
async fn test_malformed_repository_override_is_error() {
    let repo = TestRepo::new();
    let mut config = Config::default();
    config.github.repository = Some("not-a-slug".to_string());

    let result = next_version_in(repo.path(), &config, &VersionQuery::new()).await;
    assert!(result.is_err());
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_ghsemver"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ghsemver"));
    assert!(stdout.contains("current"));
    assert!(stdout.contains("next"));
}

#[test]
fn test_cli_outside_repository_prints_empty_line() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_ghsemver"))
        .current_dir(dir.path())
        .arg("current")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "\n");
}

#[test]
fn test_cli_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_ghsemver"))
        .current_dir(dir.path())
        .args(["next", "--config", "does-not-exist.toml"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load configuration"));
}

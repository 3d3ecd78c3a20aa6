use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use std::thread;

use assert_cmd::Command;
use insta::assert_snapshot;
use predicates::str::contains;
use tempfile::tempdir;
use tiny_http::{Header, Response, Server, StatusCode};

struct TestSite {
    base_url: String,
    handle: thread::JoinHandle<()>,
}

impl TestSite {
    fn join(self) {
        self.handle.join().expect("join server");
    }
}

/// Serve `body` once at `expected_path` under a local site.
fn spawn_site(expected_path: &'static str, status: u16, body: &'static str) -> TestSite {
    let server = Server::http("127.0.0.1:0").expect("server");
    let base_url = format!("http://{}/wiki", server.server_addr());
    let handle = thread::spawn(move || {
        let req = server.recv().expect("request");
        assert_eq!(req.url(), expected_path);
        let resp = Response::from_string(body)
            .with_status_code(StatusCode(status))
            .with_header(Header::from_bytes("Content-Type", "text/html").expect("header"));
        req.respond(resp).expect("respond");
    });
    TestSite { base_url, handle }
}

/// A URL nothing is listening on.
fn closed_url() -> String {
    let server = Server::http("127.0.0.1:0").expect("server");
    let url = format!("http://{}/wiki", server.server_addr());
    drop(server);
    url
}

fn normalize_output(raw: &str, base_url: &str) -> String {
    raw.replace(base_url, "<SITE>")
}

fn docgate_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docgate"));
    cmd.current_dir(cwd);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8")
}

const PAGE: &str = "<html>\n<footer>Protelis. Currently 2.3.1. Created with Orchid.</footer>\n</html>\n";

#[test]
fn check_deploys_newer_build() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);

    let stdout = stdout_of(
        docgate_cmd(td.path())
            .arg("--base-url")
            .arg(&site.base_url)
            .arg("--build-version")
            .arg("2.4.0")
            .arg("check"),
    );

    assert_snapshot!(
        normalize_output(&stdout, &site.base_url),
        @r"
    Website <SITE> is at version 2.3.1. Orchid deployment enabled.
    dry_deploy=false
    deploy=true
    site_version=2.3.1
    "
    );
    site.join();
}

#[test]
fn check_older_build_is_dry_run() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);

    docgate_cmd(td.path())
        .arg("--base-url")
        .arg(&site.base_url)
        .arg("--build-version")
        .arg("2.0.0")
        .arg("check")
        .assert()
        .success()
        .stdout(contains("Orchid deployment set as dry run."))
        .stdout(contains("dry_deploy=true"))
        .stderr(contains("[info] Website"));
    site.join();
}

#[test]
fn check_beta_build_targets_beta_site() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki-beta", 200, PAGE);

    docgate_cmd(td.path())
        .arg("--base-url")
        .arg(&site.base_url)
        .arg("--build-version")
        .arg("2.4.0-dev2+0a1b2c3")
        .arg("check")
        .assert()
        .success()
        .stdout(contains("-beta is at version 2.3.1. Orchid deployment enabled."));
    site.join();
}

#[test]
fn check_stable_flag_overrides_beta_detection() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);

    docgate_cmd(td.path())
        .arg("--base-url")
        .arg(&site.base_url)
        .arg("--build-version")
        .arg("2.4.0-dev2+0a1b2c3")
        .arg("--stable")
        .arg("check")
        .assert()
        .success()
        .stdout(contains("dry_deploy=false"));
    site.join();
}

#[test]
fn check_unreachable_site_is_dry_run() {
    let td = tempdir().expect("tempdir");
    let url = closed_url();

    let stdout = stdout_of(
        docgate_cmd(td.path())
            .arg("--base-url")
            .arg(&url)
            .arg("--build-version")
            .arg("9.9.9")
            .arg("--timeout")
            .arg("5s")
            .arg("check"),
    );

    assert_snapshot!(
        normalize_output(&stdout, &url),
        @r"
    Unable to fetch the current site version from <SITE>
    dry_deploy=true
    deploy=false
    site_version=
    "
    );
}

#[test]
fn check_server_error_warns_and_dry_runs() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 503, PAGE);

    docgate_cmd(td.path())
        .arg("--base-url")
        .arg(&site.base_url)
        .arg("--build-version")
        .arg("9.9.9")
        .arg("check")
        .assert()
        .success()
        .stdout(contains("Unable to fetch"))
        .stderr(contains("[warn]"))
        .stderr(contains("503"));
    site.join();
}

#[test]
fn check_multiple_versions_is_dry_run() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site(
        "/wiki",
        200,
        "Currently 2.3.1. Created\nCurrently 2.3.0. Created\n",
    );

    let stdout = stdout_of(
        docgate_cmd(td.path())
            .arg("--base-url")
            .arg(&site.base_url)
            .arg("--build-version")
            .arg("9.9.9")
            .arg("check"),
    );

    assert!(stdout.contains(": [2.3.1, 2.3.0]. Orchid deployment set as dry run."));
    site.join();
}

#[test]
fn check_json_report() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);

    let stdout = stdout_of(
        docgate_cmd(td.path())
            .arg("--base-url")
            .arg(&site.base_url)
            .arg("--build-version")
            .arg("10.0.0")
            .arg("--compare")
            .arg("semantic")
            .arg("check")
            .arg("--format")
            .arg("json"),
    );

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(value["deploy"], true);
    assert_eq!(value["dry_deploy"], false);
    assert_eq!(value["compare"], "semantic");
    assert_eq!(value["site_version"]["kind"], "single");
    assert_eq!(value["site_version"]["versions"], "2.3.1");
    site.join();
}

#[test]
fn check_writes_output_file() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);
    let out = td.path().join("build").join("docgate.env");

    docgate_cmd(td.path())
        .arg("--base-url")
        .arg(&site.base_url)
        .arg("--build-version")
        .arg("2.4.0")
        .arg("check")
        .arg("--output")
        .arg(&out)
        .arg("--output-key")
        .arg("skip_deploy")
        .assert()
        .success()
        .stdout(contains("skip_deploy=false"));

    let content = fs::read_to_string(&out).expect("read output");
    assert_eq!(content, "skip_deploy=false\ndeploy=true\nsite_version=2.3.1\n");
    site.join();
}

#[test]
fn check_offline_page() {
    let td = tempdir().expect("tempdir");
    let page = td.path().join("index.html");
    fs::write(&page, PAGE).expect("write page");

    docgate_cmd(td.path())
        .arg("--build-version")
        .arg("2.4.0")
        .arg("check")
        .arg("--page")
        .arg(&page)
        .assert()
        .success()
        .stdout(contains(
            "Website https://protelis.github.io/wiki is at version 2.3.1. Orchid deployment enabled.",
        ));
}

#[test]
fn config_file_supplies_site_and_output() {
    let td = tempdir().expect("tempdir");
    let site = spawn_site("/wiki", 200, PAGE);
    fs::write(
        td.path().join(".docgate.toml"),
        format!(
            "[site]\nbase_url = \"{}\"\ntimeout = \"10s\"\n\n[output]\nkey = \"dry\"\nfile = \"gate.env\"\n",
            site.base_url
        ),
    )
    .expect("write config");

    docgate_cmd(td.path())
        .arg("--build-version")
        .arg("2.4.0")
        .arg("check")
        .assert()
        .success()
        .stdout(contains("dry=false"))
        .stderr(contains("decision written to"))
        .stderr(contains("gate.env"));

    let content = fs::read_to_string(td.path().join("gate.env")).expect("read output");
    assert!(content.starts_with("dry=false\n"));
    site.join();
}

#[test]
fn config_output_file_is_relative_to_config_dir() {
    let td = tempdir().expect("tempdir");
    let nested = td.path().join("docs");
    fs::create_dir_all(&nested).expect("create dirs");
    fs::write(
        td.path().join(".docgate.toml"),
        "[output]\nfile = \"build/gate.env\"\n",
    )
    .expect("write config");
    let page = td.path().join("page.html");
    fs::write(&page, "Currently 2.3.1. Created\n").expect("write page");

    docgate_cmd(&nested)
        .arg("--build-version")
        .arg("2.4.0")
        .arg("check")
        .arg("--page")
        .arg(&page)
        .assert()
        .success();

    let content =
        fs::read_to_string(td.path().join("build").join("gate.env")).expect("read output");
    assert!(content.starts_with("dry_deploy=false\n"));
    assert!(!nested.join("build").exists());
}

#[test]
fn explicit_missing_config_fails() {
    let td = tempdir().expect("tempdir");

    docgate_cmd(td.path())
        .arg("--config")
        .arg(td.path().join("nope.toml"))
        .arg("--build-version")
        .arg("2.4.0")
        .arg("url")
        .assert()
        .failure()
        .stderr(contains("[error] config file not found"));
}

#[test]
fn invalid_pattern_fails() {
    let td = tempdir().expect("tempdir");

    docgate_cmd(td.path())
        .arg("--pattern")
        .arg("Currently \\S+")
        .arg("--build-version")
        .arg("2.4.0")
        .arg("check")
        .arg("--page")
        .arg("-")
        .write_stdin("Currently 1.0.0. Created")
        .assert()
        .failure()
        .stderr(contains("exactly one capture group"));
}

#[test]
fn invalid_timeout_fails() {
    let td = tempdir().expect("tempdir");

    docgate_cmd(td.path())
        .arg("--timeout")
        .arg("soon")
        .arg("--build-version")
        .arg("2.4.0")
        .arg("url")
        .assert()
        .failure()
        .stderr(contains("invalid duration: soon"));
}

#[test]
fn url_command() {
    let td = tempdir().expect("tempdir");

    let stable = stdout_of(
        docgate_cmd(td.path())
            .arg("--build-version")
            .arg("2.4.0")
            .arg("url"),
    );
    assert_eq!(stable, "https://protelis.github.io/wiki\n");

    let beta = stdout_of(
        docgate_cmd(td.path())
            .arg("--build-version")
            .arg("2.4.0-dev1+0a1b2c3")
            .arg("url"),
    );
    assert_eq!(beta, "https://protelis.github.io/wiki-beta\n");

    let forced = stdout_of(
        docgate_cmd(td.path())
            .arg("--build-version")
            .arg("2.4.0")
            .arg("--beta")
            .arg("--beta-suffix")
            .arg("-next")
            .arg("url"),
    );
    assert_eq!(forced, "https://protelis.github.io/wiki-next\n");
}

#[test]
fn version_command_snapshot() {
    let td = tempdir().expect("tempdir");

    let stdout = stdout_of(
        docgate_cmd(td.path())
            .arg("--build-version")
            .arg("2.4.0-dev1+0a1b2c3")
            .arg("version"),
    );
    assert_snapshot!(stdout, @r"
    version: 2.4.0-dev1+0a1b2c3
    stable: false
    ");
}

#[test]
fn version_from_git_repository() {
    let td = tempdir().expect("tempdir");
    let git = |args: &[&str]| {
        let ok = StdCommand::new("git")
            .args(args)
            .current_dir(td.path())
            .output()
            .expect("git")
            .status
            .success();
        assert!(ok, "git {args:?} failed");
    };
    git(&["init"]);
    git(&["config", "user.email", "test@example.com"]);
    git(&["config", "user.name", "Test User"]);
    git(&["config", "commit.gpgsign", "false"]);
    git(&["commit", "--allow-empty", "-m", "initial"]);
    git(&["tag", "3.1.4"]);

    let stdout = stdout_of(docgate_cmd(td.path()).arg("version"));
    assert_eq!(stdout, "version: 3.1.4\nstable: true\n");
}

#[test]
fn version_outside_repository_fails() {
    let td = tempdir().expect("tempdir");

    docgate_cmd(td.path())
        .arg("version")
        .assert()
        .failure()
        .stderr(contains("pass --build-version"));
}

#[test]
fn scan_command_lists_matches() {
    let td = tempdir().expect("tempdir");
    let page = td.path().join("page.html");
    fs::write(&page, "Currently 1.0.0. Created\nfoo\nCurrently 1.1.0. Created\n").expect("write");

    let stdout = stdout_of(docgate_cmd(td.path()).arg("scan").arg(&page));
    assert_eq!(stdout, "1.0.0\n1.1.0\n");
}

#[test]
fn scan_stdin_without_matches_warns() {
    let td = tempdir().expect("tempdir");

    docgate_cmd(td.path())
        .arg("scan")
        .arg("-")
        .write_stdin("<html></html>")
        .assert()
        .success()
        .stdout("")
        .stderr(contains("[warn] no version found"));
}

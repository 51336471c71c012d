//! End-to-end fleet run over a filesystem-backed object store:
//! publish → bootstrap → wait, exercising both transfer directions and the
//! status protocol exactly as a real run would, minus the network.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use flotilla_common::InstanceStatus;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn flotilla() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flotilla"));
    cmd.env("NO_COLOR", "1");
    cmd
}

const MANIFEST_KEY: &str = "runs/e2e/manifest.json";
const PREFIX: &str = "runs/e2e";

struct Fixture {
    store: TempDir,
    work: TempDir,
    manifest_file: std::path::PathBuf,
}

impl Fixture {
    /// One job: pull `input`, copy its file into the results directory,
    /// push `results`.
    fn new() -> Self {
        let store = TempDir::new().expect("store dir");
        let work = TempDir::new().expect("work dir");

        let input_path = work.path().join("input");
        let results_path = work.path().join("results");
        let manifest = json!({
            "key_prefix": PREFIX,
            "jobs": [{
                "instance_id": 1,
                "required_documents": ["input", "results"],
                "commands": [{
                    "program": "sh",
                    "args": ["-c", format!(
                        "mkdir -p {r} && cp {i}/data.txt {r}/out.txt",
                        r = results_path.display(),
                        i = input_path.display(),
                    )],
                }],
            }],
            "documents": [
                {
                    "name": "input",
                    "local_path": input_path,
                    "direction": "LocalToAWS",
                },
                {
                    "name": "results",
                    "local_path": results_path,
                    "direction": "AWSToLocal",
                },
            ],
        });

        let manifest_file = work.path().join("fleet-manifest.json");
        std::fs::write(
            &manifest_file,
            serde_json::to_vec_pretty(&manifest).expect("serialize"),
        )
        .expect("write manifest");

        Self {
            store,
            work,
            manifest_file,
        }
    }

    fn bucket(&self) -> &str {
        self.store.path().to_str().expect("utf-8 path")
    }

    fn object(&self, key: &str) -> std::path::PathBuf {
        self.store.path().join(key)
    }

    /// Stage the `input` artifact the way the orchestrator would: pack a
    /// directory and drop it at the document's key.
    fn stage_input(&self) {
        let src = self.work.path().join("staged-input");
        std::fs::create_dir_all(&src).expect("create input source");
        std::fs::write(src.join("data.txt"), "payload\n").expect("write input file");

        let key_path = self.object(&format!("{PREFIX}/input.tar.gz"));
        std::fs::create_dir_all(key_path.parent().expect("parent")).expect("create key dir");
        flotilla_cli::infra::archive::pack(&src, &key_path).expect("pack input");
    }

    fn read_status(&self, instance_id: u32) -> InstanceStatus {
        let path = self.object(&format!("{PREFIX}/status/instance-{instance_id}.json"));
        let bytes = std::fs::read(&path).expect("status record exists");
        InstanceStatus::from_slice(&bytes).expect("status record parses")
    }
}

fn publish(fx: &Fixture) {
    flotilla()
        .args([
            "publish",
            "--bucket",
            fx.bucket(),
            "--manifest",
            fx.manifest_file.to_str().expect("utf-8 path"),
            "--manifest-key",
            MANIFEST_KEY,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 1 status record"));
}

#[test]
fn test_publish_uploads_manifest_and_seeds_status() {
    let fx = Fixture::new();
    publish(&fx);

    assert!(fx.object(MANIFEST_KEY).is_file());
    let status = fx.read_status(1);
    assert_eq!(status.message, "initialized");
    assert_eq!(status.totals.downloads, 1);
    assert_eq!(status.totals.commands, 1);
    assert_eq!(status.totals.uploads, 1);
    assert!(!status.all_tasks_finished());
}

#[test]
fn test_full_fleet_round_trip() {
    let fx = Fixture::new();
    publish(&fx);
    fx.stage_input();

    flotilla()
        .args([
            "bootstrap",
            "--bucket",
            fx.bucket(),
            "--manifest-key",
            MANIFEST_KEY,
            "--instance-id",
            "1",
            "--work-dir",
            fx.work.path().to_str().expect("utf-8 path"),
        ])
        .assert()
        .success();

    // The instance pulled the input, ran the command, pushed the results,
    // and shipped its log and manifest copy.
    assert!(fx.object(&format!("{PREFIX}/results.tar.gz")).is_file());
    assert!(fx.object(&format!("{PREFIX}/logs/instance-1.log")).is_file());
    assert!(fx.work.path().join("manifest.json").is_file());

    let status = fx.read_status(1);
    assert_eq!(status.message, "completed all tasks");
    assert!(status.all_tasks_finished());

    // The barrier clears on the first pass and fetches the results.
    let fetched = TempDir::new().expect("fetch dir");
    flotilla()
        .args([
            "wait",
            "--bucket",
            fx.bucket(),
            "--manifest-key",
            MANIFEST_KEY,
            "--interval-secs",
            "1",
            "--fetch-dir",
            fetched.path().to_str().expect("utf-8 path"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("results"));

    let out = fetched.path().join("results").join("out.txt");
    assert_eq!(
        std::fs::read_to_string(&out).expect("fetched result file"),
        "payload\n"
    );

    flotilla()
        .args([
            "status",
            "--bucket",
            fx.bucket(),
            "--manifest-key",
            MANIFEST_KEY,
            "--instance-id",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Instance 1"))
        .stdout(predicate::str::contains("completed all tasks"));
}

#[test]
fn test_failing_command_publishes_failure_and_exits_nonzero() {
    let store = TempDir::new().expect("store dir");
    let work = TempDir::new().expect("work dir");
    let manifest = json!({
        "key_prefix": PREFIX,
        "jobs": [{
            "instance_id": 1,
            "required_documents": [],
            "commands": [
                {"program": "sh", "args": ["-c", "echo boom >&2; exit 3"]},
                {"program": "sh", "args": ["-c", "touch should-not-exist"]},
            ],
        }],
        "documents": [],
    });
    let manifest_file = work.path().join("fleet-manifest.json");
    std::fs::write(
        &manifest_file,
        serde_json::to_vec(&manifest).expect("serialize"),
    )
    .expect("write manifest");

    let store_path = store.path().join(MANIFEST_KEY);
    std::fs::create_dir_all(store_path.parent().expect("parent")).expect("create key dir");
    std::fs::copy(&manifest_file, &store_path).expect("stage manifest");

    flotilla()
        .args([
            "bootstrap",
            "--bucket",
            store.path().to_str().expect("utf-8 path"),
            "--manifest-key",
            MANIFEST_KEY,
            "--instance-id",
            "1",
            "--work-dir",
            work.path().to_str().expect("utf-8 path"),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("boom"));

    // The failure was published with partial progress before the exit.
    let status_path: &Path = &store
        .path()
        .join(format!("{PREFIX}/status/instance-1.json"));
    let bytes = std::fs::read(status_path).expect("failure record exists");
    let status = InstanceStatus::from_slice(&bytes).expect("failure record parses");
    assert!(status.message.starts_with("failed"), "got: {}", status.message);
    assert_eq!(status.commands_finished, 0);
    assert!(!status.all_tasks_finished());

    // The second command never ran.
    assert!(!work.path().join("should-not-exist").exists());
}

#[test]
fn test_wait_reports_unpublished_run() {
    let store = TempDir::new().expect("store dir");
    flotilla()
        .args([
            "wait",
            "--bucket",
            store.path().to_str().expect("utf-8 path"),
            "--manifest-key",
            MANIFEST_KEY,
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no manifest"));
}

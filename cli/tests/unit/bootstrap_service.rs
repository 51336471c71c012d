//! Unit tests for the bootstrap state machine service.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use flotilla_cli::application::services::bootstrap;
use flotilla_common::{CommandSpec, Direction, DocumentSpec, InstanceStatus, Job, Manifest};

use crate::mocks::{
    err_output, ok_output, MemoryStatusStore, RecordingTransfer, ScriptedRunner, SilentReporter,
};

/// One job with a pulled input, a prestaged reference, a pushed result, and
/// two commands.
fn manifest() -> Manifest {
    Manifest {
        key_prefix: "runs/test".to_string(),
        jobs: vec![Job {
            instance_id: 7,
            required_documents: vec![
                "code".to_string(),
                "reference".to_string(),
                "results".to_string(),
            ],
            commands: vec![
                CommandSpec {
                    program: "make".to_string(),
                    args: vec![],
                },
                CommandSpec {
                    program: "make".to_string(),
                    args: vec!["check".to_string()],
                },
            ],
        }],
        documents: vec![
            DocumentSpec {
                name: "code".to_string(),
                local_path: PathBuf::from("/work/code"),
                direction: Direction::LocalToAws,
            },
            DocumentSpec {
                name: "reference".to_string(),
                local_path: PathBuf::from("/work/reference"),
                direction: Direction::Static,
            },
            DocumentSpec {
                name: "results".to_string(),
                local_path: PathBuf::from("/work/results"),
                direction: Direction::AwsToLocal,
            },
        ],
    }
}

#[tokio::test]
async fn test_happy_path_runs_all_phases_in_order() {
    let manifest = manifest();
    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    let runner = ScriptedRunner::new(vec![ok_output(b""), ok_output(b"")]);

    let status = bootstrap::execute(&manifest, 7, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect("bootstrap should succeed");

    // Static is pulled like LocalToAWS; AWSToLocal is never downloaded.
    assert_eq!(transfer.downloaded(), vec!["code", "reference"]);
    assert_eq!(transfer.uploaded(), vec!["results"]);
    assert_eq!(runner.issued(), vec!["make", "make check"]);

    assert_eq!(status.downloads_finished, 2);
    assert_eq!(status.commands_finished, 2);
    assert_eq!(status.uploads_finished, 1);
    assert!(status.all_tasks_finished());

    let last = statuses.latest(7).expect("final record published");
    assert_eq!(last.message, "completed all tasks");
    assert!(last.all_tasks_finished());
}

#[tokio::test]
async fn test_counters_never_decrease_across_publishes() {
    let manifest = manifest();
    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    let runner = ScriptedRunner::new(vec![ok_output(b""), ok_output(b"")]);

    bootstrap::execute(&manifest, 7, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect("bootstrap should succeed");

    let history = statuses.history();
    assert!(!history.is_empty());
    for pair in history.windows(2) {
        assert!(pair[1].downloads_finished >= pair[0].downloads_finished);
        assert!(pair[1].commands_finished >= pair[0].commands_finished);
        assert!(pair[1].uploads_finished >= pair[0].uploads_finished);
    }

    // Counters advance one task at a time and land exactly on the totals.
    let counts: Vec<u32> = history.iter().map(|s| s.commands_finished).collect();
    for pair in counts.windows(2) {
        assert!(pair[1] - pair[0] <= 1);
    }
    assert_eq!(history.last().expect("non-empty").commands_finished, 2);
}

#[tokio::test]
async fn test_command_failure_aborts_remaining_phases() {
    let manifest = manifest();
    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    let runner = ScriptedRunner::new(vec![ok_output(b""), err_output(b"segfault in solver")]);

    let err = bootstrap::execute(&manifest, 7, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect_err("second command fails");

    // Error carries the command line and the captured output.
    let text = format!("{err}");
    assert!(text.contains("make check"), "got: {text}");
    assert!(text.contains("segfault in solver"), "got: {text}");

    // The upload phase never ran.
    assert!(transfer.uploaded().is_empty());

    // Partial progress was published before the error propagated.
    let last = statuses.latest(7).expect("failure record published");
    assert!(last.message.starts_with("failed"), "got: {}", last.message);
    assert_eq!(last.commands_finished, 1);
    assert_eq!(last.downloads_finished, 2);
    assert!(!last.all_tasks_finished());
}

#[tokio::test]
async fn test_unknown_instance_id_publishes_nothing() {
    let manifest = manifest();
    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    let runner = ScriptedRunner::new(vec![]);

    let err = bootstrap::execute(&manifest, 99, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect_err("no job 99");

    assert!(format!("{err}").contains("99"));
    assert!(statuses.history().is_empty());
    assert!(transfer.downloaded().is_empty());
}

#[tokio::test]
async fn test_rerun_restarts_counters_from_zero() {
    let manifest = manifest();
    let job = manifest.job(7).expect("job");
    let mut stale = InstanceStatus::for_job(&manifest, job).expect("status");
    stale.record_download();
    stale.record_download();
    stale.record_command();

    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    statuses.seed(stale);
    let runner = ScriptedRunner::new(vec![ok_output(b""), ok_output(b"")]);

    let status = bootstrap::execute(&manifest, 7, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect("bootstrap should succeed");

    // The instance owns the record; a fresh run replaces stale progress.
    let first = statuses.history().first().cloned().expect("initial publish");
    assert_eq!(first.downloads_finished, 0);
    assert_eq!(first.commands_finished, 0);
    assert_eq!(status.commands_finished, 2);
}

#[tokio::test]
async fn test_job_without_tasks_completes_immediately() {
    let manifest = Manifest {
        key_prefix: "runs/empty".to_string(),
        jobs: vec![Job {
            instance_id: 1,
            required_documents: vec![],
            commands: vec![],
        }],
        documents: vec![],
    };
    let transfer = RecordingTransfer::new();
    let statuses = MemoryStatusStore::new();
    let runner = ScriptedRunner::new(vec![]);

    let status = bootstrap::execute(&manifest, 1, &transfer, &statuses, &runner, &SilentReporter)
        .await
        .expect("empty job succeeds");

    assert!(status.all_tasks_finished());
    assert!(transfer.downloaded().is_empty());
    assert!(transfer.uploaded().is_empty());
}

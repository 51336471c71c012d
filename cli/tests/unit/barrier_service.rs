//! Unit tests for the completion barrier service.

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use flotilla_cli::application::ports::StatusStore;
use flotilla_cli::application::services::barrier::CompletionBarrier;
use flotilla_common::{Direction, DocumentSpec, InstanceStatus, Job, Manifest, TaskTotals};

use crate::mocks::SilentReporter;

/// Three jobs: 1 owns "alpha-results", 2 owns "beta-results", 3 owns
/// "gamma-results"; job 1 also pulls a shared static input that must never
/// show up as a result.
fn manifest() -> Manifest {
    let result_doc = |name: &str| DocumentSpec {
        name: name.to_string(),
        local_path: PathBuf::from(format!("/work/{name}")),
        direction: Direction::AwsToLocal,
    };
    Manifest {
        key_prefix: "runs/fleet".to_string(),
        jobs: vec![
            Job {
                instance_id: 1,
                required_documents: vec!["shared-input".to_string(), "alpha-results".to_string()],
                commands: vec![],
            },
            Job {
                instance_id: 2,
                required_documents: vec!["beta-results".to_string()],
                commands: vec![],
            },
            Job {
                instance_id: 3,
                required_documents: vec!["gamma-results".to_string()],
                commands: vec![],
            },
        ],
        documents: vec![
            DocumentSpec {
                name: "shared-input".to_string(),
                local_path: PathBuf::from("/work/shared-input"),
                direction: Direction::Static,
            },
            result_doc("alpha-results"),
            result_doc("beta-results"),
            result_doc("gamma-results"),
        ],
    }
}

fn record(instance_id: u32, finished: bool) -> InstanceStatus {
    let message = if finished {
        "completed all tasks"
    } else {
        "running commands"
    };
    InstanceStatus {
        instance_id,
        message: message.to_string(),
        downloads_finished: 0,
        commands_finished: 0,
        uploads_finished: 0,
        // A zero-total record reads as finished; one pending command does not.
        totals: TaskTotals {
            downloads: 0,
            commands: u32::from(!finished),
            uploads: 0,
        },
        updated_at: Utc::now(),
    }
}

/// Status store whose instances finish after a scripted number of reads.
/// `None` means the instance never finishes.
struct PhasedStore {
    finish_after: HashMap<u32, Option<usize>>,
    reads: Mutex<HashMap<u32, usize>>,
}

impl PhasedStore {
    fn new(finish_after: &[(u32, Option<usize>)]) -> Self {
        Self {
            finish_after: finish_after.iter().copied().collect(),
            reads: Mutex::new(HashMap::new()),
        }
    }
}

impl StatusStore for PhasedStore {
    async fn read(&self, _prefix: &str, instance_id: u32) -> Result<Option<InstanceStatus>> {
        let Some(threshold) = self.finish_after.get(&instance_id) else {
            return Ok(None);
        };
        let mut reads = self.reads.lock().expect("lock");
        let seen = reads.entry(instance_id).or_insert(0);
        *seen += 1;
        let finished = threshold.is_some_and(|n| *seen >= n);
        Ok(Some(record(instance_id, finished)))
    }

    async fn write(&self, _prefix: &str, _status: &InstanceStatus) -> Result<()> {
        anyhow::bail!("the orchestrator never writes status records")
    }
}

#[tokio::test]
async fn test_active_set_shrinks_monotonically() {
    let manifest = manifest();
    // Job 1 finishes immediately, job 2 after its second read, job 3 never.
    let store = PhasedStore::new(&[(1, Some(1)), (2, Some(2)), (3, None::<usize>)]);
    let mut barrier = CompletionBarrier::new(&manifest);
    assert_eq!(barrier.remaining(), 3);

    let pass = barrier.poll_once(&store).await.expect("pass 1");
    assert_eq!(pass.newly_available, vec!["alpha-results"]);
    assert_eq!(pass.remaining, 2);

    let pass = barrier.poll_once(&store).await.expect("pass 2");
    assert_eq!(pass.newly_available, vec!["beta-results"]);
    assert_eq!(pass.remaining, 1);

    // Further passes re-read only the unfinished instance and are no-ops.
    for _ in 0..3 {
        let pass = barrier.poll_once(&store).await.expect("later pass");
        assert!(pass.newly_available.is_empty());
        assert_eq!(pass.remaining, 1);
    }
    assert!(!barrier.is_complete());
}

#[tokio::test]
async fn test_static_documents_are_never_reported_as_results() {
    let manifest = manifest();
    let store = PhasedStore::new(&[(1, Some(1)), (2, Some(1)), (3, Some(1))]);
    let mut barrier = CompletionBarrier::new(&manifest);

    let pass = barrier.poll_once(&store).await.expect("pass");
    assert!(!pass.newly_available.contains(&"shared-input".to_string()));
    assert!(barrier.is_complete());
}

#[tokio::test]
async fn test_wait_all_accumulates_in_completion_order() {
    let manifest = manifest();
    let store = PhasedStore::new(&[(1, Some(1)), (2, Some(2)), (3, Some(1))]);
    let mut barrier = CompletionBarrier::new(&manifest);

    let available = barrier
        .wait_all(&store, &SilentReporter, Duration::from_millis(1))
        .await
        .expect("fleet finishes");

    // Jobs 1 and 3 finish on the first pass, job 2 on the second.
    assert_eq!(
        available,
        vec!["alpha-results", "gamma-results", "beta-results"]
    );
    assert!(barrier.is_complete());
    assert_eq!(barrier.remaining(), 0);
}

#[tokio::test]
async fn test_missing_status_record_is_fatal() {
    let mut manifest = manifest();
    manifest.jobs.push(Job {
        instance_id: 44,
        required_documents: vec![],
        commands: vec![],
    });
    let store = PhasedStore::new(&[(1, Some(1)), (2, Some(1)), (3, Some(1))]);
    let mut barrier = CompletionBarrier::new(&manifest);

    let err = barrier.poll_once(&store).await.expect_err("no record for 44");
    assert!(format!("{err:#}").contains("44"));
}

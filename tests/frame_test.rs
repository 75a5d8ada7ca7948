//! Hidden-frame strategy tests against a mock frame host.
//!
//! Uses tokio's paused clock (`start_paused`) so the 20-second frame
//! timeout and the 2-second detach grace run instantly.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use muninn::{
    CachedContent, FrameHandle, FrameHost, FrameSignal, LoadState, Muninn, PreloadConfig,
    PreloadOutcome, PreloadService, ResourceDescriptor, Result, SandboxPolicy, WarmupStatus,
};

const DASHBOARD_URL: &str = "http://grafana.internal:3000/d/MQWgroiiz/mysql-overview?orgId=1&kiosk";

#[derive(Clone, Copy)]
enum FrameBehavior {
    LoadAfter(Duration),
    FailAfter(Duration),
}

struct MockFrameHost {
    behavior: FrameBehavior,
    opens: AtomicUsize,
    hints: Mutex<Vec<String>>,
    sandboxes: Mutex<Vec<String>>,
    detached: Arc<AtomicBool>,
}

impl MockFrameHost {
    fn new(behavior: FrameBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            opens: AtomicUsize::new(0),
            hints: Mutex::new(Vec::new()),
            sandboxes: Mutex::new(Vec::new()),
            detached: Arc::new(AtomicBool::new(false)),
        })
    }

    fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

struct MockFrame {
    behavior: FrameBehavior,
    detached: Arc<AtomicBool>,
}

#[async_trait]
impl FrameHandle for MockFrame {
    async fn wait(&mut self) -> FrameSignal {
        match self.behavior {
            FrameBehavior::LoadAfter(delay) => {
                tokio::time::sleep(delay).await;
                FrameSignal::Loaded
            }
            FrameBehavior::FailAfter(delay) => {
                tokio::time::sleep(delay).await;
                FrameSignal::Failed("dashboard unreachable".to_string())
            }
        }
    }

    fn detach(&mut self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FrameHost for MockFrameHost {
    async fn open(&self, _url: &str, sandbox: &SandboxPolicy) -> Result<Box<dyn FrameHandle>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.sandboxes
            .lock()
            .unwrap()
            .push(sandbox.attribute_value());
        Ok(Box::new(MockFrame {
            behavior: self.behavior,
            detached: Arc::clone(&self.detached),
        }))
    }

    fn hint_origin(&self, origin: &str) {
        self.hints.lock().unwrap().push(origin.to_string());
    }
}

fn service_with(frames: Arc<MockFrameHost>) -> PreloadService {
    Muninn::builder()
        .frames(frames)
        .config(PreloadConfig {
            resources: vec![ResourceDescriptor::iframe(
                "grafana-mysql-overview",
                DASHBOARD_URL,
            )],
            grafana: Vec::new(),
        })
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn loaded_frame_caches_status_and_detaches_after_grace() {
    let frames = MockFrameHost::new(FrameBehavior::LoadAfter(Duration::ZERO));
    let service = service_with(Arc::clone(&frames));

    let results = service.start_preloading(None).await;
    assert_eq!(results[0].outcome, PreloadOutcome::Warmed);

    let cached = service.cached_resource("grafana-mysql-overview").unwrap();
    let record = match cached {
        CachedContent::Status(record) => record,
        other => panic!("expected status record, got {other:?}"),
    };
    assert_eq!(record.status, WarmupStatus::Preloaded);
    assert_eq!(record.url, DASHBOARD_URL);

    // The frame stays attached for the grace period so the host HTTP cache
    // can absorb subresources, then gets removed.
    assert!(!frames.is_detached());
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(frames.is_detached());

    // Preconnect hints carried the bare origin, and the sandbox granted
    // exactly the restrictive set.
    assert_eq!(
        frames.hints.lock().unwrap().as_slice(),
        ["http://grafana.internal:3000"]
    );
    assert_eq!(
        frames.sandboxes.lock().unwrap().as_slice(),
        ["allow-scripts allow-same-origin allow-forms"]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_frame_caches_failure_and_detaches_immediately() {
    let frames = MockFrameHost::new(FrameBehavior::FailAfter(Duration::ZERO));
    let service = service_with(Arc::clone(&frames));

    let results = service.start_preloading(None).await;
    assert_eq!(
        results[0].outcome,
        PreloadOutcome::FrameFailed {
            error: "dashboard unreachable".to_string()
        }
    );
    assert!(frames.is_detached());

    let record = service
        .cached_resource("grafana-mysql-overview")
        .unwrap()
        .as_status()
        .cloned()
        .unwrap();
    assert_eq!(record.status, WarmupStatus::Failed);

    assert!(matches!(
        service.load_state("grafana-mysql-overview"),
        Some(LoadState::Failed { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn timeout_beats_a_late_load_signal() {
    // The frame would load at t+25s, past the 20-second timeout.
    let frames = MockFrameHost::new(FrameBehavior::LoadAfter(Duration::from_secs(25)));
    let service = service_with(Arc::clone(&frames));

    let results = service.start_preloading(None).await;
    assert_eq!(results[0].outcome, PreloadOutcome::TimedOut);
    assert!(frames.is_detached());

    // Let the clock pass the would-be load instant: the late signal must
    // not overwrite the timeout record (first settler wins).
    tokio::time::sleep(Duration::from_secs(10)).await;
    let record = service
        .cached_resource("grafana-mysql-overview")
        .unwrap()
        .as_status()
        .cloned()
        .unwrap();
    assert_eq!(record.status, WarmupStatus::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn cached_failure_record_suppresses_retry_within_ttl() {
    let frames = MockFrameHost::new(FrameBehavior::FailAfter(Duration::ZERO));
    let service = service_with(Arc::clone(&frames));

    service.start_preloading(None).await;
    assert_eq!(frames.open_count(), 1);

    // The failed attempt left a valid failure record, so the known-bad
    // dashboard is not hammered again.
    let results = service.start_preloading(None).await;
    assert_eq!(results[0].outcome, PreloadOutcome::AlreadyCached);
    assert_eq!(frames.open_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_passes_share_one_operation() {
    let frames = MockFrameHost::new(FrameBehavior::LoadAfter(Duration::from_secs(5)));
    let service = service_with(Arc::clone(&frames));

    let (first, second) =
        tokio::join!(service.start_preloading(None), service.start_preloading(None));

    assert_eq!(frames.open_count(), 1);
    assert_eq!(first[0].outcome, PreloadOutcome::Warmed);
    assert_eq!(second[0].outcome, PreloadOutcome::Warmed);
}

#[tokio::test]
async fn without_a_frame_host_iframes_settle_as_failures() {
    let service = Muninn::builder()
        .config(PreloadConfig {
            resources: vec![ResourceDescriptor::iframe("grafana-x", DASHBOARD_URL)],
            grafana: Vec::new(),
        })
        .build()
        .unwrap();

    let results = service.start_preloading(None).await;
    assert!(matches!(
        results[0].outcome,
        PreloadOutcome::FrameFailed { .. }
    ));
    // The frame never attached, so nothing was cached.
    assert_eq!(service.cached_resource("grafana-x"), None);
}

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use fimwatch::{
    Baseline, BaselineBuilder, BaselineSource, BaselineStore, ChangeClassifier, ChangeEvent,
    ChangeKind, ChangeSink, FileHasher, Monitor, MonitorState, PrepareOutcome, RawEvent,
    RawEventKind, RetryPolicy,
};

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

#[derive(Clone, Default)]
struct CollectingSink {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

impl CollectingSink {
    fn saw(&self, kind: ChangeKind, path: &Path) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.kind == kind && e.path == path)
    }
}

impl ChangeSink for CollectingSink {
    fn notify(&mut self, event: &ChangeEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct FailingSink;

impl ChangeSink for FailingSink {
    fn notify(&mut self, _event: &ChangeEvent) -> anyhow::Result<()> {
        anyhow::bail!("sink is broken")
    }
}

fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..50 {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(100));
    }
    false
}

#[test]
fn test_build_modify_delete_scenario() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    let file = watched.path().join("a.txt");
    fs::write(&file, "hello").expect("Failed to write test file");

    let hasher = FileHasher::new(RetryPolicy::immediate(3));
    let mut store = BaselineStore::new(state.path().join("baseline.json"));
    let count = BaselineBuilder::new(&hasher)
        .build(watched.path(), &mut store)
        .expect("Failed to build baseline");

    assert_eq!(count, 1);
    assert_eq!(store.baseline().get(&file), Some(HELLO_SHA256));

    // Overwrite and deliver the corresponding raw event
    fs::write(&file, "hello!").expect("Failed to modify test file");
    let classifier = ChangeClassifier::new(FileHasher::new(RetryPolicy::immediate(3)));
    let event = classifier
        .classify(
            &RawEvent::new(file.clone(), RawEventKind::Modified),
            store.baseline_mut(),
        )
        .expect("Modified event expected");

    assert_eq!(event.kind, ChangeKind::Modified);
    let new_digest = store.baseline().get(&file).unwrap().to_string();
    assert_ne!(new_digest, HELLO_SHA256);

    // Delete and deliver the corresponding raw event
    fs::remove_file(&file).expect("Failed to delete test file");
    let event = classifier
        .classify(
            &RawEvent::new(file.clone(), RawEventKind::Deleted),
            store.baseline_mut(),
        )
        .expect("Deleted event expected");

    assert_eq!(event.kind, ChangeKind::Deleted);
    assert!(store.baseline().is_empty());
}

#[test]
fn test_monitor_reports_live_changes() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    let tracked = watched.path().join("tracked.txt");
    fs::write(&tracked, "hello").expect("Failed to write test file");

    let store = BaselineStore::new(state.path().join("baseline.json"));
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3))
        .with_poll_timeout(Duration::from_millis(50));

    match monitor.prepare(BaselineSource::Build).unwrap() {
        PrepareOutcome::Built { files } => assert_eq!(files, 1),
        other => panic!("expected Built, got {:?}", other),
    }

    let handle = monitor.handle();
    let sink = CollectingSink::default();
    let sink_clone = sink.clone();

    let runner = thread::spawn(move || {
        let mut sink = sink_clone;
        let res = monitor.run(&mut sink);
        (res, monitor)
    });

    // Give the watcher time to register before touching files
    thread::sleep(Duration::from_millis(300));

    let added = watched.path().join("added.txt");
    fs::write(&added, "fresh").expect("Failed to write new file");
    assert!(
        wait_for(|| sink.saw(ChangeKind::New, &added)),
        "Should have reported the new file"
    );

    fs::write(&tracked, "hello, tampered").expect("Failed to modify test file");
    assert!(
        wait_for(|| sink.saw(ChangeKind::Modified, &tracked)),
        "Should have reported the modification"
    );

    fs::remove_file(&tracked).expect("Failed to delete test file");
    assert!(
        wait_for(|| sink.saw(ChangeKind::Deleted, &tracked)),
        "Should have reported the deletion"
    );

    handle.stop();
    let (res, monitor) = runner.join().expect("Monitor thread panicked");
    res.expect("Monitor should stop cleanly");
    assert_eq!(monitor.state(), MonitorState::Stopped);

    // Durable state caught up with what was observed
    let mut reopened = BaselineStore::new(state.path().join("baseline.json"));
    reopened.load().unwrap();
    assert!(reopened.baseline().contains(&added));
    assert!(!reopened.baseline().contains(&tracked));
}

#[test]
fn test_resume_with_no_stored_baseline() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    fs::write(watched.path().join("a.txt"), "hello").unwrap();

    let store = BaselineStore::new(state.path().join("baseline.json"));
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3));

    // Nothing persisted yet: resume surfaces the absence instead of
    // silently starting empty
    let outcome = monitor.prepare(BaselineSource::Resume).unwrap();
    assert_eq!(outcome, PrepareOutcome::NoBaseline);

    // Caller falls back to a fresh build
    match monitor.prepare(BaselineSource::Build).unwrap() {
        PrepareOutcome::Built { files } => assert_eq!(files, 1),
        other => panic!("expected Built, got {:?}", other),
    }
}

#[test]
fn test_resume_with_corrupt_baseline_falls_back() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    let baseline_file = state.path().join("baseline.json");
    fs::write(&baseline_file, "][ definitely not json").unwrap();

    let store = BaselineStore::new(&baseline_file);
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3));

    let outcome = monitor.prepare(BaselineSource::Resume).unwrap();
    assert_eq!(outcome, PrepareOutcome::NoBaseline);
}

#[test]
fn test_resume_round_trips_a_previous_session() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    let baseline_file = state.path().join("baseline.json");
    fs::write(watched.path().join("a.txt"), "hello").unwrap();
    fs::write(watched.path().join("b.txt"), "world").unwrap();

    // First session builds
    let hasher = FileHasher::new(RetryPolicy::immediate(3));
    let mut store = BaselineStore::new(&baseline_file);
    BaselineBuilder::new(&hasher)
        .build(watched.path(), &mut store)
        .unwrap();
    let first: Baseline = store.baseline().clone();

    // Second session resumes
    let store = BaselineStore::new(&baseline_file);
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3));
    match monitor.prepare(BaselineSource::Resume).unwrap() {
        PrepareOutcome::Resumed { entries } => assert_eq!(entries, 2),
        other => panic!("expected Resumed, got {:?}", other),
    }
    assert_eq!(monitor.baseline(), &first);
}

#[test]
fn test_failing_sink_does_not_abort_monitoring() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");
    let baseline_file = state.path().join("baseline.json");

    let store = BaselineStore::new(&baseline_file);
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3))
        .with_poll_timeout(Duration::from_millis(50));
    monitor.prepare(BaselineSource::Build).unwrap();

    let handle = monitor.handle();
    let runner = thread::spawn(move || {
        let mut sink = FailingSink;
        let res = monitor.run(&mut sink);
        (res, monitor)
    });

    thread::sleep(Duration::from_millis(300));

    let first = watched.path().join("one.txt");
    let second = watched.path().join("two.txt");
    fs::write(&first, "1").unwrap();
    fs::write(&second, "2").unwrap();

    // The sink rejects every event, but classification and persistence
    // keep going: both files must reach the durable baseline
    assert!(wait_for(|| {
        let mut reopened = BaselineStore::new(&baseline_file);
        reopened.load().is_ok()
            && reopened.baseline().contains(&first)
            && reopened.baseline().contains(&second)
    }));

    handle.stop();
    let (res, _) = runner.join().expect("Monitor thread panicked");
    res.expect("Monitor should stop cleanly despite the broken sink");
}

#[test]
fn test_stop_is_idempotent() {
    let watched = TempDir::new().expect("Failed to create temp dir");
    let state = TempDir::new().expect("Failed to create temp dir");

    let store = BaselineStore::new(state.path().join("baseline.json"));
    let mut monitor = Monitor::new(watched.path(), store, RetryPolicy::immediate(3))
        .with_poll_timeout(Duration::from_millis(50));
    monitor.prepare(BaselineSource::Build).unwrap();

    let handle = monitor.handle();
    let runner = thread::spawn(move || {
        let mut sink = CollectingSink::default();
        let res = monitor.run(&mut sink);
        (res, monitor)
    });

    handle.stop();
    handle.stop();

    let (res, monitor) = runner.join().expect("Monitor thread panicked");
    res.expect("Monitor should stop cleanly");
    assert_eq!(monitor.state(), MonitorState::Stopped);
}

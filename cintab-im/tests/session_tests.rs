//! End-to-end tests for the scheme session manager: discovery, loading,
//! switching, preloading, and error recovery.

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use cintab_im::config::Settings;
use cintab_im::scheme::registry::{SchemeMetadata, SchemeRegistry};
use cintab_im::scheme::session::{SchemeSessionManager, SessionState};
use cintab_im::scheme::source::{DirTableSource, MemoryTableSource, TableSource};

const CANGJIE_MINI: &str = "\
%ename Cangjie
%cname 倉頡
%chardef begin
a 日
aa 昌
aaa 晶
%chardef end
";

const DAYI_MINI: &str = "\
%ename Dayi
%cname 大易
%chardef begin
b 月
bb 朋
%chardef end
";

fn test_registry() -> SchemeRegistry {
    SchemeRegistry::new(vec![
        SchemeMetadata::new("cangjie", "倉頡", Some("cangjie.cin"), 0),
        SchemeMetadata::new("dayi", "大易", Some("dayi.cin"), 1),
        SchemeMetadata::new("english", "英文", None, 2),
    ])
}

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.schemes.enabled = vec!["cangjie".into(), "dayi".into(), "english".into()];
    settings.schemes.order = vec!["cangjie".into(), "dayi".into(), "english".into()];
    settings.schemes.preferred = "cangjie".into();
    settings
}

fn two_scheme_source() -> MemoryTableSource {
    MemoryTableSource::new()
        .with("cangjie.cin", CANGJIE_MINI.as_bytes())
        .with("dayi.cin", DAYI_MINI.as_bytes())
}

fn watch(manager: &SchemeSessionManager) -> Receiver<SessionState> {
    let (tx, rx) = mpsc::channel();
    manager.state().subscribe(move |state: &SessionState| {
        let _ = tx.send(state.clone());
    });
    rx
}

fn wait_until(rx: &Receiver<SessionState>, pred: impl Fn(&SessionState) -> bool) -> SessionState {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .expect("timed out waiting for session state");
        let state = rx
            .recv_timeout(remaining)
            .expect("timed out waiting for session state");
        if pred(&state) {
            return state;
        }
    }
}

fn wait_ready(rx: &Receiver<SessionState>, scheme: &str) -> SessionState {
    wait_until(rx, |s| s.is_ready() && s.scheme() == scheme)
}

#[test]
fn test_loads_preferred_scheme_and_composes() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &test_settings());
    let rx = watch(&manager);

    let state = wait_ready(&rx, "cangjie");
    match state {
        SessionState::Ready { table, .. } => assert_eq!(table.english_name(), "Cangjie"),
        other => panic!("expected Ready, got {other:?}"),
    }

    assert!(manager.process_key('a'));
    assert!(manager.process_key('a'));
    assert_eq!(manager.current_code(), "aa");
    assert_eq!(manager.current_candidates(), vec!['昌']);
    assert_eq!(manager.commit(), Some("昌".to_string()));
    assert!(!manager.has_input());
}

#[test]
fn test_engine_inert_before_ready_and_for_no_table_scheme() {
    let mut settings = test_settings();
    settings.schemes.preferred = "english".into();
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &settings);
    let rx = watch(&manager);

    let state = wait_until(&rx, |s| matches!(s, SessionState::ReadyNoTable { .. }));
    assert_eq!(state.scheme(), "english");

    // Keystrokes pass through: nothing is consumed, nothing composes
    assert!(!manager.process_key('a'));
    assert_eq!(manager.commit(), None);
    assert!(manager.current_table().is_none());
}

#[test]
fn test_switch_to_next_cycles_through_available() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &test_settings());
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");

    manager.switch_to_next();
    wait_ready(&rx, "dayi");
    assert_eq!(manager.current_scheme_id(), "dayi");
    assert!(manager.process_key('b'));
    assert_eq!(manager.current_candidates(), vec!['月']);

    manager.switch_to_next();
    wait_ready(&rx, "english");

    // Wraps back around
    manager.switch_to_next();
    wait_ready(&rx, "cangjie");
}

#[test]
fn test_switch_to_unknown_or_current_is_noop() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &test_settings());
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");
    let version = manager.state().version();

    manager.switch_to("cangjie");
    manager.switch_to("no-such-scheme");
    assert_eq!(manager.state().version(), version);
    assert_eq!(manager.current_scheme_id(), "cangjie");
}

#[test]
fn test_switch_clears_previous_composition() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &test_settings());
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");

    manager.process_key('a');
    assert!(manager.has_input());

    manager.switch_to("dayi");
    wait_ready(&rx, "dayi");
    assert!(!manager.has_input());
    assert_eq!(manager.current_code(), "");
}

#[test]
fn test_other_schemes_preloaded_in_background() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(two_scheme_source()), &test_settings());
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");

    // The worker preloads dayi after the active scheme is ready
    let deadline = Instant::now() + Duration::from_secs(5);
    while !manager.is_cached("dayi") {
        assert!(Instant::now() < deadline, "dayi never preloaded");
        std::thread::sleep(Duration::from_millis(10));
    }

    // A warm switch publishes Ready synchronously, with no Loading
    manager.switch_to("dayi");
    match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
        SessionState::Ready { scheme, .. } => assert_eq!(scheme, "dayi"),
        other => panic!("expected warm Ready, got {other:?}"),
    }
}

#[test]
fn test_unavailable_scheme_excluded_from_discovery() {
    let source = MemoryTableSource::new().with("cangjie.cin", CANGJIE_MINI.as_bytes());
    let manager = SchemeSessionManager::new(test_registry(), Box::new(source), &test_settings());

    let ids: Vec<String> = manager
        .available_schemes()
        .into_iter()
        .map(|m| m.id)
        .collect();
    // dayi.cin is missing, english needs no table
    assert_eq!(ids, vec!["cangjie".to_string(), "english".to_string()]);
}

#[test]
fn test_preferred_unavailable_falls_back_to_first() {
    let source = MemoryTableSource::new().with("dayi.cin", DAYI_MINI.as_bytes());
    let mut settings = test_settings();
    settings.schemes.preferred = "cangjie".into();

    let manager = SchemeSessionManager::new(test_registry(), Box::new(source), &settings);
    let rx = watch(&manager);
    wait_ready(&rx, "dayi");
    assert_eq!(manager.current_scheme_id(), "dayi");
}

#[test]
fn test_bad_table_publishes_error_with_hint() {
    let source = MemoryTableSource::new()
        .with("cangjie.cin", b"%keyname begin\na x\n%keyname end\n".as_slice())
        .with("dayi.cin", DAYI_MINI.as_bytes());
    let manager = SchemeSessionManager::new(test_registry(), Box::new(source), &test_settings());
    let rx = watch(&manager);

    let state = wait_until(&rx, |s| matches!(s, SessionState::Error { .. }));
    match state {
        SessionState::Error { scheme, message } => {
            assert_eq!(scheme, "cangjie");
            assert!(message.contains("no character definitions"));
            assert!(message.contains("%chardef"));
        }
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(!manager.has_input());
    assert!(!manager.process_key('a'));
}

#[test]
fn test_retry_after_fixing_source_recovers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dayi.cin"), DAYI_MINI).unwrap();

    let manager = SchemeSessionManager::new(
        test_registry(),
        Box::new(DirTableSource::new(dir.path())),
        &test_settings(),
    );
    let rx = watch(&manager);

    // cangjie.cin does not exist yet: discovery drops it, so force the
    // issue by starting from dayi and checking read-failure handling on
    // a scheme that disappears later
    wait_ready(&rx, "dayi");

    std::fs::write(dir.path().join("dayi.cin"), b"\n\n").unwrap();
    manager.clear_cache();
    manager.retry();
    let state = wait_until(&rx, |s| matches!(s, SessionState::Error { .. }));
    match &state {
        SessionState::Error { message, .. } => assert!(message.contains("empty")),
        other => panic!("expected Error, got {other:?}"),
    }

    // Fix the file and retry: the session re-reads the source
    std::fs::write(dir.path().join("dayi.cin"), DAYI_MINI).unwrap();
    manager.retry();
    wait_ready(&rx, "dayi");
    assert!(manager.process_key('b'));
}

#[test]
fn test_missing_file_read_error_mentions_source() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cangjie.cin"), CANGJIE_MINI).unwrap();

    let manager = SchemeSessionManager::new(
        test_registry(),
        Box::new(DirTableSource::new(dir.path())),
        &test_settings(),
    );
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");

    // The file vanishes between discovery and a later cold switch
    std::fs::remove_file(dir.path().join("cangjie.cin")).unwrap();
    manager.clear_cache();
    manager.retry();

    let state = wait_until(&rx, |s| matches!(s, SessionState::Error { .. }));
    match state {
        SessionState::Error { message, .. } => {
            assert!(message.contains("failed to read table file"));
            assert!(message.contains("exists and is readable"));
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn test_empty_catalog_source_falls_back_to_first_catalog_entry() {
    let source = MemoryTableSource::new();
    let manager = SchemeSessionManager::new(test_registry(), Box::new(source), &test_settings());

    let ids: Vec<String> = manager
        .available_schemes()
        .into_iter()
        .map(|m| m.id)
        .collect();
    // No table is readable, but english needs none and is enabled
    assert_eq!(ids, vec!["english".to_string()]);
}

// Verify the source trait object seam: availability checks drive
// discovery, reads happen lazily per load.
#[test]
fn test_dir_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cangjie.cin"), CANGJIE_MINI).unwrap();
    std::fs::write(dir.path().join("dayi.cin"), DAYI_MINI).unwrap();

    let manager = SchemeSessionManager::new(
        test_registry(),
        Box::new(DirTableSource::new(dir.path())),
        &test_settings(),
    );
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");

    manager.process_key('a');
    manager.process_key('a');
    manager.process_key('a');
    assert_eq!(manager.commit(), Some("晶".to_string()));
}

// TableSource is object-safe and callers can bring their own
struct SingleTableSource;

impl TableSource for SingleTableSource {
    fn available(&self, file_name: &str) -> bool {
        file_name == "cangjie.cin"
    }

    fn read(&self, file_name: &str) -> std::io::Result<Vec<u8>> {
        if file_name == "cangjie.cin" {
            Ok(CANGJIE_MINI.as_bytes().to_vec())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such table",
            ))
        }
    }
}

#[test]
fn test_custom_source_implementation() {
    let manager =
        SchemeSessionManager::new(test_registry(), Box::new(SingleTableSource), &test_settings());
    let rx = watch(&manager);
    wait_ready(&rx, "cangjie");
    assert!(manager.process_key('a'));
}

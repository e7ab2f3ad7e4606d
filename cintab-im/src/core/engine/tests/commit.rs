use super::*;

#[test]
fn test_commit_first_candidate() {
    let mut engine = make_engine();
    engine.process_key('a');
    engine.process_key('a');

    assert_eq!(engine.commit(), Some("昌".to_string()));
    assert!(!engine.has_input());
    assert!(!engine.has_candidates());
}

#[test]
fn test_commit_without_selection_takes_first() {
    let mut engine = make_engine();
    engine.process_key('a');
    engine.process_key('b');

    // Three candidates, none selected: the first one commits
    assert_eq!(engine.commit(), Some("明".to_string()));
}

#[test]
fn test_commit_unmatched_code_degrades_to_literal() {
    let mut engine = make_engine();
    engine.process_key('x');
    engine.process_key('y');
    engine.process_key('z');

    assert_eq!(engine.commit(), Some("xyz".to_string()));
    assert!(!engine.has_input());
}

#[test]
fn test_commit_on_empty_state() {
    let mut engine = make_engine();
    assert_eq!(engine.commit(), None);
    // Still none the second time
    assert_eq!(engine.commit(), None);
}

#[test]
fn test_commit_after_backspace_to_empty() {
    let mut engine = make_engine();
    engine.process_key('a');
    engine.backspace();
    assert_eq!(engine.commit(), None);
}

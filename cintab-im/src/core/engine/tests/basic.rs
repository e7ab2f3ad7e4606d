use super::*;

#[test]
fn test_process_key_accumulates_code() {
    let mut engine = make_engine();

    assert!(engine.process_key('a'));
    assert_eq!(engine.current_code(), "a");
    assert_eq!(engine.current_candidates(), &['日']);

    assert!(engine.process_key('a'));
    assert_eq!(engine.current_code(), "aa");
    assert_eq!(engine.current_candidates(), &['昌']);

    assert!(engine.process_key('a'));
    assert_eq!(engine.current_code(), "aaa");
    assert_eq!(engine.current_candidates(), &['晶']);
}

#[test]
fn test_invalid_key_rejected_without_state_change() {
    let mut engine = make_engine();
    engine.process_key('a');

    assert!(!engine.process_key('1'));
    assert!(!engine.process_key(' '));
    assert!(!engine.process_key('中'));
    assert_eq!(engine.current_code(), "a");
}

#[test]
fn test_uppercase_key_lowercased() {
    let mut engine = make_engine();
    assert!(engine.process_key('A'));
    assert_eq!(engine.current_code(), "a");
    assert_eq!(engine.current_candidates(), &['日']);
}

#[test]
fn test_keyname_section_restricts_valid_keys() {
    let mut engine = make_keyname_engine();

    assert!(engine.process_key('a'));
    assert!(engine.process_key('b'));
    // 'c' is an ASCII letter but not in the keyname map
    assert!(!engine.process_key('c'));
    assert_eq!(engine.current_code(), "ab");
}

#[test]
fn test_unmatched_code_has_no_candidates() {
    let mut engine = make_engine();
    engine.process_key('x');
    engine.process_key('y');

    assert!(engine.has_input());
    assert!(!engine.has_candidates());
    assert_eq!(engine.first_candidate(), None);
}

#[test]
fn test_backspace_recomputes_candidates() {
    let mut engine = make_engine();
    engine.process_key('a');
    engine.process_key('a');
    assert_eq!(engine.current_candidates(), &['昌']);

    assert!(engine.backspace());
    assert_eq!(engine.current_code(), "a");
    assert_eq!(engine.current_candidates(), &['日']);

    assert!(engine.backspace());
    assert!(!engine.has_input());
    assert!(!engine.has_candidates());
}

#[test]
fn test_backspace_on_empty_buffer() {
    let mut engine = make_engine();
    assert!(!engine.backspace());

    engine.process_key('a');
    assert!(engine.backspace());
    assert!(!engine.backspace());
}

#[test]
fn test_multiple_candidates_in_table_order() {
    let mut engine = make_engine();
    engine.process_key('a');
    engine.process_key('b');
    assert_eq!(engine.current_candidates(), &['明', '朙', '萌']);
    assert_eq!(engine.first_candidate(), Some('明'));
}

#[test]
fn test_clear_is_idempotent() {
    let mut engine = make_engine();
    engine.process_key('a');

    engine.clear();
    assert!(!engine.has_input());
    assert!(!engine.has_candidates());

    engine.clear();
    assert!(!engine.has_input());
    assert!(!engine.has_candidates());
}

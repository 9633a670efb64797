//! Unit tests for SourceRange and LineMap

use core_types::{ErrorKind, JsError, LineMap, SourceRange};

#[test]
fn test_range_basics() {
    let range = SourceRange::new(2, 6);
    assert_eq!(range.len(), 4);
    assert!(!range.is_empty());
    assert!(SourceRange::at(9).is_empty());
    assert_eq!(SourceRange::new(1, 2).to(SourceRange::new(5, 8)), SourceRange::new(1, 8));
}

#[test]
fn test_positions_across_line_terminators() {
    let map = LineMap::new("one\r\ntwo\nthree\u{2028}four");
    assert_eq!(map.line_count(), 4);

    let pos = map.position(5);
    assert_eq!((pos.line, pos.column), (2, 1));
    let pos = map.position(11);
    assert_eq!((pos.line, pos.column), (3, 3));
    assert_eq!(map.line_text(3), "three");
    assert_eq!(map.line_text(4), "four");
}

#[test]
fn test_position_past_end_is_clamped() {
    let map = LineMap::new("ab");
    let pos = map.position(100);
    assert_eq!((pos.line, pos.column, pos.offset), (1, 3, 2));
}

#[test]
fn test_render_single_line() {
    let map = LineMap::new("let x = ;");
    let error = JsError::new(ErrorKind::SyntaxError, "Unexpected token ;", Some(SourceRange::new(8, 9)));
    assert_eq!(
        map.render(&error),
        "Line 1:9-10: SyntaxError: Unexpected token ;\nlet x = ;\n        ^"
    );
}

#[test]
fn test_render_wide_range() {
    let map = LineMap::new("x = 'open");
    let error = JsError::new(ErrorKind::LexicalError, "Unterminated string", Some(SourceRange::new(4, 9)));
    assert!(map.render(&error).ends_with("\n    ~~~~^"));
}

#[test]
fn test_render_without_range() {
    let map = LineMap::new("x");
    assert_eq!(map.render(&JsError::internal("boom")), "InternalError: boom");
}

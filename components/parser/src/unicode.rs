//! Character classification used by the lexer and the printer.
//!
//! Approximates Unicode ID_Start/ID_Continue with the standard library's
//! alphabetic/alphanumeric properties plus the ECMAScript extras.

/// Can `ch` start an identifier?
pub fn is_id_start(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphabetic() || ch == '_' || ch == '$';
    }
    ch.is_alphabetic() || is_other_id_start(ch)
}

/// Can `ch` continue an identifier?
pub fn is_id_continue(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphanumeric() || ch == '_' || ch == '$';
    }
    ch.is_alphanumeric()
        || is_other_id_start(ch)
        || is_combining_mark(ch)
        || matches!(ch, '\u{200C}' | '\u{200D}' | '\u{00B7}' | '\u{0387}' | '\u{203F}' | '\u{2040}')
}

// Other_ID_Start
fn is_other_id_start(ch: char) -> bool {
    matches!(ch, '\u{2118}' | '\u{212E}' | '\u{309B}' | '\u{309C}')
}

// Mn/Mc blocks that commonly appear in identifiers
fn is_combining_mark(ch: char) -> bool {
    matches!(ch,
        '\u{0300}'..='\u{036F}'
            | '\u{0483}'..='\u{0487}'
            | '\u{0591}'..='\u{05BD}'
            | '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0900}'..='\u{0903}'
            | '\u{093A}'..='\u{094F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// WhiteSpace (not including line terminators)
pub fn is_space(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// LineTerminator
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// True if `name` is a syntactically valid IdentifierName
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_id_start(first) => chars.all(is_id_continue),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identifier_chars() {
        assert!(is_id_start('$'));
        assert!(is_id_start('_'));
        assert!(!is_id_start('1'));
        assert!(is_id_continue('1'));
        assert!(!is_id_continue('-'));
    }

    #[test]
    fn test_unicode_identifier_chars() {
        assert!(is_id_start('é'));
        assert!(is_id_start('℘'));
        assert!(is_id_continue('\u{200D}'));
        assert!(!is_id_start('\u{200D}'));
    }

    #[test]
    fn test_identifier_name() {
        assert!(is_identifier_name("foo$1"));
        assert!(!is_identifier_name("1foo"));
        assert!(!is_identifier_name(""));
        assert!(!is_identifier_name("a-b"));
    }

    #[test]
    fn test_space_and_terminators() {
        assert!(is_space('\u{00A0}'));
        assert!(!is_space('\n'));
        assert!(is_line_terminator('\u{2028}'));
    }
}

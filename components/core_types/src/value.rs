//! Compile-time constant values.
//!
//! Constant folding only ever sees primitives, so this model has no object
//! variants. Conversions follow the language's abstract operations
//! (ToNumber, ToString, ToBoolean, ToInt32) exactly, since a folded result
//! must match what the program would have computed at run time.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive constant.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert!(!Value::Undefined.is_truthy());
/// assert!(Value::String("0".to_string()).is_truthy());
/// assert_eq!(Value::Null.type_of(), "object");
/// assert_eq!(Value::Number(0.5).to_string(), "0.5");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// true or false
    Boolean(bool),
    /// IEEE 754 double
    Number(f64),
    /// String value
    String(String),
}

impl Value {
    /// ToBoolean
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// ToNumber
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
        }
    }

    /// ToInt32
    pub fn to_int32(&self) -> i32 {
        self.to_uint32() as i32
    }

    /// ToUint32
    pub fn to_uint32(&self) -> u32 {
        let n = self.to_number();
        if !n.is_finite() || n == 0.0 {
            return 0;
        }
        n.trunc().rem_euclid(4_294_967_296.0) as u32
    }

    /// The `+` operator on primitives
    pub fn add(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", self, other))
            }
            _ => Value::Number(self.to_number() + other.to_number()),
        }
    }

    /// Strict equality (`===`)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => self == other,
        }
    }

    /// Abstract equality (`==`) restricted to primitives
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(_), Value::String(_)) => {
                self.strict_equals(&Value::Number(other.to_number()))
            }
            (Value::String(_), Value::Number(_)) => {
                Value::Number(self.to_number()).strict_equals(other)
            }
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Boolean(_)) => self.loose_equals(&Value::Number(other.to_number())),
            _ => self.strict_equals(other),
        }
    }

    /// Abstract relational comparison `self < other`.
    ///
    /// `None` stands for the undefined outcome produced by NaN operands.
    pub fn less_than(&self, other: &Value) -> Option<bool> {
        if let (Value::String(a), Value::String(b)) = (self, other) {
            return Some(a.encode_utf16().cmp(b.encode_utf16()) == Ordering::Less);
        }
        let (a, b) = (self.to_number(), other.to_number());
        if a.is_nan() || b.is_nan() {
            None
        } else {
            Some(a < b)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => f.write_str(s),
        }
    }
}

fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// ToNumber applied to a string
fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut value = 0.0;
        for c in digits.chars() {
            match c.to_digit(radix) {
                Some(d) => value = value * radix as f64 + d as f64,
                None => return f64::NAN,
            }
        }
        return value;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number::toString(10).
///
/// Uses the shortest round-tripping digit string and applies the
/// fixed/exponential layout rules of the language.
///
/// # Examples
///
/// ```
/// use core_types::number_to_string;
///
/// assert_eq!(number_to_string(100.0), "100");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(0.000001), "0.000001");
/// assert_eq!(number_to_string(1e-7), "1e-7");
/// assert_eq!(number_to_string(-1.5), "-1.5");
/// ```
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    let formatted = format!("{:e}", n);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if point - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (point - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (point - 1).abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn test_is_truthy_basic() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!s("").is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
    }

    #[test]
    fn test_to_number_strings() {
        assert_eq!(s("  42 ").to_number(), 42.0);
        assert_eq!(s("0x1F").to_number(), 31.0);
        assert_eq!(s("").to_number(), 0.0);
        assert!(s("12px").to_number().is_nan());
        assert!(s("inf").to_number().is_nan());
        assert_eq!(s("-Infinity").to_number(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(Value::Number(4294967296.0 + 5.0).to_int32(), 5);
        assert_eq!(Value::Number(2147483648.0).to_int32(), -2147483648);
        assert_eq!(Value::Number(-1.0).to_uint32(), 4294967295);
        assert_eq!(Value::Number(f64::INFINITY).to_int32(), 0);
    }

    #[test]
    fn test_add_concatenates_with_strings() {
        assert_eq!(s("a").add(&s("b")), s("ab"));
        assert_eq!(Value::Number(1.0).add(&Value::Boolean(true)), Value::Number(2.0));
        assert_eq!(Value::Null.add(&s("x")), s("nullx"));
    }

    #[test]
    fn test_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(s("1").loose_equals(&Value::Number(1.0)));
        assert!(Value::Boolean(true).loose_equals(&s("1")));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(!Value::Null.loose_equals(&Value::Number(0.0)));
    }

    #[test]
    fn test_less_than() {
        assert_eq!(s("a").less_than(&s("b")), Some(true));
        assert_eq!(s("10").less_than(&s("9")), Some(true));
        assert_eq!(s("10").less_than(&Value::Number(9.0)), Some(false));
        assert_eq!(Value::Undefined.less_than(&Value::Number(1.0)), None);
    }

    #[test]
    fn test_number_to_string_layouts() {
        assert_eq!(number_to_string(123.456), "123.456");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(123e20), "1.23e+22");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(5e-7), "5e-7");
        assert_eq!(number_to_string(1.5e-10), "1.5e-10");
        assert_eq!(number_to_string(-0.0), "0");
    }
}

//! Unit tests for the constant Value model

use core_types::{number_to_string, Value};

fn s(text: &str) -> Value {
    Value::String(text.to_string())
}

#[cfg(test)]
mod truthiness_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(-0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!s("").is_truthy());
    }

    #[test]
    fn test_truthy_values() {
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(s("false").is_truthy());
        assert!(s("0").is_truthy());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Boolean(true).type_of(), "boolean");
        assert_eq!(Value::Number(1.0).type_of(), "number");
        assert_eq!(s("x").type_of(), "string");
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_to_number() {
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
        assert_eq!(s("  42  ").to_number(), 42.0);
        assert_eq!(s("").to_number(), 0.0);
        assert_eq!(s("0x1F").to_number(), 31.0);
        assert_eq!(s("0b101").to_number(), 5.0);
        assert_eq!(s("-Infinity").to_number(), f64::NEG_INFINITY);
        assert!(s("12px").to_number().is_nan());
        assert!(s("0x").to_number().is_nan());
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(Value::Number(4294967296.0).to_int32(), 0);
        assert_eq!(Value::Number(2147483648.0).to_int32(), -2147483648);
        assert_eq!(Value::Number(-1.5).to_int32(), -1);
        assert_eq!(Value::Number(f64::NAN).to_int32(), 0);
        assert_eq!(Value::Number(-1.0).to_uint32(), 4294967295);
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(123456789.0), "123456789");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_matches_to_string() {
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(s("text").to_string(), "text");
    }
}

#[cfg(test)]
mod operator_tests {
    use super::*;

    #[test]
    fn test_add_numbers_and_strings() {
        assert_eq!(Value::Number(1.0).add(&Value::Number(2.0)), Value::Number(3.0));
        assert_eq!(s("a").add(&Value::Number(1.0)), s("a1"));
        assert_eq!(Value::Null.add(&s("x")), s("nullx"));
        assert_eq!(Value::Boolean(true).add(&Value::Boolean(true)), Value::Number(2.0));
    }

    #[test]
    fn test_strict_equality() {
        assert!(Value::Number(0.0).strict_equals(&Value::Number(-0.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(!Value::Number(1.0).strict_equals(&s("1")));
        assert!(Value::Null.strict_equals(&Value::Null));
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.loose_equals(&Value::Number(0.0)));
        assert!(Value::Number(1.0).loose_equals(&s("1")));
        assert!(Value::Boolean(true).loose_equals(&s("1")));
        assert!(s("").loose_equals(&Value::Number(0.0)));
    }

    #[test]
    fn test_less_than() {
        assert_eq!(Value::Number(1.0).less_than(&Value::Number(2.0)), Some(true));
        assert_eq!(s("b").less_than(&s("a")), Some(false));
        assert_eq!(s("10").less_than(&s("9")), Some(true));
        assert_eq!(s("10").less_than(&Value::Number(9.0)), Some(false));
        assert_eq!(Value::Undefined.less_than(&Value::Number(1.0)), None);
    }
}

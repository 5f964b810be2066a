//! Built-in operator overloads.
//!
//! Registration order matters: selection is first-match, and booleans are
//! accepted in integer slots, so boolean-specific overloads must come before
//! their integer counterparts to be reachable.

use anyhow::{anyhow, bail};

use crate::value::{format_float, Value, ValueType};

use super::operator::Operator;
use super::registry::DispatchRegistry;

use crate::value::ValueKind::{Boolean as B, Float as F, Integer as I, Record as R, String as S};

/// Register every built-in overload.
pub(crate) fn register_all(registry: &mut DispatchRegistry) {
    register_arithmetic(registry);
    register_comparisons(registry);
    register_conversions(registry);
}

fn register_arithmetic(r: &mut DispatchRegistry) {
    r.register(Operator::Add, [S, S], ValueType::String, |args| {
        let (a, b) = strings(args)?;
        Ok(Value::String(format!("{}{}", a, b)))
    });
    r.register(Operator::Add, [I, I], ValueType::Integer, |args| {
        let (a, b) = ints(args)?;
        a.checked_add(b)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in {} + {}", a, b))
    });
    for params in [[I, F], [F, I], [F, F]] {
        r.register(Operator::Add, params, ValueType::Float, |args| {
            let (a, b) = floats(args)?;
            Ok(Value::Float(a + b))
        });
    }

    r.register(Operator::Subtract, [I, I], ValueType::Integer, |args| {
        let (a, b) = ints(args)?;
        a.checked_sub(b)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in {} - {}", a, b))
    });
    for params in [[I, F], [F, I], [F, F]] {
        r.register(Operator::Subtract, params, ValueType::Float, |args| {
            let (a, b) = floats(args)?;
            Ok(Value::Float(a - b))
        });
    }

    r.register(Operator::Multiply, [S, I], ValueType::String, |args| {
        let (text, count) = (arg(args, 0)?, arg(args, 1)?);
        repeat(text, count)
    });
    r.register(Operator::Multiply, [I, S], ValueType::String, |args| {
        let (count, text) = (arg(args, 0)?, arg(args, 1)?);
        repeat(text, count)
    });
    r.register(Operator::Multiply, [I, I], ValueType::Integer, |args| {
        let (a, b) = ints(args)?;
        a.checked_mul(b)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in {} * {}", a, b))
    });
    for params in [[I, F], [F, I], [F, F]] {
        r.register(Operator::Multiply, params, ValueType::Float, |args| {
            let (a, b) = floats(args)?;
            Ok(Value::Float(a * b))
        });
    }

    for params in [[I, I], [I, F], [F, I], [F, F]] {
        r.register(Operator::Divide, params, ValueType::Float, |args| {
            let (a, b) = floats(args)?;
            if b == 0.0 {
                bail!("division by zero");
            }
            Ok(Value::Float(a / b))
        });
    }

    r.register(Operator::FloorDivide, [I, I], ValueType::Integer, |args| {
        let (a, b) = ints(args)?;
        if b == 0 {
            bail!("division by zero");
        }
        floor_div(a, b)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in {} // {}", a, b))
    });
    for params in [[I, F], [F, I], [F, F]] {
        r.register(Operator::FloorDivide, params, ValueType::Float, |args| {
            let (a, b) = floats(args)?;
            if b == 0.0 {
                bail!("division by zero");
            }
            Ok(Value::Float((a / b).floor()))
        });
    }
}

fn register_comparisons(r: &mut DispatchRegistry) {
    let pairs = [[S, S], [I, I], [I, F], [F, I], [F, F], [R, R]];
    for params in pairs {
        r.register(Operator::Equal, params, ValueType::Boolean, |args| {
            Ok(Value::Boolean(arg(args, 0)?.loosely_equals(arg(args, 1)?)))
        });
    }
    for params in pairs {
        r.register(Operator::NotEqual, params, ValueType::Boolean, |args| {
            Ok(Value::Boolean(!arg(args, 0)?.loosely_equals(arg(args, 1)?)))
        });
    }

    r.register(Operator::Contains, [S, S], ValueType::Boolean, |args| {
        let (haystack, needle) = strings(args)?;
        Ok(Value::Boolean(haystack.contains(needle)))
    });
}

fn register_conversions(r: &mut DispatchRegistry) {
    r.register(Operator::Length, [S], ValueType::Integer, |args| {
        let text = string(arg(args, 0)?)?;
        Ok(Value::Integer(text.chars().count() as i64))
    });
    r.register(Operator::Length, [R], ValueType::Integer, |args| {
        let record = arg(args, 0)?
            .as_record()
            .ok_or_else(|| anyhow!("expected a record"))?;
        Ok(Value::Integer(record.len() as i64))
    });

    for params in [[S], [B], [I], [F]] {
        r.register(Operator::ToString, params, ValueType::String, |args| {
            Ok(Value::String(match arg(args, 0)? {
                Value::Float(f) => format_float(*f),
                other => other.to_string(),
            }))
        });
    }

    r.register(Operator::ToInt, [S], ValueType::Integer, |args| {
        let text = string(arg(args, 0)?)?;
        text.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| anyhow!("cannot convert {:?} to an integer: {}", text, e))
    });
    r.register(Operator::ToInt, [I], ValueType::Integer, |args| {
        let value = arg(args, 0)?;
        value
            .as_int()
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("expected an integer, found {}", value.kind()))
    });
    r.register(Operator::ToInt, [F], ValueType::Integer, |args| {
        let f = float(arg(args, 0)?)?;
        if !f.is_finite() || f.trunc() > i64::MAX as f64 || f.trunc() < i64::MIN as f64 {
            bail!("cannot convert {} to an integer", f);
        }
        Ok(Value::Integer(f.trunc() as i64))
    });

    r.register(Operator::ToFloat, [S], ValueType::Float, |args| {
        let text = string(arg(args, 0)?)?;
        text.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| anyhow!("cannot convert {:?} to a float: {}", text, e))
    });
    for params in [[I], [F]] {
        r.register(Operator::ToFloat, params, ValueType::Float, |args| {
            Ok(Value::Float(float(arg(args, 0)?)?))
        });
    }
}

fn arg(args: &[Value], index: usize) -> anyhow::Result<&Value> {
    args.get(index)
        .ok_or_else(|| anyhow!("missing operand {}", index))
}

fn string(value: &Value) -> anyhow::Result<&str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("expected a string, found {}", value.kind()))
}

fn float(value: &Value) -> anyhow::Result<f64> {
    value
        .as_float()
        .ok_or_else(|| anyhow!("expected a number, found {}", value.kind()))
}

fn strings(args: &[Value]) -> anyhow::Result<(&str, &str)> {
    Ok((string(arg(args, 0)?)?, string(arg(args, 1)?)?))
}

fn ints(args: &[Value]) -> anyhow::Result<(i64, i64)> {
    let int = |v: &Value| {
        v.as_int()
            .ok_or_else(|| anyhow!("expected an integer, found {}", v.kind()))
    };
    Ok((int(arg(args, 0)?)?, int(arg(args, 1)?)?))
}

fn floats(args: &[Value]) -> anyhow::Result<(f64, f64)> {
    Ok((float(arg(args, 0)?)?, float(arg(args, 1)?)?))
}

fn repeat(text: &Value, count: &Value) -> anyhow::Result<Value> {
    let text = string(text)?;
    let count = count
        .as_int()
        .ok_or_else(|| anyhow!("expected an integer count, found {}", count.kind()))?;
    let times = usize::try_from(count.max(0))
        .map_err(|_| anyhow!("repeat count {} is too large", count))?;
    let total = text
        .len()
        .checked_mul(times)
        .filter(|&n| isize::try_from(n).is_ok());
    if total.is_none() {
        bail!("repeating {} bytes {} times overflows", text.len(), count);
    }
    Ok(Value::String(text.repeat(times)))
}

/// Integer division rounding toward negative infinity. `None` on overflow or a zero divisor.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a.checked_rem(b)?;
    if r != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    fn call(op: Operator, args: &[Value]) -> anyhow::Result<Value> {
        let registry = DispatchRegistry::with_builtins();
        let types: Vec<ValueType> = args.iter().map(Value::value_type).collect();
        let overload = registry.select(op, &types).expect("overload should exist");
        overload.call(args)
    }

    #[test]
    fn add_concatenates_strings() {
        let v = call(Operator::Add, &["Hello, ".into(), "world".into()]).unwrap();
        assert_eq!(v, Value::from("Hello, world"));
    }

    #[test]
    fn add_mixes_int_and_float() {
        assert_eq!(
            call(Operator::Add, &[1.into(), 2.5.into()]).unwrap(),
            Value::Float(3.5)
        );
        assert_eq!(
            call(Operator::Add, &[true.into(), 2.into()]).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn multiply_repeats_strings() {
        assert_eq!(
            call(Operator::Multiply, &["ab".into(), 3.into()]).unwrap(),
            Value::from("ababab")
        );
        assert_eq!(
            call(Operator::Multiply, &[2.into(), "xy".into()]).unwrap(),
            Value::from("xyxy")
        );
    }

    #[test]
    fn divide_always_returns_float() {
        assert_eq!(
            call(Operator::Divide, &[7.into(), 2.into()]).unwrap(),
            Value::Float(3.5)
        );
        assert!(call(Operator::Divide, &[1.into(), 0.into()]).is_err());
    }

    #[test]
    fn floor_divide_rounds_down() {
        assert_eq!(
            call(Operator::FloorDivide, &[7.into(), 2.into()]).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            call(Operator::FloorDivide, &[(-7).into(), 2.into()]).unwrap(),
            Value::Integer(-4)
        );
        assert_eq!(
            call(Operator::FloorDivide, &[7.5.into(), 2.into()]).unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn equality_compares_across_numeric_kinds() {
        assert_eq!(
            call(Operator::Equal, &[1.into(), 1.0.into()]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            call(Operator::NotEqual, &["Stark".into(), "Lannister".into()]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn equality_on_records() {
        let a = Value::from(Record::positional([1.into(), 2.into()]));
        let b = Value::from(Record::positional([1.into(), 2.into()]));
        let c = Value::from(Record::positional([1.into()]));
        assert_eq!(
            call(Operator::Equal, &[a.clone(), b]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            call(Operator::Equal, &[a, c]).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn contains_checks_substrings() {
        assert_eq!(
            call(Operator::Contains, &["Lannister".into(), "nist".into()]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn length_of_strings_and_records() {
        assert_eq!(
            call(Operator::Length, &["Stark".into()]).unwrap(),
            Value::Integer(5)
        );
        let record = Value::from(Record::new().with("a", 1).with("b", 2));
        assert_eq!(
            call(Operator::Length, &[record]).unwrap(),
            Value::Integer(2)
        );
    }

    #[test]
    fn to_string_keeps_boolean_text() {
        assert_eq!(
            call(Operator::ToString, &[true.into()]).unwrap(),
            Value::from("true")
        );
        assert_eq!(
            call(Operator::ToString, &[2.0.into()]).unwrap(),
            Value::from("2.0")
        );
    }

    #[test]
    fn conversions_parse_and_truncate() {
        assert_eq!(
            call(Operator::ToInt, &[" 42 ".into()]).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            call(Operator::ToInt, &[(-2.7).into()]).unwrap(),
            Value::Integer(-2)
        );
        assert!(call(Operator::ToInt, &["forty".into()]).is_err());
        assert_eq!(
            call(Operator::ToFloat, &["1.5".into()]).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            call(Operator::ToFloat, &[3.into()]).unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn floor_div_matches_floor_semantics() {
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(-8, 2), Some(-4));
        assert_eq!(floor_div(6, 3), Some(2));
        assert_eq!(floor_div(1, 0), None);
    }

    #[test]
    fn floor_divide_overflow_is_an_error() {
        let err = call(Operator::FloorDivide, &[i64::MIN.into(), (-1).into()])
            .unwrap_err();
        assert!(err.to_string().contains("overflow"));
        assert_eq!(
            call(Operator::FloorDivide, &[i64::MIN.into(), 1.into()]).unwrap(),
            Value::Integer(i64::MIN)
        );
    }

    #[test]
    fn extreme_integer_operands_do_not_panic() {
        assert!(call(Operator::Add, &[i64::MAX.into(), 1.into()]).is_err());
        assert!(call(Operator::Subtract, &[i64::MIN.into(), 1.into()]).is_err());
        assert!(call(Operator::Multiply, &[i64::MIN.into(), (-1).into()]).is_err());
    }

    #[test]
    fn huge_repeat_count_is_an_error() {
        assert!(call(Operator::Multiply, &["ab".into(), i64::MAX.into()]).is_err());
        assert!(call(Operator::Multiply, &[i64::MAX.into(), "xy".into()]).is_err());
        assert_eq!(
            call(Operator::Multiply, &["ab".into(), (-3).into()]).unwrap(),
            Value::from("")
        );
    }
}

//! 叶子规则编译器
//!
//! 把一个 `(字段, 操作符, 值)` 三元组编译为单字段谓词闭包。
//! 分派是封闭的：操作符族选择闭包构造器，比较类型选择比较例程。
//!
//! 空值策略（类 SQL）：字段缺失时肯定型操作符求值为 false，
//! 否定型操作符（NotEqual / NotInList / NotInRange / DoesNotContain）求值为 true。

use crate::catalog::{self, ComparisonType, Field};
use crate::error::{Result, ValidationError};
use crate::models::Rule;
use crate::operators::Operator;
use crate::predicate::CompiledPredicate;
use crate::record::FieldRef;
use crate::value::{self, Scalar, Value};
use std::cmp::Ordering;

/// 编译叶子规则
///
/// 1. 操作符不在 `allowed(field)` 内时返回 `ValidationError`
/// 2. 解析规则值，传播 `ParseError` / `StructuralError`
/// 3. 按操作符族构造闭包
pub fn compile_leaf(rule: &Rule) -> Result<CompiledPredicate> {
    if !catalog::is_allowed(rule.field, rule.operator) {
        return Err(ValidationError {
            field: rule.field,
            operator: rule.operator,
        }
        .into());
    }

    let value = value::parse(rule.field, rule.operator, &rule.value)?;
    Ok(build(rule.field, rule.operator, value))
}

fn build(field: Field, operator: Operator, value: Value) -> CompiledPredicate {
    let ty = catalog::type_of(field);
    let cmp = move |actual: FieldRef<'_>, expected: &Scalar| compare(field, ty, actual, expected);

    match (operator, value) {
        (Operator::Equal, Value::Scalar(e)) => when_present(field, move |v| cmp(v, &e).is_eq()),
        (Operator::NotEqual, Value::Scalar(e)) => {
            unless_present(field, move |v| cmp(v, &e).is_eq())
        }
        (Operator::GreaterThan, Value::Scalar(e)) => {
            when_present(field, move |v| cmp(v, &e).is_gt())
        }
        (Operator::GreaterThanOrEqual, Value::Scalar(e)) => {
            when_present(field, move |v| cmp(v, &e).is_ge())
        }
        (Operator::LessThan, Value::Scalar(e)) => when_present(field, move |v| cmp(v, &e).is_lt()),
        (Operator::LessThanOrEqual, Value::Scalar(e)) => {
            when_present(field, move |v| cmp(v, &e).is_le())
        }
        (Operator::InList, Value::List(items)) => {
            when_present(field, move |v| items.iter().any(|i| cmp(v, i).is_eq()))
        }
        (Operator::NotInList, Value::List(items)) => {
            unless_present(field, move |v| items.iter().any(|i| cmp(v, i).is_eq()))
        }
        (Operator::InRange, Value::Range { low, high }) => when_present(field, move |v| {
            cmp(v, &low).is_ge() && cmp(v, &high).is_le()
        }),
        (Operator::NotInRange, Value::Range { low, high }) => unless_present(field, move |v| {
            cmp(v, &low).is_ge() && cmp(v, &high).is_le()
        }),
        (Operator::Contains, Value::Scalar(Scalar::Text(needle))) => {
            when_present(field, move |v| text(field, v).contains(needle.as_str()))
        }
        (Operator::DoesNotContain, Value::Scalar(Scalar::Text(needle))) => {
            unless_present(field, move |v| text(field, v).contains(needle.as_str()))
        }
        (operator, value) => unreachable!("值解析器为 {} {} 产出了 {:?}", field, operator, value),
    }
}

/// 肯定型：字段缺失为 false
fn when_present<F>(field: Field, test: F) -> CompiledPredicate
where
    F: Fn(FieldRef<'_>) -> bool + Send + Sync + 'static,
{
    CompiledPredicate::new(move |r| r.value(field).is_some_and(|v| test(v)))
}

/// 否定型：字段缺失为 true，否则为 `!test`
fn unless_present<F>(field: Field, test: F) -> CompiledPredicate
where
    F: Fn(FieldRef<'_>) -> bool + Send + Sync + 'static,
{
    CompiledPredicate::new(move |r| r.value(field).is_none_or(|v| !test(v)))
}

/// 按比较类型分派的全序比较
///
/// 记录值种类与字段比较类型不一致属于记录源违反契约，直接 panic。
fn compare(field: Field, ty: ComparisonType, actual: FieldRef<'_>, expected: &Scalar) -> Ordering {
    match (ty, actual, expected) {
        (ComparisonType::String | ComparisonType::Code, FieldRef::Text(a), Scalar::Text(b)) => {
            a.cmp(b.as_str())
        }
        (ComparisonType::Integer, FieldRef::Integer(a), Scalar::Integer(b)) => a.cmp(b),
        (ComparisonType::Decimal, FieldRef::Decimal(a), Scalar::Decimal(b)) => a.cmp(b),
        (ComparisonType::Date, FieldRef::Date(a), Scalar::Date(b)) => a.cmp(b),
        (ComparisonType::Boolean, FieldRef::Boolean(a), Scalar::Boolean(b)) => a.cmp(b),
        (ty, actual, _) => panic!(
            "记录源为字段 {} 返回了 {} 值，字段比较类型为 {}",
            field,
            actual.kind(),
            ty
        ),
    }
}

fn text<'a>(field: Field, actual: FieldRef<'a>) -> &'a str {
    match actual {
        FieldRef::Text(s) => s,
        other => panic!("记录源为字符串字段 {} 返回了 {} 值", field, other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::BTreeMap;

    type MapRecord = BTreeMap<Field, Scalar>;

    fn record(entries: &[(Field, Scalar)]) -> MapRecord {
        entries.iter().cloned().collect()
    }

    fn turnover(v: i64) -> MapRecord {
        record(&[(Field::Turnover, Scalar::Decimal(Decimal::from(v)))])
    }

    fn region(code: &str) -> MapRecord {
        record(&[(Field::Region, Scalar::Text(code.into()))])
    }

    fn leaf(field: Field, operator: Operator, value: serde_json::Value) -> CompiledPredicate {
        compile_leaf(&Rule::new(field, operator, value)).unwrap()
    }

    #[test]
    fn test_illegal_operator_is_validation_error() {
        for field in Field::ALL {
            for operator in Operator::ALL {
                if catalog::is_allowed(field, operator) {
                    continue;
                }
                let err = compile_leaf(&Rule::new(field, operator, json!("1"))).unwrap_err();
                assert_eq!(
                    err,
                    CompileError::Validation(ValidationError { field, operator }),
                    "{} {}",
                    field,
                    operator
                );
            }
        }
    }

    #[test]
    fn test_validation_precedes_parsing() {
        // 值无法解析，但操作符非法先被拒绝
        let err = compile_leaf(&Rule::new(Field::UnitType, Operator::Contains, json!(null)))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = compile_leaf(&Rule::new(Field::Turnover, Operator::GreaterThan, json!("many")))
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_equality() {
        let eq = leaf(Field::Name, Operator::Equal, json!("Acme"));
        let ne = leaf(Field::Name, Operator::NotEqual, json!("Acme"));
        let acme = record(&[(Field::Name, Scalar::Text("Acme".into()))]);
        let other = record(&[(Field::Name, Scalar::Text("Acme Ltd".into()))]);

        assert!(eq.matches(&acme));
        assert!(!eq.matches(&other));
        assert!(!ne.matches(&acme));
        assert!(ne.matches(&other));
    }

    #[test]
    fn test_ordering() {
        let gt = leaf(Field::Turnover, Operator::GreaterThan, json!(1000));
        let ge = leaf(Field::Turnover, Operator::GreaterThanOrEqual, json!(1000));
        let lt = leaf(Field::Turnover, Operator::LessThan, json!(1000));
        let le = leaf(Field::Turnover, Operator::LessThanOrEqual, json!(1000));

        assert!(gt.matches(&turnover(1001)));
        assert!(!gt.matches(&turnover(1000)));
        assert!(ge.matches(&turnover(1000)));
        assert!(!ge.matches(&turnover(999)));
        assert!(lt.matches(&turnover(999)));
        assert!(!lt.matches(&turnover(1000)));
        assert!(le.matches(&turnover(1000)));
        assert!(!le.matches(&turnover(1001)));
    }

    #[test]
    fn test_in_range_inclusive() {
        let p = leaf(Field::Turnover, Operator::InRange, json!([100, 200]));
        assert!(p.matches(&turnover(150)));
        assert!(!p.matches(&turnover(99)));
        assert!(p.matches(&turnover(200)));
        assert!(p.matches(&turnover(100)));
        assert!(!p.matches(&turnover(201)));
    }

    #[test]
    fn test_not_in_range() {
        let p = leaf(Field::Turnover, Operator::NotInRange, json!("100\u{2014}200"));
        assert!(!p.matches(&turnover(150)));
        assert!(!p.matches(&turnover(100)));
        assert!(p.matches(&turnover(99)));
        assert!(p.matches(&turnover(201)));
        assert!(p.matches(&MapRecord::new()));
    }

    #[test]
    fn test_not_in_list() {
        let p = leaf(Field::Region, Operator::NotInList, json!(["10", "20", "30"]));
        assert!(p.matches(&region("15")));
        assert!(!p.matches(&region("20")));
        assert!(p.matches(&MapRecord::new()));
    }

    #[test]
    fn test_in_list() {
        let p = leaf(Field::Region, Operator::InList, json!("10,20,30"));
        assert!(p.matches(&region("30")));
        assert!(!p.matches(&region("15")));
        assert!(!p.matches(&MapRecord::new()));
    }

    #[test]
    fn test_contains() {
        let p = leaf(Field::Name, Operator::Contains, json!("Bank"));
        let q = leaf(Field::Name, Operator::DoesNotContain, json!("Bank"));
        let bank = record(&[(Field::Name, Scalar::Text("First Bank of X".into()))]);
        let shop = record(&[(Field::Name, Scalar::Text("Corner Shop".into()))]);

        assert!(p.matches(&bank));
        assert!(!p.matches(&shop));
        assert!(!q.matches(&bank));
        assert!(q.matches(&shop));
    }

    #[test]
    fn test_null_policy() {
        let empty = MapRecord::new();
        let cases = [
            (Field::Name, Operator::Equal, json!("x"), false),
            (Field::Name, Operator::NotEqual, json!("x"), true),
            (Field::Turnover, Operator::GreaterThan, json!(1), false),
            (Field::Turnover, Operator::GreaterThanOrEqual, json!(1), false),
            (Field::Turnover, Operator::LessThan, json!(1), false),
            (Field::Turnover, Operator::LessThanOrEqual, json!(1), false),
            (Field::Region, Operator::InList, json!(["1"]), false),
            (Field::Region, Operator::NotInList, json!(["1"]), true),
            (Field::Employees, Operator::InRange, json!([1, 2]), false),
            (Field::Employees, Operator::NotInRange, json!([1, 2]), true),
            (Field::Name, Operator::Contains, json!("x"), false),
            (Field::Name, Operator::DoesNotContain, json!("x"), true),
        ];

        for (field, operator, value, expected) in cases {
            assert_eq!(
                leaf(field, operator, value).matches(&empty),
                expected,
                "{} {} on missing field",
                field,
                operator
            );
            assert_eq!(operator.is_negative(), expected);
        }
    }

    #[test]
    fn test_dates_and_booleans() {
        let after = leaf(Field::RegistrationDate, Operator::GreaterThan, json!("2020-01-01"));
        let d = |y, m, day| {
            record(&[(
                Field::RegistrationDate,
                Scalar::Date(NaiveDate::from_ymd_opt(y, m, day).unwrap()),
            )])
        };
        assert!(after.matches(&d(2020, 1, 2)));
        assert!(!after.matches(&d(2020, 1, 1)));

        let fez = leaf(Field::FreeEconZone, Operator::Equal, json!("1"));
        assert!(fez.matches(&record(&[(Field::FreeEconZone, Scalar::Boolean(true))])));
        assert!(!fez.matches(&record(&[(Field::FreeEconZone, Scalar::Boolean(false))])));
    }

    #[test]
    #[should_panic(expected = "Turnover")]
    fn test_kind_mismatch_panics() {
        let p = leaf(Field::Turnover, Operator::Equal, json!(5));
        p.matches(&record(&[(Field::Turnover, Scalar::Text("5".into()))]));
    }
}

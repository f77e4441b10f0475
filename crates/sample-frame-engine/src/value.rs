//! 规则值解析器
//!
//! 将持久化的原始 JSON 值按字段比较类型和操作符形态转换为强类型比较值。
//! 纯函数，无副作用。

use crate::catalog::{self, ComparisonType, Field};
use crate::error::{CompileError, ParseError, Result, StructuralError};
use crate::operators::{Operator, ValueShape};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 持久化规则中的原始值
pub type RawValue = serde_json::Value;

/// 列表字符串分隔符
pub const LIST_SEPARATOR: char = ',';

/// 区间字符串分隔符（长破折号）
pub const RANGE_SEPARATOR: char = '\u{2014}';

/// 强类型标量
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// 字符串或分类代码
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Boolean(bool),
}

impl Scalar {
    /// 同类型标量的全序比较，类型不同时返回 None
    pub fn cmp_same(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// 解析后的规则值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Range { low: Scalar, high: Scalar },
}

/// 按 `type_of(field)` 与操作符形态解析原始值
///
/// 无法转换时返回 `ParseError`；列表或区间载荷为空时返回 `StructuralError`。
pub fn parse(field: Field, operator: Operator, raw: &RawValue) -> Result<Value> {
    let ty = catalog::type_of(field);
    let coercer = Coercer {
        field,
        operator,
        ty,
    };

    match operator.shape() {
        ValueShape::Scalar => coercer.scalar_from_json(raw).map(Value::Scalar),
        ValueShape::List => coercer.list(raw),
        ValueShape::Range => coercer.range(raw),
    }
}

struct Coercer {
    field: Field,
    operator: Operator,
    ty: ComparisonType,
}

impl Coercer {
    fn error(&self, raw: impl Into<String>, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.field, self.operator, raw, reason)
    }

    fn empty(&self) -> StructuralError {
        StructuralError::EmptyPayload {
            field: self.field,
            operator: self.operator,
        }
    }

    fn list(&self, raw: &RawValue) -> Result<Value> {
        let items = match raw {
            RawValue::Array(items) => items
                .iter()
                .map(|item| self.scalar_from_json(item))
                .collect::<Result<Vec<_>>>()?,
            RawValue::String(s) => {
                if s.trim().is_empty() {
                    return Err(self.empty().into());
                }
                s.split(LIST_SEPARATOR)
                    .map(|part| self.scalar_from_text(part.trim()))
                    .collect::<Result<Vec<_>>>()?
            }
            other => {
                return Err(self.error(raw_text(other), "需要数组或逗号分隔的字符串").into());
            }
        };

        if items.is_empty() {
            return Err(self.empty().into());
        }

        Ok(Value::List(items))
    }

    fn range(&self, raw: &RawValue) -> Result<Value> {
        let (low, high) = match raw {
            RawValue::Array(items) => {
                if items.is_empty() {
                    return Err(self.empty().into());
                }
                if items.len() != 2 {
                    return Err(self
                        .error(
                            raw_text(raw),
                            format!("区间需要 [low, high] 两个元素，当前有 {} 个", items.len()),
                        )
                        .into());
                }
                (
                    self.scalar_from_json(&items[0])?,
                    self.scalar_from_json(&items[1])?,
                )
            }
            RawValue::String(s) => {
                if s.trim().is_empty() {
                    return Err(self.empty().into());
                }
                let parts: Vec<&str> = s.split(RANGE_SEPARATOR).collect();
                if parts.len() != 2 {
                    return Err(self
                        .error(s.as_str(), format!("区间需要 low{}high 格式", RANGE_SEPARATOR))
                        .into());
                }
                (
                    self.scalar_from_text(parts[0].trim())?,
                    self.scalar_from_text(parts[1].trim())?,
                )
            }
            other => {
                return Err(self.error(raw_text(other), "需要 [low, high] 数组").into());
            }
        };

        if low.cmp_same(&high) == Some(Ordering::Greater) {
            return Err(self
                .error(raw_text(raw), format!("区间下界 {} 大于上界 {}", low, high))
                .into());
        }

        Ok(Value::Range { low, high })
    }

    fn scalar_from_json(&self, raw: &RawValue) -> Result<Scalar> {
        match raw {
            RawValue::String(s) => self.scalar_from_text(s),
            RawValue::Number(n) => match self.ty {
                ComparisonType::Integer => n
                    .as_i64()
                    .map(Scalar::Integer)
                    .ok_or_else(|| CompileError::from(self.error(n.to_string(), "不是整数"))),
                ComparisonType::Boolean => match n.as_i64() {
                    Some(0) => Ok(Scalar::Boolean(false)),
                    Some(1) => Ok(Scalar::Boolean(true)),
                    _ => Err(self.error(n.to_string(), "布尔值只接受 0 或 1").into()),
                },
                ComparisonType::Date => Err(self.error(n.to_string(), "日期必须是字符串").into()),
                _ => self.scalar_from_text(&n.to_string()),
            },
            RawValue::Bool(b) => match self.ty {
                ComparisonType::Boolean => Ok(Scalar::Boolean(*b)),
                _ => Err(self.error(b.to_string(), format!("{} 字段不接受布尔值", self.ty)).into()),
            },
            RawValue::Null => Err(self.error("null", "值不能为空").into()),
            RawValue::Array(_) | RawValue::Object(_) => Err(self
                .error(raw_text(raw), format!("{} 需要标量值", self.operator))
                .into()),
        }
    }

    fn scalar_from_text(&self, text: &str) -> Result<Scalar> {
        let scalar = match self.ty {
            ComparisonType::String => Scalar::Text(text.to_string()),
            ComparisonType::Code => {
                let code = text.trim();
                if code.is_empty() {
                    return Err(self.error(text, "代码不能为空").into());
                }
                Scalar::Text(code.to_string())
            }
            ComparisonType::Integer => text
                .trim()
                .parse::<i64>()
                .map(Scalar::Integer)
                .map_err(|e| self.error(text, e.to_string()))?,
            ComparisonType::Decimal => {
                let t = text.trim();
                Decimal::from_str(t)
                    .or_else(|_| Decimal::from_scientific(t))
                    .map(Scalar::Decimal)
                    .map_err(|e| self.error(text, e.to_string()))?
            }
            ComparisonType::Date => parse_date(text.trim())
                .map(Scalar::Date)
                .ok_or_else(|| self.error(text, "日期需要 YYYY-MM-DD 或 RFC 3339 格式"))?,
            ComparisonType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Scalar::Boolean(true),
                "false" | "0" => Scalar::Boolean(false),
                _ => return Err(self.error(text, "无法解析布尔值").into()),
            },
        };
        Ok(scalar)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn raw_text(raw: &RawValue) -> String {
    match raw {
        RawValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_scalar() {
        let v = parse(Field::Turnover, Operator::GreaterThan, &json!(1000)).unwrap();
        assert_eq!(v, Value::Scalar(Scalar::Decimal(Decimal::from(1000))));

        let v = parse(Field::Turnover, Operator::Equal, &json!("1500.50")).unwrap();
        assert_eq!(v, Value::Scalar(Scalar::Decimal(Decimal::new(150050, 2))));
    }

    #[test]
    fn test_non_numeric_decimal_fails() {
        let err = parse(Field::Turnover, Operator::Equal, &json!("lots")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let err = parse(Field::Employees, Operator::Equal, &json!(1.5)).unwrap_err();
        assert!(err.is_parse());
        let v = parse(Field::Employees, Operator::Equal, &json!(" 12 ")).unwrap();
        assert_eq!(v, Value::Scalar(Scalar::Integer(12)));
    }

    #[test]
    fn test_list_from_array_and_string() {
        let expected = Value::List(vec![
            Scalar::Text("10".into()),
            Scalar::Text("20".into()),
            Scalar::Text("30".into()),
        ]);
        assert_eq!(
            parse(Field::Region, Operator::InList, &json!(["10", "20", "30"])).unwrap(),
            expected
        );
        assert_eq!(
            parse(Field::Region, Operator::InList, &json!("10, 20,30")).unwrap(),
            expected
        );
        // 数字代码按文本处理
        assert_eq!(
            parse(Field::Region, Operator::InList, &json!([10, 20, 30])).unwrap(),
            expected
        );
    }

    #[test]
    fn test_empty_list_is_structural() {
        let err = parse(Field::Region, Operator::InList, &json!([])).unwrap_err();
        assert!(err.is_structural());
        let err = parse(Field::Region, Operator::NotInList, &json!("  ")).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_list_with_blank_code_fails() {
        let err = parse(Field::Region, Operator::InList, &json!("10,,20")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_range_from_array_and_string() {
        let expected = Value::Range {
            low: Scalar::Decimal(Decimal::from(100)),
            high: Scalar::Decimal(Decimal::from(200)),
        };
        assert_eq!(
            parse(Field::Turnover, Operator::InRange, &json!([100, 200])).unwrap(),
            expected
        );
        assert_eq!(
            parse(Field::Turnover, Operator::InRange, &json!("100\u{2014}200")).unwrap(),
            expected
        );
    }

    #[test]
    fn test_range_arity() {
        let err = parse(Field::Turnover, Operator::InRange, &json!([100])).unwrap_err();
        assert!(err.is_parse());
        let err = parse(Field::Turnover, Operator::InRange, &json!([1, 2, 3])).unwrap_err();
        assert!(err.is_parse());
        let err = parse(Field::Turnover, Operator::NotInRange, &json!([])).unwrap_err();
        assert!(err.is_structural());
        let err = parse(Field::Turnover, Operator::InRange, &json!(100)).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_inverted_range_fails() {
        let err = parse(Field::Employees, Operator::InRange, &json!([200, 100])).unwrap_err();
        match err {
            CompileError::Parse(e) => assert!(e.reason.contains("大于")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dates() {
        let v = parse(Field::RegistrationDate, Operator::GreaterThan, &json!("2020-01-31")).unwrap();
        assert_eq!(
            v,
            Value::Scalar(Scalar::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()))
        );
        let v = parse(
            Field::StatusDate,
            Operator::Equal,
            &json!("2021-06-01T10:00:00Z"),
        )
        .unwrap();
        assert_eq!(
            v,
            Value::Scalar(Scalar::Date(NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()))
        );
        assert!(parse(Field::StatusDate, Operator::Equal, &json!("01/06/2021")).is_err());
    }

    #[test]
    fn test_boolean_forms() {
        for (raw, expected) in [
            (json!(true), true),
            (json!("0"), false),
            (json!(1), true),
            (json!("False"), false),
        ] {
            assert_eq!(
                parse(Field::FreeEconZone, Operator::Equal, &raw).unwrap(),
                Value::Scalar(Scalar::Boolean(expected))
            );
        }
        assert!(parse(Field::FreeEconZone, Operator::Equal, &json!(2)).is_err());
        assert!(parse(Field::Name, Operator::Equal, &json!(true)).is_err());
    }

    #[test]
    fn test_null_and_array_for_scalar() {
        assert!(parse(Field::Name, Operator::Equal, &json!(null)).unwrap_err().is_parse());
        assert!(
            parse(Field::Name, Operator::Contains, &json!(["a"]))
                .unwrap_err()
                .is_parse()
        );
    }

    #[test]
    fn test_parse_error_mentions_field() {
        let err = parse(Field::Turnover, Operator::LessThan, &json!("abc")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Turnover"));
        assert!(msg.contains("abc"));
    }
}

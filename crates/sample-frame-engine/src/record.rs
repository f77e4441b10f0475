//! 记录视图
//!
//! 编译后的谓词只通过 `Record` 读取字段值，不关心记录如何存储或流式提供。

use crate::catalog::Field;
use crate::value::Scalar;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 记录中某个字段的只读值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Boolean(bool),
}

impl FieldRef<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for FieldRef<'_> {
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

impl Scalar {
    pub fn as_field_ref(&self) -> FieldRef<'_> {
        match self {
            Self::Text(s) => FieldRef::Text(s),
            Self::Integer(i) => FieldRef::Integer(*i),
            Self::Decimal(d) => FieldRef::Decimal(*d),
            Self::Date(d) => FieldRef::Date(*d),
            Self::Boolean(b) => FieldRef::Boolean(*b),
        }
    }
}

/// 外部记录源提供的只读记录
///
/// 字段缺失或为 null 时返回 `None`。返回值的种类必须与字段的比较类型一致，
/// 否则求值时会 panic。
pub trait Record {
    fn value(&self, field: Field) -> Option<FieldRef<'_>>;

    /// 投影输出用的文本值，缺失时为空串
    fn display(&self, field: Field) -> String {
        self.value(field).map(|v| v.to_string()).unwrap_or_default()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn value(&self, field: Field) -> Option<FieldRef<'_>> {
        (**self).value(field)
    }
}

impl Record for BTreeMap<Field, Scalar> {
    fn value(&self, field: Field) -> Option<FieldRef<'_>> {
        self.get(&field).map(Scalar::as_field_ref)
    }
}

impl Record for HashMap<Field, Scalar> {
    fn value(&self, field: Field) -> Option<FieldRef<'_>> {
        self.get(&field).map(Scalar::as_field_ref)
    }
}

/// 统计单位记录（法人单位、地方单位、企业、企业集团）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatUnit {
    pub unit_type: Option<String>,
    pub region: Option<String>,
    pub main_activity: Option<String>,
    pub unit_status_id: Option<i64>,
    pub turnover: Option<Decimal>,
    pub turnover_year: Option<i64>,
    pub employees: Option<i64>,
    pub employees_year: Option<i64>,
    pub free_econ_zone: Option<bool>,
    pub foreign_participation_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub reg_id: Option<i64>,
    pub name: Option<String>,
    pub stat_id: Option<String>,
    pub tax_reg_id: Option<String>,
    pub external_id: Option<String>,
    pub short_name: Option<String>,
    pub telephone_no: Option<String>,
    pub address: Option<i64>,
    pub email_address: Option<String>,
    pub contact_person: Option<String>,
    pub legal_form_id: Option<i64>,
    pub inst_sector_code_id: Option<i64>,
    pub registration_date: Option<NaiveDate>,
    pub status_date: Option<NaiveDate>,
}

fn text(v: &Option<String>) -> Option<FieldRef<'_>> {
    v.as_deref().map(FieldRef::Text)
}

fn int(v: Option<i64>) -> Option<FieldRef<'static>> {
    v.map(FieldRef::Integer)
}

impl Record for StatUnit {
    fn value(&self, field: Field) -> Option<FieldRef<'_>> {
        match field {
            Field::UnitType => text(&self.unit_type),
            Field::Region => text(&self.region),
            Field::MainActivity => text(&self.main_activity),
            Field::UnitStatusId => int(self.unit_status_id),
            Field::Turnover => self.turnover.map(FieldRef::Decimal),
            Field::TurnoverYear => int(self.turnover_year),
            Field::Employees => int(self.employees),
            Field::EmployeesYear => int(self.employees_year),
            Field::FreeEconZone => self.free_econ_zone.map(FieldRef::Boolean),
            Field::ForeignParticipationId => int(self.foreign_participation_id),
            Field::ParentId => int(self.parent_id),
            Field::RegId => int(self.reg_id),
            Field::Name => text(&self.name),
            Field::StatId => text(&self.stat_id),
            Field::TaxRegId => text(&self.tax_reg_id),
            Field::ExternalId => text(&self.external_id),
            Field::ShortName => text(&self.short_name),
            Field::TelephoneNo => text(&self.telephone_no),
            Field::Address => int(self.address),
            Field::EmailAddress => text(&self.email_address),
            Field::ContactPerson => text(&self.contact_person),
            Field::LegalFormId => int(self.legal_form_id),
            Field::InstSectorCodeId => int(self.inst_sector_code_id),
            Field::RegistrationDate => self.registration_date.map(FieldRef::Date),
            Field::StatusDate => self.status_date.map(FieldRef::Date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, ComparisonType};
    use serde_json::json;

    fn kind_matches(ty: ComparisonType, v: FieldRef<'_>) -> bool {
        matches!(
            (ty, v),
            (ComparisonType::String | ComparisonType::Code, FieldRef::Text(_))
                | (ComparisonType::Integer, FieldRef::Integer(_))
                | (ComparisonType::Decimal, FieldRef::Decimal(_))
                | (ComparisonType::Date, FieldRef::Date(_))
                | (ComparisonType::Boolean, FieldRef::Boolean(_))
        )
    }

    #[test]
    fn test_stat_unit_deserialize() {
        let unit: StatUnit = serde_json::from_value(json!({
            "unitType": "LegalUnit",
            "region": "41711",
            "turnover": "1500.75",
            "employees": 12,
            "name": "Acme",
            "freeEconZone": true,
            "registrationDate": "2019-03-01"
        }))
        .unwrap();

        assert_eq!(unit.value(Field::Name), Some(FieldRef::Text("Acme")));
        assert_eq!(unit.value(Field::Employees), Some(FieldRef::Integer(12)));
        assert_eq!(unit.value(Field::FreeEconZone), Some(FieldRef::Boolean(true)));
        assert_eq!(unit.value(Field::StatId), None);
        assert_eq!(unit.display(Field::Turnover), "1500.75");
        assert_eq!(unit.display(Field::RegistrationDate), "2019-03-01");
        assert_eq!(unit.display(Field::TaxRegId), "");
    }

    #[test]
    fn test_stat_unit_kinds_match_catalog() {
        let unit = StatUnit {
            unit_type: Some("LocalUnit".into()),
            region: Some("10".into()),
            main_activity: Some("A01".into()),
            unit_status_id: Some(1),
            turnover: Some(Decimal::from(10)),
            turnover_year: Some(2020),
            employees: Some(3),
            employees_year: Some(2020),
            free_econ_zone: Some(false),
            foreign_participation_id: Some(2),
            parent_id: Some(7),
            reg_id: Some(8),
            name: Some("n".into()),
            stat_id: Some("s".into()),
            tax_reg_id: Some("t".into()),
            external_id: Some("e".into()),
            short_name: Some("sn".into()),
            telephone_no: Some("555".into()),
            address: Some(4),
            email_address: Some("a@b.c".into()),
            contact_person: Some("p".into()),
            legal_form_id: Some(5),
            inst_sector_code_id: Some(6),
            registration_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            status_date: NaiveDate::from_ymd_opt(2021, 1, 1),
        };

        for field in Field::ALL {
            let v = unit.value(field).unwrap_or_else(|| panic!("{} 缺失", field));
            assert!(
                kind_matches(catalog::type_of(field), v),
                "{} 返回了 {}",
                field,
                v.kind()
            );
        }
    }

    #[test]
    fn test_map_record() {
        let mut map = BTreeMap::new();
        map.insert(Field::Region, Scalar::Text("10".into()));
        assert_eq!(map.value(Field::Region), Some(FieldRef::Text("10")));
        assert_eq!((&map).value(Field::Name), None);
    }
}

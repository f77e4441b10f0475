//! 字段/操作符目录
//!
//! 可过滤字段的静态注册表：每个字段的合法操作符集合及其比较类型。
//! 目录带版本号，已持久化的规则树中合法的 (字段, 操作符) 组合在后续版本中必须保持合法。

use crate::operators::{Operator, ValueShape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 目录版本
pub const CATALOG_VERSION: u32 = 1;

/// 字段的比较类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    String,
    Integer,
    Decimal,
    Date,
    /// 分类代码（单位类型、地区、主要经济活动），按代码精确比较
    Code,
    Boolean,
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Code => "code",
            Self::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// 统计单位的可过滤字段
///
/// 反序列化时既接受字段名（`"Turnover"`），也接受稳定的数字代码（`5`）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "FieldId")]
pub enum Field {
    UnitType,
    Region,
    MainActivity,
    UnitStatusId,
    Turnover,
    TurnoverYear,
    Employees,
    EmployeesYear,
    FreeEconZone,
    ForeignParticipationId,
    ParentId,
    RegId,
    Name,
    StatId,
    TaxRegId,
    ExternalId,
    ShortName,
    TelephoneNo,
    Address,
    EmailAddress,
    ContactPerson,
    LegalFormId,
    InstSectorCodeId,
    RegistrationDate,
    StatusDate,
}

const EQUALITY_AND_LIST: &[Operator] = &[
    Operator::Equal,
    Operator::NotEqual,
    Operator::InList,
    Operator::NotInList,
];

const NUMERIC: &[Operator] = &[
    Operator::Equal,
    Operator::NotEqual,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::InList,
    Operator::NotInList,
    Operator::InRange,
    Operator::NotInRange,
];

const TEXT: &[Operator] = &[
    Operator::Equal,
    Operator::NotEqual,
    Operator::InList,
    Operator::NotInList,
    Operator::Contains,
    Operator::DoesNotContain,
];

const TEMPORAL: &[Operator] = &[
    Operator::Equal,
    Operator::NotEqual,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::InRange,
    Operator::NotInRange,
];

const FLAG: &[Operator] = &[Operator::Equal, Operator::NotEqual];

impl Field {
    pub const ALL: [Field; 25] = [
        Self::UnitType,
        Self::Region,
        Self::MainActivity,
        Self::UnitStatusId,
        Self::Turnover,
        Self::TurnoverYear,
        Self::Employees,
        Self::EmployeesYear,
        Self::FreeEconZone,
        Self::ForeignParticipationId,
        Self::ParentId,
        Self::RegId,
        Self::Name,
        Self::StatId,
        Self::TaxRegId,
        Self::ExternalId,
        Self::ShortName,
        Self::TelephoneNo,
        Self::Address,
        Self::EmailAddress,
        Self::ContactPerson,
        Self::LegalFormId,
        Self::InstSectorCodeId,
        Self::RegistrationDate,
        Self::StatusDate,
    ];

    /// 持久化用的稳定数字代码
    pub fn code(self) -> u16 {
        match self {
            Self::UnitType => 1,
            Self::Region => 2,
            Self::MainActivity => 3,
            Self::UnitStatusId => 4,
            Self::Turnover => 5,
            Self::TurnoverYear => 6,
            Self::Employees => 7,
            Self::EmployeesYear => 8,
            Self::FreeEconZone => 9,
            Self::ForeignParticipationId => 10,
            Self::ParentId => 11,
            Self::RegId => 12,
            Self::Name => 13,
            Self::StatId => 14,
            Self::TaxRegId => 15,
            Self::ExternalId => 16,
            Self::ShortName => 17,
            Self::TelephoneNo => 18,
            Self::Address => 19,
            Self::EmailAddress => 20,
            Self::ContactPerson => 21,
            Self::LegalFormId => 22,
            Self::InstSectorCodeId => 23,
            Self::RegistrationDate => 31,
            Self::StatusDate => 32,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UnitType => "UnitType",
            Self::Region => "Region",
            Self::MainActivity => "MainActivity",
            Self::UnitStatusId => "UnitStatusId",
            Self::Turnover => "Turnover",
            Self::TurnoverYear => "TurnoverYear",
            Self::Employees => "Employees",
            Self::EmployeesYear => "EmployeesYear",
            Self::FreeEconZone => "FreeEconZone",
            Self::ForeignParticipationId => "ForeignParticipationId",
            Self::ParentId => "ParentId",
            Self::RegId => "RegId",
            Self::Name => "Name",
            Self::StatId => "StatId",
            Self::TaxRegId => "TaxRegId",
            Self::ExternalId => "ExternalId",
            Self::ShortName => "ShortName",
            Self::TelephoneNo => "TelephoneNo",
            Self::Address => "Address",
            Self::EmailAddress => "EmailAddress",
            Self::ContactPerson => "ContactPerson",
            Self::LegalFormId => "LegalFormId",
            Self::InstSectorCodeId => "InstSectorCodeId",
            Self::RegistrationDate => "RegistrationDate",
            Self::StatusDate => "StatusDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 持久化形式：字段名或数字代码
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldId {
    Code(u16),
    Name(String),
}

impl TryFrom<FieldId> for Field {
    type Error = String;

    fn try_from(id: FieldId) -> Result<Self, Self::Error> {
        match id {
            FieldId::Code(code) => {
                Field::from_code(code).ok_or_else(|| format!("未知字段代码: {}", code))
            }
            FieldId::Name(name) => {
                Field::from_name(&name).ok_or_else(|| format!("未知字段: {}", name))
            }
        }
    }
}

/// 字段的合法操作符集合
pub fn allowed(field: Field) -> &'static [Operator] {
    match field {
        Field::UnitType
        | Field::Region
        | Field::MainActivity
        | Field::UnitStatusId
        | Field::ForeignParticipationId
        | Field::ParentId
        | Field::RegId
        | Field::Address
        | Field::LegalFormId
        | Field::InstSectorCodeId => EQUALITY_AND_LIST,
        Field::Turnover | Field::TurnoverYear | Field::Employees | Field::EmployeesYear => NUMERIC,
        Field::FreeEconZone => FLAG,
        Field::Name
        | Field::StatId
        | Field::TaxRegId
        | Field::ExternalId
        | Field::ShortName
        | Field::TelephoneNo
        | Field::EmailAddress
        | Field::ContactPerson => TEXT,
        Field::RegistrationDate | Field::StatusDate => TEMPORAL,
    }
}

pub fn is_allowed(field: Field, operator: Operator) -> bool {
    allowed(field).contains(&operator)
}

/// 字段的比较类型
pub fn type_of(field: Field) -> ComparisonType {
    match field {
        Field::UnitType | Field::Region | Field::MainActivity => ComparisonType::Code,
        Field::Turnover => ComparisonType::Decimal,
        Field::UnitStatusId
        | Field::TurnoverYear
        | Field::Employees
        | Field::EmployeesYear
        | Field::ForeignParticipationId
        | Field::ParentId
        | Field::RegId
        | Field::Address
        | Field::LegalFormId
        | Field::InstSectorCodeId => ComparisonType::Integer,
        Field::FreeEconZone => ComparisonType::Boolean,
        Field::Name
        | Field::StatId
        | Field::TaxRegId
        | Field::ExternalId
        | Field::ShortName
        | Field::TelephoneNo
        | Field::EmailAddress
        | Field::ContactPerson => ComparisonType::String,
        Field::RegistrationDate | Field::StatusDate => ComparisonType::Date,
    }
}

/// 叶子编译分派所用的 (比较类型, 值形态) 键
pub fn comparison_shape(field: Field, operator: Operator) -> (ComparisonType, ValueShape) {
    (type_of(field), operator.shape())
}

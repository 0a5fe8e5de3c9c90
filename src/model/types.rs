//! Column type codes and the Go target type mapper
//!
//! A lookup is keyed by the raw type code, the unsigned flag, whether the
//! column is evaluated as an aggregate result and the third-party dependency
//! the target type needs. Aggregate results always resolve to a nullable
//! wrapper (`sql.NullInt32`, `decimal.NullDecimal`, ...).

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Result, SqlGenError};
use crate::util::to_camel_case;

/// Raw column type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Tiny,
    Short,
    Long,
    Int24,
    LongLong,
    Float,
    Double,
    NewDecimal,
    Timestamp,
    Date,
    Duration,
    Datetime,
    Year,
    Varchar,
    VarString,
    String,
    Bit,
    Json,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    Geometry,
    Null,
    Unspecified,
    /// Nullable long-long, used for COUNT results
    NullLongLong,
    /// Nullable decimal, used for SUM/AVG of decimals
    NullDecimal,
    /// Nullable string
    NullString,
}

impl ColumnType {
    /// Map a database type name (e.g. `int`, `VARCHAR`, `double precision`) to a type code
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let tp = match lower.as_str() {
            "tinyint" | "bool" | "boolean" => ColumnType::Tiny,
            "smallint" => ColumnType::Short,
            "mediumint" => ColumnType::Int24,
            "int" | "integer" => ColumnType::Long,
            "bigint" => ColumnType::LongLong,
            "float" => ColumnType::Float,
            "double" | "double precision" | "real" => ColumnType::Double,
            "decimal" | "numeric" | "dec" | "fixed" => ColumnType::NewDecimal,
            "timestamp" => ColumnType::Timestamp,
            "date" => ColumnType::Date,
            "time" => ColumnType::Duration,
            "datetime" => ColumnType::Datetime,
            "year" => ColumnType::Year,
            "varchar" | "varbinary" | "character varying" | "nvarchar" => ColumnType::Varchar,
            "var_string" => ColumnType::VarString,
            "char" | "character" | "nchar" | "binary" => ColumnType::String,
            "bit" => ColumnType::Bit,
            "json" => ColumnType::Json,
            "enum" => ColumnType::Enum,
            "set" => ColumnType::Set,
            "tinytext" | "tinyblob" => ColumnType::TinyBlob,
            "mediumtext" | "mediumblob" => ColumnType::MediumBlob,
            "longtext" | "longblob" => ColumnType::LongBlob,
            "text" | "blob" => ColumnType::Blob,
            "geometry" => ColumnType::Geometry,
            "null" => ColumnType::Null,
            "unspecified" => ColumnType::Unspecified,
            _ => return None,
        };
        Some(tp)
    }

    /// Whether this is one of the synthetic nullable codes
    pub fn is_null_type(self) -> bool {
        matches!(
            self,
            ColumnType::NullLongLong | ColumnType::NullDecimal | ColumnType::NullString
        )
    }

    fn name(self) -> &'static str {
        match self {
            ColumnType::Tiny => "tinyint",
            ColumnType::Short => "smallint",
            ColumnType::Long => "int",
            ColumnType::Int24 => "mediumint",
            ColumnType::LongLong => "bigint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::NewDecimal => "decimal",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
            ColumnType::Duration => "time",
            ColumnType::Datetime => "datetime",
            ColumnType::Year => "year",
            ColumnType::Varchar => "varchar",
            ColumnType::VarString => "var_string",
            ColumnType::String => "char",
            ColumnType::Bit => "bit",
            ColumnType::Json => "json",
            ColumnType::Enum => "enum",
            ColumnType::Set => "set",
            ColumnType::TinyBlob => "tinytext",
            ColumnType::MediumBlob => "mediumtext",
            ColumnType::LongBlob => "longtext",
            ColumnType::Blob => "text",
            ColumnType::Geometry => "geometry",
            ColumnType::Null => "null",
            ColumnType::Unspecified => "unspecified",
            ColumnType::NullLongLong => "null bigint",
            ColumnType::NullDecimal => "null decimal",
            ColumnType::NullString => "null string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Third-party package a target type depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Decimal,
}

impl Dependency {
    /// Go import path of the dependency
    pub fn import_path(self) -> &'static str {
        match self {
            Dependency::Decimal => "github.com/shopspring/decimal",
        }
    }

    fn for_type(tp: ColumnType) -> Option<Self> {
        match tp {
            ColumnType::NewDecimal | ColumnType::NullDecimal => Some(Dependency::Decimal),
            _ => None,
        }
    }
}

/// Composite lookup key for the type mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub tp: ColumnType,
    pub unsigned: bool,
    pub aggregate: bool,
    pub dependency: Option<Dependency>,
}

impl TypeKey {
    /// Build a key. The unsigned flag is dropped in aggregate context.
    pub fn new(tp: ColumnType, unsigned: bool, aggregate: bool) -> Self {
        Self {
            tp,
            unsigned: unsigned && !aggregate,
            aggregate,
            dependency: Dependency::for_type(tp),
        }
    }

    const fn plain(tp: ColumnType) -> Self {
        Self {
            tp,
            unsigned: false,
            aggregate: false,
            dependency: None,
        }
    }

    const fn unsigned(tp: ColumnType) -> Self {
        Self {
            tp,
            unsigned: true,
            aggregate: false,
            dependency: None,
        }
    }

    const fn aggregate(tp: ColumnType) -> Self {
        Self {
            tp,
            unsigned: false,
            aggregate: true,
            dependency: None,
        }
    }

    const fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependency = Some(dependency);
        self
    }
}

static TYPE_MAPPER: Lazy<HashMap<TypeKey, &'static str>> = Lazy::new(|| {
    use ColumnType::*;

    let decimal = Dependency::Decimal;
    let entries: Vec<(TypeKey, &'static str)> = vec![
        (TypeKey::plain(Tiny), "int8"),
        (TypeKey::unsigned(Tiny), "uint8"),
        (TypeKey::plain(Short), "int16"),
        (TypeKey::unsigned(Short), "uint16"),
        (TypeKey::plain(Long), "int32"),
        (TypeKey::unsigned(Long), "uint32"),
        (TypeKey::plain(Int24), "int32"),
        (TypeKey::unsigned(Int24), "uint32"),
        (TypeKey::plain(LongLong), "int64"),
        (TypeKey::unsigned(LongLong), "uint64"),
        (TypeKey::plain(Float), "float64"),
        (TypeKey::plain(Double), "float64"),
        (TypeKey::plain(Timestamp), "time.Time"),
        (TypeKey::plain(Date), "time.Time"),
        (TypeKey::plain(Duration), "time.Time"),
        (TypeKey::plain(Datetime), "time.Time"),
        (TypeKey::plain(Year), "string"),
        (TypeKey::plain(Varchar), "string"),
        (TypeKey::plain(VarString), "string"),
        (TypeKey::plain(String), "string"),
        (TypeKey::plain(Bit), "byte"),
        (TypeKey::plain(Json), "string"),
        (TypeKey::plain(Enum), "string"),
        (TypeKey::plain(Set), "string"),
        (TypeKey::plain(TinyBlob), "string"),
        (TypeKey::plain(MediumBlob), "string"),
        (TypeKey::plain(LongBlob), "string"),
        (TypeKey::plain(Blob), "string"),
        (TypeKey::plain(NewDecimal).with_dependency(decimal), "decimal.Decimal"),
        (TypeKey::plain(NullLongLong), "sql.NullInt64"),
        (TypeKey::plain(NullDecimal).with_dependency(decimal), "decimal.NullDecimal"),
        (TypeKey::plain(NullString), "sql.NullString"),
        // aggregate functions
        (TypeKey::aggregate(Tiny), "sql.NullInt16"),
        (TypeKey::aggregate(Short), "sql.NullInt16"),
        (TypeKey::aggregate(Long), "sql.NullInt32"),
        (TypeKey::aggregate(Int24), "sql.NullInt32"),
        (TypeKey::aggregate(LongLong), "sql.NullInt64"),
        (TypeKey::aggregate(Float), "sql.NullFloat64"),
        (TypeKey::aggregate(Double), "sql.NullFloat64"),
        (TypeKey::aggregate(Timestamp), "sql.NullTime"),
        (TypeKey::aggregate(Date), "sql.NullTime"),
        (TypeKey::aggregate(Duration), "sql.NullTime"),
        (TypeKey::aggregate(Datetime), "sql.NullTime"),
        (TypeKey::aggregate(Year), "sql.NullString"),
        (TypeKey::aggregate(Varchar), "sql.NullString"),
        (TypeKey::aggregate(VarString), "sql.NullString"),
        (TypeKey::aggregate(String), "sql.NullString"),
        (TypeKey::aggregate(Bit), "sql.NullInt16"),
        (TypeKey::aggregate(Json), "sql.NullString"),
        (TypeKey::aggregate(Enum), "sql.NullString"),
        (TypeKey::aggregate(Set), "sql.NullString"),
        (TypeKey::aggregate(TinyBlob), "sql.NullString"),
        (TypeKey::aggregate(MediumBlob), "sql.NullString"),
        (TypeKey::aggregate(LongBlob), "sql.NullString"),
        (TypeKey::aggregate(Blob), "sql.NullString"),
        (
            TypeKey::aggregate(NewDecimal).with_dependency(decimal),
            "decimal.NullDecimal",
        ),
        (TypeKey::aggregate(NullLongLong), "sql.NullInt64"),
        (
            TypeKey::aggregate(NullDecimal).with_dependency(decimal),
            "decimal.NullDecimal",
        ),
        (TypeKey::aggregate(NullString), "sql.NullString"),
    ];
    entries.into_iter().collect()
});

/// Resolved Go type for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    pub name: &'static str,
    pub dependency: Option<Dependency>,
}

/// Look up the Go type for a key.
///
/// Entries that do not distinguish signedness are found for unsigned keys too.
pub fn lookup(key: TypeKey) -> Result<TargetType> {
    let found = TYPE_MAPPER.get(&key).or_else(|| {
        if key.unsigned {
            TYPE_MAPPER.get(&TypeKey {
                unsigned: false,
                ..key
            })
        } else {
            None
        }
    });

    match found {
        Some(name) => Ok(TargetType {
            name: *name,
            dependency: key.dependency,
        }),
        None => Err(SqlGenError::UnsupportedType {
            tp: key.tp.to_string(),
        }),
    }
}

/// A typed bind parameter derived from a clause leaf or limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name, e.g. `idEQ`, `ageBetweenStart`
    pub name: String,
    /// Go type, e.g. `int64`, `[]string`
    pub target: String,
    pub dependency: Option<Dependency>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, target: impl Into<String>, dependency: Option<Dependency>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            dependency,
        }
    }

    /// Exported Go field name for the parameter
    pub fn field_name(&self) -> String {
        to_camel_case(&self.name)
    }
}

use std::fmt;

/// Storage type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,

    /// 2 byte signed integer
    SmallInt,

    /// 4 byte signed integer
    Integer,

    /// 8 byte signed integer
    BigInt,

    /// 4 byte floating point
    Real,

    /// 8 byte floating point
    DoublePrecision,

    /// Arbitrary precision number with an optional `(precision, scale)`
    Numeric(Option<(u32, u32)>),

    Text,

    /// Text with a maximum length
    VarChar(u64),

    Bytea,

    Uuid,

    Date,

    Time,

    /// Timestamp without time zone
    Timestamp,

    /// Timestamp with time zone
    Timestamptz,

    Json,

    Jsonb,

    /// Key/value map of strings (`hstore` extension)
    HStore,

    /// `int4range`
    IntRange,

    /// `int8range`
    BigIntRange,

    /// `numrange`
    NumRange,

    /// `daterange`
    DateRange,

    /// `tsrange`
    TsRange,

    /// `tstzrange`
    TstzRange,

    /// One dimensional array of the element type
    Array(Box<Type>),
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::SmallInt | Type::Integer | Type::BigInt)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                Type::Real | Type::DoublePrecision | Type::Numeric(_)
            )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Type::Text | Type::VarChar(_))
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Type::Json | Type::Jsonb)
    }

    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Type::IntRange
                | Type::BigIntRange
                | Type::NumRange
                | Type::DateRange
                | Type::TsRange
                | Type::TstzRange
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Type::Date | Type::Timestamp | Type::Timestamptz)
    }

    /// Element type of an array column.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// The type a range's bounds are stored as.
    pub fn range_subtype(&self) -> Option<Type> {
        Some(match self {
            Type::IntRange => Type::Integer,
            Type::BigIntRange => Type::BigInt,
            Type::NumRange => Type::Numeric(None),
            Type::DateRange => Type::Date,
            Type::TsRange => Type::Timestamp,
            Type::TstzRange => Type::Timestamptz,
            _ => return None,
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("boolean"),
            Type::SmallInt => f.write_str("smallint"),
            Type::Integer => f.write_str("integer"),
            Type::BigInt => f.write_str("bigint"),
            Type::Real => f.write_str("real"),
            Type::DoublePrecision => f.write_str("double precision"),
            Type::Numeric(None) => f.write_str("numeric"),
            Type::Numeric(Some((precision, scale))) => {
                write!(f, "numeric({precision}, {scale})")
            }
            Type::Text => f.write_str("text"),
            Type::VarChar(len) => write!(f, "varchar({len})"),
            Type::Bytea => f.write_str("bytea"),
            Type::Uuid => f.write_str("uuid"),
            Type::Date => f.write_str("date"),
            Type::Time => f.write_str("time"),
            Type::Timestamp => f.write_str("timestamp"),
            Type::Timestamptz => f.write_str("timestamp with time zone"),
            Type::Json => f.write_str("json"),
            Type::Jsonb => f.write_str("jsonb"),
            Type::HStore => f.write_str("hstore"),
            Type::IntRange => f.write_str("int4range"),
            Type::BigIntRange => f.write_str("int8range"),
            Type::NumRange => f.write_str("numrange"),
            Type::DateRange => f.write_str("daterange"),
            Type::TsRange => f.write_str("tsrange"),
            Type::TstzRange => f.write_str("tstzrange"),
            Type::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

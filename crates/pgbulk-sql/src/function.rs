use crate::{
    migration::JSONB_MERGE_FUNCTION,
    serializer::{Formatter, Params, ToSql, TypedValue},
    NullDefaults,
};

use pgbulk_core::{
    schema::{Column, Type},
    stmt::{Expr, Value},
    Error, Result,
};

/// How the incoming value of a field combines with the value already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CombineFunction {
    /// Overwrite with the incoming value
    #[default]
    Eq,

    /// Overwrite unless the incoming value is NULL
    EqNotNull,

    /// Add the incoming value to the stored one
    Incr,

    /// Append the incoming value to the stored one
    Concat,

    /// Append, then drop duplicate array elements
    Union,

    /// Remove every occurrence of the incoming element from the stored array
    ArrayRemove,

    /// Current timestamp; the incoming value is ignored. With `if_null`, a
    /// stored timestamp is kept.
    Now { if_null: bool },
}

const NAMES: &[(&str, CombineFunction)] = &[
    ("eq", CombineFunction::Eq),
    ("=", CombineFunction::Eq),
    ("eq_not_null", CombineFunction::EqNotNull),
    ("+", CombineFunction::Incr),
    ("incr", CombineFunction::Incr),
    ("||", CombineFunction::Concat),
    ("concat", CombineFunction::Concat),
    ("union", CombineFunction::Union),
    ("array_remove", CombineFunction::ArrayRemove),
    ("now", CombineFunction::Now { if_null: false }),
    ("NOW", CombineFunction::Now { if_null: false }),
];

/// Where a function reads its inputs from, as quoted SQL references.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub(crate) column: &'a Column,

    /// The stored value, e.g. `"t"."counter"`
    pub(crate) existing: &'a str,

    /// The incoming value, e.g. `"vals"."upd__counter"`. Unused by
    /// functions that take no value.
    pub(crate) operand: &'a str,
}

impl CombineFunction {
    pub fn from_name(name: &str) -> Result<CombineFunction> {
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, func)| *func)
            .ok_or_else(|| Error::unknown_function(name))
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            CombineFunction::Eq => "eq",
            CombineFunction::EqNotNull => "eq_not_null",
            CombineFunction::Incr => "incr",
            CombineFunction::Concat => "concat",
            CombineFunction::Union => "union",
            CombineFunction::ArrayRemove => "array_remove",
            CombineFunction::Now { .. } => "now",
        }
    }

    /// The function columns set automatically on write receive when none
    /// was given for them.
    pub fn auto(column: &Column) -> Option<CombineFunction> {
        if column.auto_now {
            Some(CombineFunction::Now { if_null: false })
        } else if column.auto_now_add {
            Some(CombineFunction::Now { if_null: true })
        } else {
            None
        }
    }

    pub fn supports(self, ty: &Type) -> bool {
        match self {
            CombineFunction::Eq | CombineFunction::EqNotNull => true,
            CombineFunction::Incr => ty.is_numeric() || ty.is_range(),
            CombineFunction::Concat => matches!(
                ty,
                Type::Text
                    | Type::VarChar(_)
                    | Type::Bytea
                    | Type::Jsonb
                    | Type::HStore
                    | Type::Array(_)
            ),
            CombineFunction::Union | CombineFunction::ArrayRemove => ty.is_array(),
            CombineFunction::Now { .. } => ty.is_temporal(),
        }
    }

    /// Fails unless the function can be applied to `column`.
    pub fn check(self, column: &Column) -> Result<()> {
        if self.supports(&column.ty) {
            Ok(())
        } else {
            Err(Error::unsupported_field(self.name(), &column.name))
        }
    }

    /// `false` for functions computing the value themselves.
    pub fn needs_value(self) -> bool {
        !matches!(self, CombineFunction::Now { .. })
    }

    /// Type of the incoming value for a column of type `ty`.
    pub fn operand_type(self, ty: &Type) -> Type {
        match (self, ty) {
            (CombineFunction::ArrayRemove, Type::Array(elem)) => (**elem).clone(),
            _ => ty.clone(),
        }
    }

    /// Writes the value assigned to the column.
    ///
    /// `for_update` selects between combining with a stored row and creating
    /// a new one, where nothing is stored yet.
    pub(crate) fn render<P: Params>(
        self,
        f: &mut Formatter<'_, P>,
        target: Target<'_>,
        for_update: bool,
        null_defaults: &NullDefaults,
    ) -> Result<()> {
        let Target {
            column,
            existing,
            operand,
        } = target;

        match self {
            CombineFunction::Eq => fmt!(f, operand),
            CombineFunction::EqNotNull if for_update => {
                fmt!(f, "COALESCE(" operand ", " existing ")");
            }
            CombineFunction::EqNotNull => {
                let default = column_default(column)?;
                fmt!(f, "COALESCE(" operand ", " Fallback(&default, &column.ty) ")");
            }
            CombineFunction::Incr if for_update => {
                let nd = self.null_default(column, null_defaults)?;
                fmt!(f, "COALESCE(" existing ", " Fallback(&nd, &column.ty) ") + " operand);
            }
            CombineFunction::Concat if for_update => {
                let nd = self.null_default(column, null_defaults)?;
                if column.ty == Type::Jsonb && !f.dialect.jsonb_concat {
                    fmt!(f, JSONB_MERGE_FUNCTION "(COALESCE(" existing ", " Fallback(&nd, &column.ty) "), " operand ")");
                } else {
                    fmt!(f, "COALESCE(" existing ", " Fallback(&nd, &column.ty) ") || " operand);
                }
            }
            CombineFunction::Union if for_update => {
                let nd = self.null_default(column, null_defaults)?;
                fmt!(f, "ARRAY(SELECT DISTINCT UNNEST(COALESCE(" existing ", " Fallback(&nd, &column.ty) ") || " operand "))");
            }
            CombineFunction::Incr | CombineFunction::Concat | CombineFunction::Union => {
                fmt!(f, operand);
            }
            CombineFunction::ArrayRemove if for_update => {
                fmt!(f, "array_remove(" existing ", " operand ")");
            }
            CombineFunction::ArrayRemove => {
                let default = column_default(column)?;
                fmt!(f, Fallback(&default, &column.ty));
            }
            CombineFunction::Now { if_null: true } if for_update => {
                fmt!(f, "COALESCE(" existing ", NOW())");
            }
            CombineFunction::Now { .. } => fmt!(f, "NOW()"),
        }

        Ok(())
    }

    /// The value written when the row is created by a plain insert instead
    /// of a statement rendered by [`render`](Self::render).
    pub fn create_value(self, column: &Column, value: Expr) -> Result<Expr> {
        Ok(match self {
            CombineFunction::EqNotNull if value.is_value_null() => column_default(column)?.into(),
            CombineFunction::ArrayRemove if value.as_value().is_some_and(|v| !v.is_empty()) => {
                column_default(column)?.into()
            }
            CombineFunction::Now { .. } => Expr::now(),
            _ => value,
        })
    }

    fn null_default(self, column: &Column, null_defaults: &NullDefaults) -> Result<Value> {
        let value = null_defaults
            .get(&column.ty)
            .ok_or_else(|| Error::unsupported_field(self.name(), &column.name))?;
        value.coerce(&column.ty)
    }
}

impl std::str::FromStr for CombineFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CombineFunction::from_name(s)
    }
}

fn column_default(column: &Column) -> Result<Value> {
    match &column.default {
        Some(default) => default.eval().coerce(&column.ty),
        None => Ok(Value::Null),
    }
}

/// A literal fallback value, cast so it types on its own.
struct Fallback<'a>(&'a Value, &'a Type);

impl ToSql for Fallback<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            TypedValue {
                value: self.0,
                ty: self.1,
                cast: true,
            }
        );
    }
}

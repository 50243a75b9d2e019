/// Ordered field names: a single name or a list of names.
///
/// Defaults to the `id` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames(Vec<String>);

/// Fields returned for each written row. `"*"` stands for every stored
/// column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returning(Vec<String>);

impl FieldNames {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> FieldNames {
        FieldNames(names.into_iter().map(Into::into).collect())
    }

    /// No field at all, as used by create-only operations.
    pub fn none() -> FieldNames {
        FieldNames(vec![])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames(vec!["id".to_string()])
    }
}

impl Returning {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Returning {
        Returning(names.into_iter().map(Into::into).collect())
    }

    /// Every stored column.
    pub fn all() -> Returning {
        Returning(vec!["*".to_string()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

macro_rules! impl_from_names {
    ($($ty:ident),*) => {
        $(
            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    $ty(vec![value.to_string()])
                }
            }

            impl From<String> for $ty {
                fn from(value: String) -> Self {
                    $ty(vec![value])
                }
            }

            impl From<&[&str]> for $ty {
                fn from(value: &[&str]) -> Self {
                    $ty::new(value.iter().copied())
                }
            }

            impl<const N: usize> From<[&str; N]> for $ty {
                fn from(value: [&str; N]) -> Self {
                    $ty::new(value)
                }
            }

            impl From<Vec<&str>> for $ty {
                fn from(value: Vec<&str>) -> Self {
                    $ty::new(value)
                }
            }

            impl From<Vec<String>> for $ty {
                fn from(value: Vec<String>) -> Self {
                    $ty(value)
                }
            }
        )*
    };
}

impl_from_names!(FieldNames, Returning);

use super::{Formatter, Params, ToSql};

/// A quoted identifier.
pub(crate) struct Ident<S>(pub(crate) S);

/// A column qualified by the table (or alias) it belongs to: `"t"."col"`.
pub(crate) struct Qualified<T, C>(pub(crate) T, pub(crate) C);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        push_quoted(f.dst, self.0.as_ref());
    }
}

impl<T: AsRef<str>, C: AsRef<str>> ToSql for Qualified<T, C> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0) "." Ident(self.1));
    }
}

/// Renders a qualified column reference on its own, for fragments that are
/// assembled as plain text.
pub(crate) fn qualified(table: &str, column: &str) -> String {
    let mut dst = String::with_capacity(table.len() + column.len() + 5);
    push_quoted(&mut dst, table);
    dst.push('.');
    push_quoted(&mut dst, column);
    dst
}

fn push_quoted(dst: &mut String, ident: &str) {
    dst.push('"');
    for c in ident.chars() {
        if c == '"' {
            dst.push('"');
        }
        dst.push(c);
    }
    dst.push('"');
}

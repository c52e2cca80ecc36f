use std::{cmp::min, ffi::CString};
use syn::Path;

pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// C string for the engine APIs, interior NUL bytes are rejected.
pub fn as_c_string<S: Into<Vec<u8>>>(str: S) -> crate::Result<CString> {
    CString::new(str.into()).map_err(|e| crate::Error::new(e).context("Invalid C string"))
}

/// Escape the LIKE wildcards (`%`, `_`) and the escape character itself.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

/// At most `max` bytes of `value` cut on a char boundary, with `...` when cut.
pub fn truncated(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.trim_end().to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", value[..end].trim_end())
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::truncated(&$query, 497)
    };
}

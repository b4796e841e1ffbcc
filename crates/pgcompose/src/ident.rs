//! SQL identifier quoting.
//!
//! Every identifier pgcompose emits is double-quoted, so descriptor-supplied names
//! are used verbatim and never collide with keywords. [`quote_identifier`] is the
//! pure quoting function; [`Ident`] adds dotted (schema-qualified) names and a
//! parser for identifiers that arrive as user-facing strings.
//!
//! # Example
//! ```
//! use pgcompose::{Ident, quote_identifier};
//!
//! assert_eq!(quote_identifier("user"), r#""user""#);
//! let t = Ident::parse(r#"public."UserTable""#)?;
//! assert_eq!(t.to_sql(), r#""public"."UserTable""#);
//! # Ok::<(), pgcompose::BuildError>(())
//! ```

use crate::error::{BuildError, BuildResult};

/// Quote a single identifier, doubling embedded `"` characters.
pub fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(name, &mut out);
    out
}

pub(crate) fn write_quoted(name: &str, out: &mut String) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

/// A possibly-qualified SQL identifier (`schema.table`, `table.column`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// A single-part identifier used verbatim.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// A two-part identifier, e.g. `schema.table`.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parts: vec![qualifier.into(), name.into()],
        }
    }

    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Unquoted parts must match `[A-Za-z_][A-Za-z0-9_$]*` and are folded to
    ///   lower case, as PostgreSQL does.
    /// - Quoted parts allow any characters except NUL; `""` escapes a quote.
    pub fn parse(s: &str) -> BuildResult<Self> {
        if s.is_empty() {
            return Err(BuildError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(BuildError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut rest = s;
        loop {
            let (part, tail) = match rest.strip_prefix('"') {
                Some(quoted) => scan_quoted(quoted)?,
                None => scan_bare(rest)?,
            };
            parts.push(part);
            match tail.chars().next() {
                None => break,
                Some('.') => rest = &tail[1..],
                Some(c) => {
                    return Err(BuildError::validation(format!(
                        "Expected '.' between identifier parts, got '{c}'"
                    )));
                }
            }
        }

        Ok(Self { parts })
    }

    /// The unquoted parts of this identifier.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The last part (the object's own name).
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            write_quoted(part, out);
        }
    }
}

/// One unquoted part up to the next `.`, folded to lower case.
fn scan_bare(s: &str) -> BuildResult<(String, &str)> {
    let (segment, tail) = s.split_at(s.find('.').unwrap_or(s.len()));
    let invalid = segment.char_indices().find(|&(i, c)| {
        let start = c == '_' || c.is_ascii_alphabetic();
        !(start || (i > 0 && (c == '$' || c.is_ascii_digit())))
    });
    if let Some((_, c)) = invalid {
        return Err(BuildError::validation(format!(
            "Invalid character in identifier: '{c}'"
        )));
    }
    if segment.is_empty() {
        return Err(BuildError::validation("Empty identifier segment"));
    }
    Ok((segment.to_ascii_lowercase(), tail))
}

/// One quoted part; `s` starts after the opening quote. `""` is a literal quote.
fn scan_quoted(s: &str) -> BuildResult<(String, &str)> {
    let mut name = String::new();
    let mut rest = s;
    loop {
        let Some(close) = rest.find('"') else {
            return Err(BuildError::validation("Unclosed quoted identifier"));
        };
        name.push_str(&rest[..close]);
        rest = &rest[close + 1..];
        match rest.strip_prefix('"') {
            Some(after) => {
                name.push('"');
                rest = after;
            }
            None => break,
        }
    }
    if name.is_empty() {
        return Err(BuildError::validation("Empty quoted identifier"));
    }
    Ok((name, rest))
}

/// Convert an input into an [`Ident`].
///
/// String inputs are parsed with [`Ident::parse`].
pub trait IntoIdent {
    fn into_ident(self) -> BuildResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> BuildResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> BuildResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> BuildResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> BuildResult<Ident> {
        Ident::parse(&self)
    }
}

//! Query predicates in the Prismic search syntax

use std::fmt;

/// A single search predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `path` equals `value`
    At { path: String, value: String },
    /// `path` equals any of `values`
    Any { path: String, values: Vec<String> },
    /// `path` differs from `value`
    Not { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn any<I, V>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Predicate::Any {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Not {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => write!(f, "at({}, {})", path, quote(value)),
            Predicate::Not { path, value } => write!(f, "not({}, {})", path, quote(value)),
            Predicate::Any { path, values } => {
                let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "any({}, [{}])", path, values.join(", "))
            }
        }
    }
}

/// Render predicates as the `q` parameter of a search request
///
/// # Examples
/// ```ignore
/// to_query(&[Predicate::at("document.type", "posts")]) // -> [[at(document.type, "posts")]]
/// ```
pub fn to_query(predicates: &[Predicate]) -> String {
    let mut query = String::from("[");
    for predicate in predicates {
        query.push('[');
        query.push_str(&predicate.to_string());
        query.push(']');
    }
    query.push(']');
    query
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_predicate() {
        let q = to_query(&[Predicate::at("document.type", "posts")]);
        assert_eq!(q, r#"[[at(document.type, "posts")]]"#);
    }

    #[test]
    fn test_multiple_predicates() {
        let q = to_query(&[
            Predicate::at("document.type", "posts"),
            Predicate::any("document.tags", ["rust", "react"]),
            Predicate::not("my.posts.uid", "draft"),
        ]);
        assert_eq!(
            q,
            r#"[[at(document.type, "posts")][any(document.tags, ["rust", "react"])][not(my.posts.uid, "draft")]]"#
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let p = Predicate::at("my.posts.title", r#"say "hi""#);
        assert_eq!(p.to_string(), r#"at(my.posts.title, "say \"hi\"")"#);
    }
}

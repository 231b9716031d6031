//! Named parameter substitution for query templates.
//!
//! Templates name their placeholders as `?name` or `*name`; both sigils
//! are accepted because call sites use either. Substitution is
//! case-insensitive on the name and never matches part of a longer
//! identifier: binding `entry` leaves `?entryLangTag` untouched.

use regex::{NoExpand, Regex};

/// How a parameter value is rendered into the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Rendered in angle brackets: `<value>`
    Uri,
    /// Rendered in double quotes: `"value"`
    Text,
}

/// A named value substituted into a query template
#[derive(Debug, Clone)]
pub struct QueryParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub value: String,
}

impl QueryParameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind, value: impl Into<String>) -> Self {
        QueryParameter { name: name.into(), kind, value: value.into() }
    }

    pub fn uri(name: impl Into<String>, value: impl Into<String>) -> Self {
        QueryParameter::new(name, ParameterKind::Uri, value)
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        QueryParameter::new(name, ParameterKind::Text, value)
    }

    fn rendered(&self) -> String {
        match self.kind {
            ParameterKind::Uri => format!("<{}>", self.value),
            ParameterKind::Text => format!("\"{}\"", self.value),
        }
    }
}

/// Replaces every `?name`/`*name` token with the rendered parameter value.
///
/// Parameters are applied independently in the order given. A parameter
/// whose name does not occur in the template is a no-op. Side effect
/// free.
pub fn bind_parameters(template: &str, parameters: &[QueryParameter]) -> String {
    let mut query = template.to_string();
    for parameter in parameters {
        let pattern = format!(r"(?i)[?*]{}\b", regex::escape(&parameter.name));
        // the escaped name always compiles; a rejected pattern is a no-op
        if let Ok(regex) = Regex::new(&pattern) {
            query = regex.replace_all(&query, NoExpand(&parameter.rendered())).into_owned();
        }
    }
    query
}

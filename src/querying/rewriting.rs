//! Text-level query rewriting for the embedded SPARQL engine.
//!
//! The embedded engine only supports a conservative subset of SPARQL
//! 1.1: no `*`/`+` path operators inside `UNION`, no full-text index
//! functions, and unreliable `ORDER BY`/`DISTINCT` semantics. Instead
//! of planning over an AST, a fixed, ordered sequence of text
//! transformations lowers a parameter-bound query onto that subset:
//!
//! 1. strip `/rdfs:subClassOf*` path suffixes (the local schema is
//!    assumed fully materialized)
//! 2. expand slash-predicate property paths into fresh-variable joins,
//!    repeated to a fixpoint
//! 3. drop `UNION` branches whose pattern contains a `*`/`+` path
//!    operator (narrows recall)
//! 4. rewrite `(?s ?o) fti:match ?key` into an unranked
//!    `CONTAINS` filter
//! 5. strip `ORDER BY` sort conditions (ordering is reapplied after
//!    results return)
//! 6. strip `DISTINCT`
//!
//! Every step is a pure string-to-string function; the rewritten query
//! is always accepted by the embedded engine at the cost of the
//! documented recall and ordering relaxations.

use log::debug;
use regex::Regex;

/// Ordered rewriting pipeline with precompiled patterns
pub struct QueryRewriter {
    subclass_closure_regex: Regex,
    property_path_regex: Regex,
    union_regex: Regex,
    text_search_regex: Regex,
    order_by_regex: Regex,
    distinct_regex: Regex,
}

impl QueryRewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(QueryRewriter {
            subclass_closure_regex: Regex::new(r"(?i)/rdfs:subClassOf\*")?,
            property_path_regex: Regex::new(r"(?i)/(a[/\s]|<\S*>|[^\s/<]*:[^<\s/]*)")?,
            union_regex: Regex::new(r"(?i)\}\s*UNION\s*\{")?,
            text_search_regex: Regex::new(
                r"\((\?[^?\s]*)\s*(\?[^?\s]*)\)\s*(fti:match|<http://franz\.com/ns/allegrograph/2\.2/textindex/match>)\s*([^.]*)",
            )?,
            order_by_regex: Regex::new(r"(?i)ORDER\s+BY(\s+(ASC|DESC)\s*\([^)]*\)|\s+\?\w+)*")?,
            distinct_regex: Regex::new(r"(?i)DISTINCT\s")?,
        })
    }

    /// Applies the full pipeline in its fixed order.
    ///
    /// Applying the pipeline to its own output is a no-op.
    pub fn rewrite(&self, query: &str) -> String {
        let query = self.strip_subclass_closure(query);
        let query = self.expand_property_paths(&query);
        let query = self.drop_unions_with_path_operators(&query);
        let query = self.rewrite_text_search(&query);
        let query = self.strip_order_by(&query);
        let query = self.strip_distinct(&query);
        debug!("Rewritten for embedded engine: {}", query);
        query
    }

    /// Removes every `/rdfs:subClassOf*` path suffix
    pub fn strip_subclass_closure(&self, query: &str) -> String {
        self.subclass_closure_regex.replace_all(query, "").into_owned()
    }

    /// Rewrites each `X /pred` chain link into `X ?tmp . ?tmp pred`,
    /// one slash at a time with a fresh variable per rewrite, until no
    /// slash-predicate pattern remains.
    ///
    /// Each rewrite removes one path slash, so the loop terminates
    /// within a bound proportional to the original slash count.
    pub fn expand_property_paths(&self, query: &str) -> String {
        let mut query = query.to_string();
        let mut counter = 0;
        while let Some(captures) = self.property_path_regex.captures(&query) {
            let Some(matched) = captures.get(0) else { break };
            let range = matched.range();
            let predicate = captures.get(1).map_or("", |m| m.as_str()).to_string();
            let fresh = format!("?anon_path_var{}", counter);
            counter += 1;
            let replacement = format!(" {} . {} {}", fresh, fresh, predicate);
            query.replace_range(range, &replacement);
        }
        query
    }

    /// Deletes every `UNION` branch whose brace-balanced block contains
    /// a `*` or `+` path operator.
    ///
    /// The embedded engine cannot evaluate zero-or-more / one-or-more
    /// paths inside a union arm; dropping the arm silently narrows
    /// recall.
    pub fn drop_unions_with_path_operators(&self, query: &str) -> String {
        let mut query = query.to_string();
        // positions just past the '}' preceding each UNION keyword
        let branch_starts: Vec<usize> =
            self.union_regex.find_iter(&query).map(|found| found.start() + 1).collect();
        for &start in branch_starts.iter().rev() {
            if let Some(end) = union_block_end(&query, start) {
                let branch = &query[start..end];
                if branch.contains('*') || branch.contains('+') {
                    query.replace_range(start..end, "");
                }
            }
        }
        query
    }

    /// Translates the first free-text index call into a substring
    /// containment filter:
    /// `(?s ?o) fti:match ?key` becomes
    /// `?s ?predicateForLocalSearch ?o . FILTER(CONTAINS(?o, ?key))`.
    pub fn rewrite_text_search(&self, query: &str) -> String {
        self.text_search_regex
            .replace(query, "${1} ?predicateForLocalSearch ${2} . FILTER(CONTAINS(${2}, ${4})) ")
            .into_owned()
    }

    /// Removes `ORDER BY` and its sort conditions; clauses that follow
    /// the sort conditions (`LIMIT`, `OFFSET`) survive
    pub fn strip_order_by(&self, query: &str) -> String {
        self.order_by_regex.replace_all(query, "").into_owned()
    }

    /// Removes every `DISTINCT` keyword
    pub fn strip_distinct(&self, query: &str) -> String {
        self.distinct_regex.replace_all(query, "").into_owned()
    }
}

/// End offset (exclusive) of the brace-balanced block following `from`,
/// found by depth counting from the first `{`; `None` when braces never
/// balance.
fn union_block_end(query: &str, from: usize) -> Option<usize> {
    let bytes = query.as_bytes();
    let open = bytes[from..].iter().position(|&b| b == b'{')? + from;
    let mut depth = 1usize;
    for (offset, &byte) in bytes[open + 1..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + 1 + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

//! Heuristics for dotted call chains.
//!
//! A query target like `User.find` denotes a position inside a call chain
//! rather than a simple receiver, and must be matched against the record's
//! stringified chain instead of its `target` field. Classification is a
//! documented approximation, not a parse: adversarial names can misclassify.

/// Separator between links of a dotted call chain.
pub const CHAIN_SEPARATOR: char = '.';

/// True when a query target denotes a multi-segment chain position: it
/// contains the separator, or its first character is not an uppercase
/// letter. Identifiers that look like class or module names (uppercase, no
/// separator) are simple receivers; anything else is presumed chain-shaped.
pub fn is_chain_query(target: &str) -> bool {
    target.contains(CHAIN_SEPARATOR)
        || !target.chars().next().is_some_and(char::is_uppercase)
}

/// Joins all chain segments except the last (the method itself) with the
/// separator, skipping segments that have no simple name.
/// `[Foo, bar, baz]` becomes `"Foo.bar"`; `[bar, baz]` becomes `"bar"`.
pub fn stringify_chain(chain: &[Option<String>]) -> String {
    match chain.split_last() {
        Some((_, head)) => head
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&CHAIN_SEPARATOR.to_string()),
        None => String::new(),
    }
}

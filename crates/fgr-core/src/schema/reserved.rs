use std::{collections::BTreeSet, sync::LazyLock};

///
/// RESERVED_WORDS
/// identifiers that collide with schema/record accessors or serialized metadata
///

static RESERVED_WORDS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        // schema metadata
        "fields",
        "hash_fields",
        "heritage",
        "schema",
        // record accessors
        "from_primitive",
        "get",
        "set",
        "to_primitive",
        // query combinators
        "and",
        "not",
        "or",
        // rust keywords that read like field names
        "crate",
        "self",
        "super",
        "type",
    ])
});

/// Whether `word` is reserved, either builtin or by configuration.
pub(crate) fn is_reserved(word: &str, extra: &BTreeSet<String>) -> bool {
    RESERVED_WORDS.contains(word) || extra.contains(word)
}

/// Ensure a field name is a snake_case identifier.
pub(crate) fn validate_ident(ident: &str) -> Result<(), String> {
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return Err("ident is empty".to_string());
    };

    if !(first.is_ascii_lowercase() || first == '_') {
        return Err("must start with a lowercase ASCII letter or '_'".to_string());
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err("may only contain lowercase ASCII letters, digits, and '_'".to_string());
    }

    if ident.chars().all(|c| c == '_') {
        return Err("must contain at least one letter".to_string());
    }

    Ok(())
}

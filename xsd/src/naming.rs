//! Identifier derivation for schema names.
//!
//! All functions are pure. Identifiers produced here must be usable verbatim by the emitters: they
//! never contain `-`, `.` or `:`, never start with a digit and are never a reserved word of the
//! target language.

use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    /// Reserved words of the default target language (C++).
    static ref RESERVED: HashSet<&'static str> = [
        "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
        "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
        "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
        "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
        "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
        "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
        "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
        "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
        "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
        "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
        "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
    ]
    .into_iter()
    .collect();
}

const TYPE_SUFFIX: &str = "Type";

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name)
}

/// Turns a schema name into an identifier.
///
/// `-`, `.` and `:` become `_`, a conventional `Type` suffix is dropped, a leading digit is
/// prefixed with `_` and reserved words get a trailing `_`.
pub fn sanitize(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if matches!(c, '-' | '.' | ':') { '_' } else { c })
        .collect();

    if ident.len() > TYPE_SUFFIX.len() && ident.ends_with(TYPE_SUFFIX) {
        ident.truncate(ident.len() - TYPE_SUFFIX.len());
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_reserved(&ident) {
        ident.push('_');
    }
    ident
}

/// Uppercases the first character and every character following a `-` or `_`; the separators
/// themselves are dropped. Everything else is kept verbatim.
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut make_upper = true;
    for c in s.chars() {
        if c == '-' || c == '_' {
            make_upper = true;
        } else if make_upper {
            result.push(c.to_ascii_uppercase());
            make_upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

pub fn to_upper_case(s: &str) -> String {
    s.to_ascii_uppercase()
}

/// Camel-cased identifier, re-prefixed with `_` when camel-casing exposed a leading digit. Names
/// made only of separators have no camel-cased form and are returned unchanged.
pub fn display_name(ident: &str) -> String {
    let camel = to_camel_case(ident);
    if camel.is_empty() {
        return ident.to_string();
    }
    guard_leading_digit(camel)
}

fn guard_leading_digit(mut ident: String) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Maps an enumeration literal onto something that can serve as an enum member name.
pub fn normalize_enum_value(s: &str) -> String {
    let mut value = s.replace(['-', ' '], "_");
    if let Some(stripped) = value.strip_suffix('+') {
        value = format!("{stripped}Plus");
    }
    if let Some(stripped) = value.strip_suffix('*') {
        value = format!("{stripped}Star");
    }
    value
}

/// Returns the local part of a qualified name.
pub fn strip_prefix(qname: &str) -> &str {
    match qname.split_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("foo-bar.baz:qux"), "foo_bar_baz_qux");
    }

    #[test]
    fn sanitize_strips_type_suffix() {
        assert_eq!(sanitize("ColorType"), "Color");
        assert_eq!(sanitize("Colortype"), "Colortype");
        assert_eq!(sanitize("Type"), "Type");
    }

    #[test]
    fn sanitize_prefixes_leading_digit() {
        assert_eq!(sanitize("3dPoint"), "_3dPoint");
        assert_eq!(sanitize("9Type"), "_9");
    }

    #[test]
    fn sanitize_escapes_reserved_words() {
        assert_eq!(sanitize("register"), "register_");
        assert_eq!(sanitize("class"), "class_");
        // the reserved word is only exposed after the suffix is gone
        assert_eq!(sanitize("classType"), "class_");
    }

    #[test]
    fn camel_case_drops_separators() {
        assert_eq!(to_camel_case("red-hot"), "RedHot");
        assert_eq!(to_camel_case("access_type"), "AccessType");
        assert_eq!(to_camel_case("cpuName"), "CpuName");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn display_name_keeps_identifiers_valid() {
        assert_eq!(display_name("_3d"), "_3d");
        assert_eq!(display_name("device"), "Device");
        assert_eq!(display_name("_"), "_");
        assert_eq!(display_name("__"), "__");
    }

    #[test]
    fn upper_case_is_ascii_only() {
        assert_eq!(to_upper_case("read-Write"), "READ-WRITE");
    }

    #[test]
    fn enum_values_are_normalized() {
        assert_eq!(normalize_enum_value("red-hot"), "red_hot");
        assert_eq!(normalize_enum_value("read only"), "read_only");
        assert_eq!(normalize_enum_value("C++"), "C+Plus");
        assert_eq!(normalize_enum_value("any*"), "anyStar");
        assert_eq!(normalize_enum_value("green"), "green");
    }

    #[test]
    fn strip_prefix_takes_local_part() {
        assert_eq!(strip_prefix("xs:int"), "int");
        assert_eq!(strip_prefix("plain"), "plain");
        assert_eq!(strip_prefix("a:b:c"), "b:c");
    }

    proptest! {
        #[test]
        fn sanitized_names_are_safe(name in "[A-Za-z0-9_.:-]{1,24}") {
            let ident = sanitize(&name);
            prop_assert!(!ident.contains(['-', '.', ':']));
            prop_assert!(!ident.starts_with(|c: char| c.is_ascii_digit()));
            prop_assert!(!is_reserved(&ident));
        }

        #[test]
        fn type_suffix_is_dropped(stem in "[A-Za-z][A-Za-z0-9]{0,12}") {
            prop_assume!(!stem.ends_with("Type"));
            let declared = format!("{stem}Type");
            prop_assert_eq!(sanitize(&declared), sanitize(&stem));
        }

        #[test]
        fn sanitize_is_deterministic(name in "\\PC{0,32}") {
            prop_assert_eq!(sanitize(&name), sanitize(&name));
        }
    }
}

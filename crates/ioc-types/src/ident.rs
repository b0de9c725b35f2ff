//! Identifier and name syntax checks.
//!
//! Two grammars are used throughout the container:
//!
//! - **Object identifiers** (`[A-Za-z0-9_]+`) name definitions. A leading
//!   digit is allowed.
//! - **Names** (`[A-Za-z_][A-Za-z0-9_]*`) are used for type names, method
//!   names, property names and map keys. A leading digit is rejected.
//!
//! Both grammars are ASCII-only.

use crate::error::{TypeError, TypeResult};

/// Returns `true` if `id` is a syntactically valid object identifier.
///
/// ```
/// use ioc_types::ident::is_valid_id;
///
/// assert!(is_valid_id("logger"));
/// assert!(is_valid_id("2nd_cache"));
/// assert!(!is_valid_id(""));
/// assert!(!is_valid_id("a-b"));
/// ```
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Returns `true` if `name` is a syntactically valid type/method/field name.
///
/// ```
/// use ioc_types::ident::is_valid_name;
///
/// assert!(is_valid_name("Widget"));
/// assert!(is_valid_name("_private"));
/// assert!(!is_valid_name("9lives"));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// Validate an object identifier.
pub fn validate_id(id: &str) -> TypeResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(TypeError::InvalidIdentifier(id.to_string()))
    }
}

/// Validate a name of the given kind (`"type"`, `"method"`, `"property"`, `"key"`).
pub fn validate_name(kind: &'static str, name: &str) -> TypeResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(TypeError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_ids() {
        assert!(is_valid_id("a"));
        assert!(is_valid_id("Logger"));
        assert!(is_valid_id("db_pool_2"));
        assert!(is_valid_id("123"));
        assert!(is_valid_id("_"));
    }

    #[test]
    fn reject_empty_id() {
        assert!(!is_valid_id(""));
        assert!(validate_id("").is_err());
    }

    #[test]
    fn reject_punctuation_in_id() {
        for bad in ["a-b", "a.b", "a b", "a'b", "a]b", "é"] {
            assert!(!is_valid_id(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn names_reject_leading_digit() {
        assert!(!is_valid_name("1abc"));
        assert!(is_valid_name("abc1"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn validate_name_reports_kind() {
        let err = validate_name("method", "bad name").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidName {
                kind: "method",
                name: "bad name".into()
            }
        );
    }

    proptest! {
        #[test]
        fn generated_ids_are_valid(id in "[A-Za-z0-9_]{1,32}") {
            prop_assert!(is_valid_id(&id));
        }

        #[test]
        fn any_forbidden_byte_invalidates_id(
            prefix in "[A-Za-z0-9_]{0,8}",
            bad in "[^A-Za-z0-9_]",
            suffix in "[A-Za-z0-9_]{0,8}",
        ) {
            let id = format!("{prefix}{bad}{suffix}");
            prop_assert!(!is_valid_id(&id));
        }

        #[test]
        fn every_valid_name_is_a_valid_id(name in "[A-Za-z_][A-Za-z0-9_]{0,16}") {
            prop_assert!(is_valid_name(&name));
            prop_assert!(is_valid_id(&name));
        }
    }
}

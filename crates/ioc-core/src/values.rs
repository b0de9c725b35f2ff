//! Interpretation of [`ValueSpec`] nodes into runtime [`Value`]s.

use indexmap::IndexMap;
use ioc_types::{validate_name, ScalarType, ValueSpec, Value};

use crate::cache::ResolutionStack;
use crate::error::{ContainerError, ContainerResult};
use crate::index::DefinitionIndex;

/// Resolves `ref` nodes to live instances.
pub trait ReferenceResolver {
    /// Resolve `target` on behalf of the definition `owner`.
    fn resolve_ref(&self, owner: &str, target: &str, stack: &mut ResolutionStack)
        -> ContainerResult<Value>;
}

/// Interprets one value specification tree.
pub struct ValueResolver<'a> {
    index: &'a DefinitionIndex,
    refs: &'a dyn ReferenceResolver,
    strict_names: bool,
}

impl<'a> ValueResolver<'a> {
    pub fn new(index: &'a DefinitionIndex, refs: &'a dyn ReferenceResolver, strict_names: bool) -> Self {
        Self {
            index,
            refs,
            strict_names,
        }
    }

    /// Resolve `spec`, declared by the definition `owner`.
    pub fn resolve(
        &self,
        owner: &str,
        spec: &ValueSpec,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<Value> {
        match spec {
            ValueSpec::Scalar {
                raw,
                ty,
                preserve_whitespace,
            } => {
                let text = if *preserve_whitespace { raw.as_str() } else { raw.trim() };
                let ty = match ty {
                    Some(name) => name
                        .parse::<ScalarType>()
                        .map_err(|e| ContainerError::parse(owner, e.to_string()))?,
                    None => ScalarType::String,
                };
                Ok(coerce(text, ty))
            }
            ValueSpec::Null => Ok(Value::Null),
            ValueSpec::IdRef { target } => {
                if !self.index.exists(target) {
                    return Err(ContainerError::instantiation(
                        owner,
                        format!("idref target {target} is not defined"),
                    ));
                }
                Ok(Value::String(target.clone()))
            }
            ValueSpec::Ref { target } => self.refs.resolve_ref(owner, target, stack),
            ValueSpec::List { items } => items
                .iter()
                .map(|item| self.resolve(owner, item, stack))
                .collect::<ContainerResult<Vec<_>>>()
                .map(Value::List),
            ValueSpec::Map { entries } => {
                let mut map = IndexMap::with_capacity(entries.len());
                for entry in entries {
                    if self.strict_names {
                        validate_name("map key", &entry.key)
                            .map_err(|e| ContainerError::parse(owner, e.to_string()))?;
                    }
                    // Every entry is resolved; the first declaration of a key wins.
                    let value = self.resolve(owner, &entry.value, stack)?;
                    map.entry(entry.key.clone()).or_insert(value);
                }
                Ok(Value::Map(map))
            }
            ValueSpec::Unrecognized { node } => Err(ContainerError::instantiation(
                owner,
                format!("unsupported value node '{node}'"),
            )),
        }
    }
}

/// Coerce scalar text to `ty`.
pub fn coerce(text: &str, ty: ScalarType) -> Value {
    match ty {
        ScalarType::Bool => Value::Bool(truthy(text)),
        ScalarType::Int => Value::Int(int_prefix(text)),
        ScalarType::Float => Value::Float(float_prefix(text)),
        ScalarType::String => Value::String(text.to_string()),
        ScalarType::Null => Value::Null,
    }
}

/// String truthiness: only `""` and `"0"` are false.
pub fn truthy(text: &str) -> bool {
    !(text.is_empty() || text == "0")
}

/// The longest leading decimal integer, ignoring leading whitespace.
/// Saturates on overflow and yields 0 when there are no digits.
pub fn int_prefix(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// The longest leading decimal float (sign, digits, fraction, exponent),
/// ignoring leading whitespace. Yields 0 when there is none.
pub fn float_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

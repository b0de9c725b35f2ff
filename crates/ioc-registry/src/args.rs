use ioc_types::{ObjectRef, Value};

use crate::error::{InvokeError, InvokeResult};

/// Positional arguments passed to a registered constructor or method.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// The argument at `index`, which must be present.
    pub fn value(&self, index: usize) -> InvokeResult<&Value> {
        self.0
            .get(index)
            .ok_or(InvokeError::MissingArgument { index })
    }

    pub fn int(&self, index: usize) -> InvokeResult<i64> {
        let value = self.value(index)?;
        value.as_int().ok_or_else(|| bad(index, "int", value))
    }

    pub fn float(&self, index: usize) -> InvokeResult<f64> {
        let value = self.value(index)?;
        value.as_float().ok_or_else(|| bad(index, "float", value))
    }

    pub fn bool(&self, index: usize) -> InvokeResult<bool> {
        let value = self.value(index)?;
        value.as_bool().ok_or_else(|| bad(index, "bool", value))
    }

    pub fn string(&self, index: usize) -> InvokeResult<&str> {
        let value = self.value(index)?;
        value.as_str().ok_or_else(|| bad(index, "string", value))
    }

    pub fn object(&self, index: usize) -> InvokeResult<&ObjectRef> {
        let value = self.value(index)?;
        value.as_object().ok_or_else(|| bad(index, "object", value))
    }

    /// Fails unless exactly `count` arguments were supplied.
    pub fn expect_len(&self, count: usize) -> InvokeResult<()> {
        if self.0.len() < count {
            return Err(InvokeError::MissingArgument { index: self.0.len() });
        }
        if self.0.len() > count {
            return Err(InvokeError::failed(format!(
                "expected {count} arguments, got {}",
                self.0.len()
            )));
        }
        Ok(())
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

fn bad(index: usize, expected: &'static str, actual: &Value) -> InvokeError {
    InvokeError::BadArgument {
        index,
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let args = Args::new(vec![
            Value::Int(5),
            Value::Float(1.5),
            Value::Bool(true),
            Value::from("name"),
        ]);
        assert_eq!(args.int(0).unwrap(), 5);
        assert_eq!(args.float(1).unwrap(), 1.5);
        assert_eq!(args.float(0).unwrap(), 5.0);
        assert!(args.bool(2).unwrap());
        assert_eq!(args.string(3).unwrap(), "name");
    }

    #[test]
    fn missing_and_mismatched_arguments() {
        let args = Args::new(vec![Value::from("x")]);
        assert_eq!(args.int(1), Err(InvokeError::MissingArgument { index: 1 }));
        assert_eq!(
            args.int(0),
            Err(InvokeError::BadArgument {
                index: 0,
                expected: "int",
                actual: "string"
            })
        );
        assert!(args.object(0).is_err());
    }

    #[test]
    fn expect_len_checks_both_directions() {
        let args = Args::new(vec![Value::Null, Value::Null]);
        assert!(args.expect_len(2).is_ok());
        assert_eq!(
            args.expect_len(3),
            Err(InvokeError::MissingArgument { index: 2 })
        );
        assert!(args.expect_len(1).is_err());
    }
}

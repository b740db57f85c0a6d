//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A value on the operand stack or in a local slot.
///
/// Arrays are untyped shared buffers; element access never checks the
/// element category, matching the interpreter's lenient treatment of
/// locals.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Null,
}

impl Value {
    /// A fresh zero-filled array.
    pub fn int_array(len: usize) -> Value {
        Value::Array(Rc::new(RefCell::new(vec![Value::Int(0); len])))
    }

    /// An array holding the given values.
    pub fn array_of(values: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(values)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::array_of(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn arrays_share_storage() {
        let a = Value::int_array(2);
        let b = a.clone();
        if let Value::Array(items) = &a {
            items.borrow_mut()[0] = Value::Int(9);
        }
        assert_eq!(a, b);
    }
}

//! Classes: a name and an ordered sequence of owned methods.

use crate::method::Method;

/// A class, as produced by an external decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Internal name, e.g. `lab/Example`.
    pub name: String,
    pub methods: Vec<Method>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Look up a method by name and descriptor.
    pub fn method(&self, name: &str, desc: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.desc == desc)
    }

    /// Look up a method by name alone; `None` when absent or ambiguous.
    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        let mut found = self.methods.iter().filter(|m| m.name == name);
        let first = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_lookup_by_name_and_desc() {
        let mut class = Class::new("Example");
        class.methods.push(Method::new("f", "(I)I", true));
        class.methods.push(Method::new("f", "(J)J", true));

        assert!(class.method("f", "(I)I").is_some());
        assert!(class.method("f", "(D)D").is_none());
        // Overloads make name-only lookup ambiguous.
        assert!(class.method_by_name("f").is_none());
    }

    #[test]
    fn method_by_name_unique() {
        let mut class = Class::new("Example");
        class.methods.push(Method::new("g", "()V", false));
        assert_eq!(class.method_by_name("g").unwrap().desc, "()V");
        assert!(class.method_by_name("missing").is_none());
    }
}

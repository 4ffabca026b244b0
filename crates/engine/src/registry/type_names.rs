/// The type of a field, kept as a string in SDL notation (e.g. `[Int]!`).
///
/// A newtype rather than a parsed tree: the handful of questions the engine
/// asks (nullability, list-ness, named type) are answered directly off the
/// string.
#[derive(Clone, Default, Hash, Debug, PartialEq, Eq)]
pub struct MetaFieldType(String);

impl From<&str> for MetaFieldType {
    fn from(value: &str) -> MetaFieldType {
        MetaFieldType(value.to_string())
    }
}

impl From<String> for MetaFieldType {
    fn from(value: String) -> MetaFieldType {
        MetaFieldType(value)
    }
}

impl std::fmt::Display for MetaFieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl MetaFieldType {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_non_null(&self) -> bool {
        self.0.ends_with('!')
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    // starts_with covers both nullable and non-nullable lists.
    pub fn is_list(&self) -> bool {
        self.0.starts_with('[')
    }

    /// The named type with all list and non-null wrappers stripped.
    pub fn named_type(&self) -> &str {
        self.0
            .trim_start_matches('[')
            .trim_end_matches(|c| c == ']' || c == '!')
    }

    /// For a list type, the type of its items.
    pub fn list_item_type(&self) -> Option<MetaFieldType> {
        self.0
            .trim_end_matches('!')
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|inner| MetaFieldType(inner.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers() {
        let ty = MetaFieldType::from("[Post!]!");
        assert!(ty.is_non_null());
        assert!(ty.is_list());
        assert_eq!(ty.named_type(), "Post");
        assert_eq!(ty.list_item_type(), Some(MetaFieldType::from("Post!")));

        let ty = MetaFieldType::from("String");
        assert!(ty.is_nullable());
        assert!(!ty.is_list());
        assert_eq!(ty.named_type(), "String");
        assert_eq!(ty.list_item_type(), None);
    }
}

/// Response path of an error, from the operation root down to the field
/// that produced it. Keys for fields, indices for list items.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Default)]
pub struct ErrorPath(Vec<ErrorPathSegment>);

impl ErrorPath {
    pub fn push(&mut self, segment: impl Into<ErrorPathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<ErrorPathSegment> {
        self.0.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorPathSegment> + '_ {
        self.0.iter()
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum ErrorPathSegment {
    Field(String),
    Index(usize),
}

impl From<String> for ErrorPathSegment {
    fn from(name: String) -> Self {
        ErrorPathSegment::Field(name)
    }
}

impl From<&str> for ErrorPathSegment {
    fn from(name: &str) -> Self {
        ErrorPathSegment::Field(name.to_string())
    }
}

impl From<usize> for ErrorPathSegment {
    fn from(index: usize) -> Self {
        ErrorPathSegment::Index(index)
    }
}

impl<S: Into<ErrorPathSegment>> FromIterator<S> for ErrorPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ErrorPath(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<ErrorPathSegment>> From<Vec<S>> for ErrorPath {
    fn from(segments: Vec<S>) -> Self {
        segments.into_iter().collect()
    }
}

impl serde::Serialize for ErrorPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.0)
    }
}

impl serde::Serialize for ErrorPathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ErrorPathSegment::Field(name) => serializer.serialize_str(name),
            ErrorPathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl std::fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            match segment {
                ErrorPathSegment::Field(name) => f.write_str(name)?,
                ErrorPathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

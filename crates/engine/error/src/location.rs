use std::fmt;

// 65 KB for a query without any new lines is already huge, so u16 keeps
// locations compact. If anyone ever hits it we'll widen to u32.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Location {
    /// One-based line number.
    pub line: u16,
    /// One-based column number.
    pub column: u16,
}

impl Location {
    pub fn new(line: u16, column: u16) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

use std::fmt;

/// A named lexical unit produced by matching a pattern against input text.
///
/// `position` is the byte offset of the first matched character in the
/// original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(name: impl Into<String>, value: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at offset {}", self.name, self.value, self.position)
    }
}

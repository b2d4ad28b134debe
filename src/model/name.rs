use std::fmt;

/// A DNS name in canonical form: lowercase labels, fully qualified with the
/// trailing root dot. All cache keys and owner comparisons go through this
/// type, which is what makes lookups case-insensitive.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(input: &str) -> Self {
        let mut inner = input.trim_end_matches('.').to_lowercase();
        inner.push('.');
        Self(inner)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The form the wire codec expects: no trailing root dot.
    pub fn wire(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

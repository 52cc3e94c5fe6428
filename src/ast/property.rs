use std::fmt;

/// Ordered member names addressing a possibly nested field.
///
/// Paths compare case-insensitively, the same way they are resolved
/// against member lists.
///
/// # Examples
/// ```text
/// Name                 -> ["Name"]
/// Address.City         -> ["Address", "City"]
/// Address/City         -> ["Address", "City"]
/// (Address,City)       -> ["Address", "City"]
/// ```
#[derive(Debug, Clone, Eq)]
pub struct Property {
    segments: Vec<String>,
}

impl Property {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Property {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dotted path into its segments.
    pub fn parse(path: &str) -> Self {
        Property::new(path.split('.').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Appends every segment of `other`.
    pub fn extend(&mut self, other: Property) {
        self.segments.extend(other.segments);
    }

    /// True when `prefix`'s segments open this path.
    pub fn starts_with(&self, prefix: &Property, case_sensitive: bool) -> bool {
        prefix.len() <= self.len()
            && prefix
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(a, b)| segment_eq(a, b, case_sensitive))
    }

    pub fn matches(&self, other: &Property, case_sensitive: bool) -> bool {
        self.len() == other.len() && self.starts_with(other, case_sensitive)
    }

    /// Dotted form, e.g. `Address.City`.
    pub fn path(&self) -> String {
        self.segments.join(".")
    }
}

fn segment_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other, false)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<&str> for Property {
    fn from(path: &str) -> Self {
        Property::parse(path)
    }
}

/// Direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One key of a `sort(...)` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortProperty {
    pub order: SortOrder,
    pub property: Property,
}

impl SortProperty {
    pub fn new(order: SortOrder, property: impl Into<Property>) -> Self {
        SortProperty {
            order,
            property: property.into(),
        }
    }

    pub fn ascending(property: impl Into<Property>) -> Self {
        Self::new(SortOrder::Ascending, property)
    }

    pub fn descending(property: impl Into<Property>) -> Self {
        Self::new(SortOrder::Descending, property)
    }
}

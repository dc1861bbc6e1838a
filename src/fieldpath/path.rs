//! Path element and path types.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// PathElement represents one level of navigation into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// Field name of an object member.
    FieldName(String),
    /// Merge keys identifying an element of a merge-by-key list.
    Key(Vec<(String, Value)>),
    /// Position of an array element.
    Index(usize),
}

impl PathElement {
    /// Creates a new field name path element.
    pub fn field_name(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }

    /// Creates a new key path element.
    pub fn key(fields: Vec<(String, Value)>) -> Self {
        PathElement::Key(fields)
    }

    /// Creates a new index path element.
    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// Returns the field name if this is a field name element.
    pub fn as_field_name(&self) -> Option<&str> {
        match self {
            PathElement::FieldName(name) => Some(name),
            _ => None,
        }
    }
}

impl PartialOrd for PathElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathElement {
    fn cmp(&self, other: &Self) -> Ordering {
        fn type_order(pe: &PathElement) -> u8 {
            match pe {
                PathElement::FieldName(_) => 0,
                PathElement::Key(_) => 1,
                PathElement::Index(_) => 2,
            }
        }

        match (self, other) {
            (PathElement::FieldName(a), PathElement::FieldName(b)) => a.cmp(b),
            (PathElement::Index(a), PathElement::Index(b)) => a.cmp(b),
            // serde_json values have no total order; their rendering is stable enough
            (PathElement::Key(_), PathElement::Key(_)) => self.to_string().cmp(&other.to_string()),
            _ => type_order(self).cmp(&type_order(other)),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::FieldName(name) => write!(f, ".{}", name),
            PathElement::Key(fields) => {
                write!(f, "[")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                write!(f, "]")
            }
            PathElement::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Path is the location of a value inside a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Path { elements }
    }

    /// Parses a dotted path such as `metadata.labels` into field name elements.
    ///
    /// A leading dot is accepted so rendered paths can be fed back in.
    pub fn parse_dotted(dotted: &str) -> Self {
        dotted
            .trim_start_matches('.')
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(PathElement::field_name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut new_path = self.clone();
        new_path.push(element);
        new_path
    }

    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_display() {
        let path = Path::from_elements(vec![
            PathElement::field_name("spec"),
            PathElement::field_name("containers"),
            PathElement::index(1),
            PathElement::field_name("image"),
        ]);
        assert_eq!(path.to_string(), ".spec.containers[1].image");
    }

    #[test]
    fn test_key_display() {
        let path = Path::new()
            .with(PathElement::field_name("ports"))
            .with(PathElement::key(vec![("port".to_string(), json!(80))]));
        assert_eq!(path.to_string(), ".ports[port=80]");
    }

    #[test]
    fn test_parse_dotted() {
        let path = Path::parse_dotted("metadata.resourceVersion");
        assert_eq!(path.len(), 2);
        assert_eq!(path.as_slice()[1].as_field_name(), Some("resourceVersion"));
        assert_eq!(Path::parse_dotted(".status"), Path::parse_dotted("status"));
        assert!(Path::parse_dotted("").is_empty());
    }

    #[test]
    fn test_path_element_ordering() {
        let a = PathElement::field_name("a");
        let b = PathElement::field_name("b");
        assert!(a < b);
        // Field names come before indices
        assert!(b < PathElement::index(0));
    }
}

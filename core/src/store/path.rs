use std::fmt;

/// Location of a collection: the collection name plus the chain of
/// (collection, document id) pairs above it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub(crate) ancestors: Vec<(String, String)>,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub(crate) collection: CollectionPath,
    pub(crate) id: String,
}

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self {
            ancestors: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when `self` is `other` or a sub-collection somewhere below it.
    pub fn is_within(&self, other: &CollectionPath) -> bool {
        let depth = other.ancestors.len();
        if self.ancestors.len() < depth || self.ancestors[..depth] != other.ancestors[..] {
            return false;
        }
        match self.ancestors.get(depth) {
            Some((collection, _)) => *collection == other.name,
            None => self.name == other.name,
        }
    }
}

impl DocumentPath {
    pub fn collection(&self, name: &str) -> CollectionPath {
        let mut ancestors = self.collection.ancestors.clone();
        ancestors.push((self.collection.name.clone(), self.id.clone()));
        CollectionPath {
            ancestors,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (collection, id) in &self.ancestors {
            write!(f, "{}/{}/", collection, id)?;
        }
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = CollectionPath::root("classes").doc("abc").collection("attendance");
        assert_eq!(path.to_string(), "classes/abc/attendance");
        assert_eq!(path.doc("r1").to_string(), "classes/abc/attendance/r1");
    }

    #[test]
    fn test_is_within() {
        let classes = CollectionPath::root("classes");
        let attendance = classes.doc("abc").collection("attendance");
        let other = CollectionPath::root("teachers");

        assert!(classes.is_within(&classes));
        assert!(attendance.is_within(&classes));
        assert!(!classes.is_within(&attendance));
        assert!(!attendance.is_within(&other));
        assert!(!other.is_within(&classes));
    }
}

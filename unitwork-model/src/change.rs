use crate::{Property, State};

/// A property whose frozen value differs from its current value.
///
/// For collection properties `old` and `new` hold the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarChange {
    property: Property,
    old: State,
    new: State,
}

impl ScalarChange {
    pub fn new(property: impl Into<Property>, old: impl Into<State>, new: impl Into<State>) -> Self {
        Self {
            property: property.into(),
            old: old.into(),
            new: new.into(),
        }
    }
}

/// One entry of a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Scalar(ScalarChange),
}

impl Change {
    /// Shorthand for `Change::Scalar(ScalarChange::new(..))`.
    pub fn scalar(property: impl Into<Property>, old: impl Into<State>, new: impl Into<State>) -> Self {
        Self::Scalar(ScalarChange::new(property, old, new))
    }

    pub fn property(&self) -> &Property {
        match self {
            Self::Scalar(change) => &change.property,
        }
    }

    /// Value held when the baseline snapshot was taken.
    pub fn old_value(&self) -> &State {
        match self {
            Self::Scalar(change) => &change.old,
        }
    }

    /// Value held now.
    pub fn new_value(&self) -> &State {
        match self {
            Self::Scalar(change) => &change.new,
        }
    }
}

/// Ordered differences between a snapshot and live state.
///
/// Order follows the definition's observed properties; equality is
/// order-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn new(changes: Vec<Change>) -> Self {
        Self(changes)
    }

    pub fn push(&mut self, change: Change) {
        self.0.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }

    /// Returns the change recorded for a property, if any.
    pub fn get(&self, property: &str) -> Option<&Change> {
        self.0.iter().find(|change| change.property() == property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn into_inner(self) -> Vec<Change> {
        self.0
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

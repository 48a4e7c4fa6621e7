//! Label map: label name -> index of the next emitted word

use indexmap::IndexMap;

use crate::error::SemanticError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: IndexMap<String, usize>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `index`. Each name may be bound once per program.
    pub fn bind(&mut self, name: &str, index: usize) -> Result<(), SemanticError> {
        if self.labels.contains_key(name) {
            return Err(SemanticError::DuplicateLabel(name.to_string()));
        }
        self.labels.insert(name.to_string(), index);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Labels bound to `index`, in definition order.
    pub fn labels_at(&self, index: usize) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |&(_, &at)| at == index)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, &at)| (name.as_str(), at))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates() {
        let mut labels = LabelMap::new();
        labels.bind("loop", 0).unwrap();
        assert_eq!(
            labels.bind("loop", 3),
            Err(SemanticError::DuplicateLabel("loop".into()))
        );
        assert_eq!(labels.get("loop"), Some(0));
    }

    #[test]
    fn several_labels_may_share_an_index() {
        let mut labels = LabelMap::new();
        labels.bind("a", 2).unwrap();
        labels.bind("b", 5).unwrap();
        labels.bind("c", 2).unwrap();
        assert_eq!(labels.labels_at(2).collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(labels.labels_at(1).count(), 0);
        assert_eq!(labels.len(), 3);
    }
}

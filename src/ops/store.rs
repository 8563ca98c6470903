use std::collections::BTreeSet;

use crate::model::classification::{Classification, Counts, Preferences};

/// Error raised when a mutation could not be persisted.
///
/// The in-memory store has already been updated when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not save preferences: {0}")]
    Persist(String),
}

/// Receives the full snapshot after every mutation of a [`ClassificationStore`].
pub trait PreferenceSink {
    fn persist(&mut self, prefs: &Preferences) -> Result<(), StoreError>;
}

/// In-memory hidden / interested / selected partition over event identities.
///
/// The three sets are kept pairwise disjoint on every mutation. Identities are
/// not checked against the loaded schedule.
#[derive(Default)]
pub struct ClassificationStore {
    prefs: Preferences,
    sink: Option<Box<dyn PreferenceSink>>,
}

impl std::fmt::Debug for ClassificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationStore")
            .field("prefs", &self.prefs)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl ClassificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that persists through `sink` after every mutation.
    pub fn with_sink(sink: Box<dyn PreferenceSink>) -> Self {
        ClassificationStore {
            prefs: Preferences::default(),
            sink: Some(sink),
        }
    }

    /// Seed the store from previously saved preferences without persisting.
    /// Overlapping entries are resolved the same way as [`Self::replace_all`].
    pub fn load(&mut self, prefs: Preferences) {
        self.prefs = normalize(prefs.hidden, prefs.interested, prefs.selected);
    }

    pub fn snapshot(&self) -> &Preferences {
        &self.prefs
    }

    pub fn counts(&self) -> Counts {
        self.prefs.counts()
    }

    pub fn ids(&self, class: Classification) -> &BTreeSet<String> {
        self.prefs.set(class)
    }

    pub fn contains(&self, class: Classification, id: &str) -> bool {
        self.prefs.set(class).contains(id)
    }

    pub fn classification_of(&self, id: &str) -> Option<Classification> {
        [
            Classification::Hidden,
            Classification::Interested,
            Classification::Selected,
        ]
        .into_iter()
        .find(|&c| self.contains(c, id))
    }

    pub fn set_hidden(&mut self, id: &str) -> Result<Option<Classification>, StoreError> {
        self.toggle(Classification::Hidden, id)
    }

    pub fn set_interested(&mut self, id: &str) -> Result<Option<Classification>, StoreError> {
        self.toggle(Classification::Interested, id)
    }

    pub fn set_selected(&mut self, id: &str) -> Result<Option<Classification>, StoreError> {
        self.toggle(Classification::Selected, id)
    }

    /// Toggle `id` in the target set. Removes it if already there; otherwise
    /// adds it and removes it from the other two sets. Returns the id's
    /// classification afterwards.
    pub fn toggle(
        &mut self,
        class: Classification,
        id: &str,
    ) -> Result<Option<Classification>, StoreError> {
        let result = if self.contains(class, id) {
            set_mut(&mut self.prefs, class).remove(id);
            None
        } else {
            insert_exclusive(&mut self.prefs, class, id.to_string());
            Some(class)
        };
        self.persist()?;
        Ok(result)
    }

    /// Empty only the hidden set.
    pub fn clear_hidden(&mut self) -> Result<(), StoreError> {
        self.prefs.hidden.clear();
        self.persist()
    }

    /// Replace all three sets at once. If an id appears in more than one
    /// input, sets applied later win, in the order hidden, interested,
    /// selected.
    pub fn replace_all<I, J, K>(
        &mut self,
        hidden: I,
        interested: J,
        selected: K,
    ) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
    {
        self.prefs = normalize(hidden, interested, selected);
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        match self.sink.as_mut() {
            Some(sink) => sink.persist(&self.prefs),
            None => Ok(()),
        }
    }
}

fn set_mut(prefs: &mut Preferences, class: Classification) -> &mut BTreeSet<String> {
    match class {
        Classification::Hidden => &mut prefs.hidden,
        Classification::Interested => &mut prefs.interested,
        Classification::Selected => &mut prefs.selected,
    }
}

fn insert_exclusive(prefs: &mut Preferences, class: Classification, id: String) {
    prefs.hidden.remove(&id);
    prefs.interested.remove(&id);
    prefs.selected.remove(&id);
    set_mut(prefs, class).insert(id);
}

fn normalize<I, J, K>(hidden: I, interested: J, selected: K) -> Preferences
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
    K: IntoIterator<Item = String>,
{
    let mut prefs = Preferences::default();
    for id in hidden {
        insert_exclusive(&mut prefs, Classification::Hidden, id);
    }
    for id in interested {
        insert_exclusive(&mut prefs, Classification::Interested, id);
    }
    for id in selected {
        insert_exclusive(&mut prefs, Classification::Selected, id);
    }
    prefs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FILM_A: &str = "Film A-10:00-Hall 1-Dilluns-12";

    /// Records every snapshot it is handed.
    struct Recorder(Rc<RefCell<Vec<Preferences>>>);

    impl PreferenceSink for Recorder {
        fn persist(&mut self, prefs: &Preferences) -> Result<(), StoreError> {
            self.0.borrow_mut().push(prefs.clone());
            Ok(())
        }
    }

    struct Failing;

    impl PreferenceSink for Failing {
        fn persist(&mut self, _prefs: &Preferences) -> Result<(), StoreError> {
            Err(StoreError::Persist("disk full".into()))
        }
    }

    fn in_at_most_one(store: &ClassificationStore, id: &str) -> bool {
        [
            Classification::Hidden,
            Classification::Interested,
            Classification::Selected,
        ]
        .iter()
        .filter(|&&c| store.contains(c, id))
        .count()
            <= 1
    }

    #[test]
    fn selected_then_hidden_moves_to_hidden() {
        let mut store = ClassificationStore::new();
        store.set_interested("other").unwrap();
        store.set_selected(FILM_A).unwrap();
        store.set_hidden(FILM_A).unwrap();

        assert!(!store.contains(Classification::Selected, FILM_A));
        assert!(store.contains(Classification::Hidden, FILM_A));
        assert_eq!(store.ids(Classification::Interested).len(), 1);
        assert!(store.contains(Classification::Interested, "other"));
    }

    #[test]
    fn toggling_twice_removes() {
        let mut store = ClassificationStore::new();
        assert_eq!(
            store.set_interested(FILM_A).unwrap(),
            Some(Classification::Interested)
        );
        assert_eq!(store.set_interested(FILM_A).unwrap(), None);
        assert_eq!(store.classification_of(FILM_A), None);
    }

    #[test]
    fn disjoint_after_every_toggle() {
        let mut store = ClassificationStore::new();
        let sequence = [
            Classification::Hidden,
            Classification::Interested,
            Classification::Interested,
            Classification::Selected,
            Classification::Hidden,
            Classification::Selected,
            Classification::Selected,
            Classification::Interested,
        ];
        for class in sequence {
            store.toggle(class, FILM_A).unwrap();
            assert!(in_at_most_one(&store, FILM_A));
        }
    }

    #[test]
    fn clear_hidden_leaves_other_sets() {
        let mut store = ClassificationStore::new();
        store.set_hidden("a").unwrap();
        store.set_hidden("b").unwrap();
        store.set_selected("c").unwrap();
        store.clear_hidden().unwrap();
        assert_eq!(store.counts(), Counts { hidden: 0, interested: 0, selected: 1 });
    }

    #[test]
    fn replace_all_keeps_sets_disjoint() {
        let mut store = ClassificationStore::new();
        store.set_hidden("old").unwrap();
        store
            .replace_all(
                vec!["x".to_string(), "y".to_string()],
                vec!["y".to_string()],
                vec!["x".to_string()],
            )
            .unwrap();
        assert_eq!(store.classification_of("old"), None);
        assert_eq!(store.classification_of("x"), Some(Classification::Selected));
        assert_eq!(store.classification_of("y"), Some(Classification::Interested));
        assert!(store.ids(Classification::Hidden).is_empty());
    }

    #[test]
    fn every_mutation_notifies_sink() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut store = ClassificationStore::with_sink(Box::new(Recorder(log.clone())));
        store.set_interested("a").unwrap();
        store.set_selected("a").unwrap();
        store.clear_hidden().unwrap();
        store.replace_all(Vec::new(), Vec::new(), vec!["b".to_string()]).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert!(log[1].selected.contains("a"));
        assert!(log[1].interested.is_empty());
        assert!(log[3].selected.contains("b"));
    }

    #[test]
    fn load_does_not_persist() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut store = ClassificationStore::with_sink(Box::new(Recorder(log.clone())));
        let mut prefs = Preferences::default();
        prefs.hidden.insert("a".into());
        store.load(prefs);
        assert!(log.borrow().is_empty());
        assert!(store.contains(Classification::Hidden, "a"));
    }

    #[test]
    fn sink_failure_is_reported_after_mutation() {
        let mut store = ClassificationStore::with_sink(Box::new(Failing));
        assert!(store.set_selected(FILM_A).is_err());
        assert!(store.contains(Classification::Selected, FILM_A));
    }
}

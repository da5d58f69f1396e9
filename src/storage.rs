use gloo_storage::{LocalStorage, Storage};
use log::warn;
use serde_json::Value;
use thiserror::Error;

use crate::config::{ACTIVE_TOUR_KEY, THEME_KEY, VISITED_KEY};
use crate::data::number_text;
use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write '{key}': {message}")]
    Write { key: String, message: String },
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string access to durable, origin-scoped storage.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The browser's `localStorage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn read(&self, key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("Could not read '{}' from local storage: {:?}", key, err);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StorageError::Write {
                key: key.to_owned(),
                message: format!("{err:?}"),
            })
    }
}

/// Stop ids the visitor has marked, kept in the order they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    ids: Vec<String>,
}

impl VisitedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|visited| visited == id)
    }

    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_owned());
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|visited| visited != id);
        self.ids.len() != before
    }

    /// Flips membership and reports whether `id` is now visited.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id)
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id.as_ref());
        }
        set
    }
}

pub fn load_visited_set(store: &impl KeyValueStore) -> VisitedSet {
    let Some(raw) = store.read(VISITED_KEY) else {
        return VisitedSet::default();
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(number_text(id)),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            warn!("Ignoring stored visited stops: not a list");
            VisitedSet::default()
        }
        Err(err) => {
            warn!("Falling back to empty visited stops: {}", err);
            VisitedSet::default()
        }
    }
}

pub fn save_visited_set(store: &impl KeyValueStore, visited: &VisitedSet) {
    let encoded = serde_json::to_string(&visited.ids).map_err(|source| StorageError::Encode {
        key: VISITED_KEY.to_owned(),
        source,
    });
    if let Err(err) = encoded.and_then(|json| store.write(VISITED_KEY, &json)) {
        warn!("Failed to persist visited stops: {}", err);
    }
}

pub fn load_scalar(store: &impl KeyValueStore, key: &str, default: &str) -> String {
    store
        .read(key)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

pub fn save_scalar(store: &impl KeyValueStore, key: &str, value: &str) {
    if let Err(err) = store.write(key, value) {
        warn!("Failed to persist preference: {}", err);
    }
}

pub fn load_active_tour_id(store: &impl KeyValueStore) -> Option<String> {
    Some(load_scalar(store, ACTIVE_TOUR_KEY, "")).filter(|id| !id.is_empty())
}

pub fn save_active_tour_id(store: &impl KeyValueStore, tour_id: &str) {
    save_scalar(store, ACTIVE_TOUR_KEY, tour_id);
}

pub fn load_theme(store: &impl KeyValueStore) -> Theme {
    let raw = load_scalar(store, THEME_KEY, Theme::default().as_str());
    raw.parse().unwrap_or_else(|_| {
        warn!("Unknown stored theme '{}', using the default", raw);
        Theme::default()
    })
}

pub fn save_theme(store: &impl KeyValueStore, theme: Theme) {
    save_scalar(store, THEME_KEY, theme.as_str());
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::{KeyValueStore, StorageError};

    /// Shares its map between clones, like every handle to `localStorage` does.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemoryStore {
        entries: Rc<RefCell<HashMap<String, String>>>,
    }

    impl KeyValueStore for MemoryStore {
        fn read(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.entries
                .borrow_mut()
                .insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }
}

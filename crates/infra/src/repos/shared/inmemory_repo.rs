use medremind_domain::{Entity, ID};

/// Useful functions for working on in memory entity collections

pub fn insert<T: Clone>(val: &T, collection: &mut Vec<T>) {
    collection.push(val.clone());
}

/// Replaces the entity with the same id. Returns false when there was none.
pub fn save<T: Clone + Entity>(val: &T, collection: &mut [T]) -> bool {
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) => {
            *item = val.clone();
            true
        }
        None => false,
    }
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &[T]) -> Option<T> {
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &[T], mut compare: F) -> Vec<T> {
    collection
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

pub fn delete<T: Clone + Entity>(val_id: &ID, collection: &mut Vec<T>) -> Option<T> {
    let index = collection.iter().position(|item| item.id() == val_id)?;
    Some(collection.remove(index))
}

//! Field-name matching for structured decoders.

use hashbrown::HashMap;

/// Maps raw property-name bytes to a slot index.
///
/// Built once by a codec at construction time and consulted for every
/// property read while decoding.
#[derive(Debug, Clone, Default)]
pub struct FieldMatcher {
    slots: HashMap<Box<[u8]>, usize>,
}

impl FieldMatcher {
    /// Slot `i` is assigned to `names[i]`.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let slots = names
            .iter()
            .enumerate()
            .map(|(index, name)| (Box::from(name.as_ref().as_bytes()), index))
            .collect();
        Self { slots }
    }

    pub fn try_get(&self, name: &[u8]) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_bytes_only() {
        let matcher = FieldMatcher::new(&["Id", "Name"]);
        assert_eq!(matcher.try_get(b"Id"), Some(0));
        assert_eq!(matcher.try_get(b"Name"), Some(1));
        assert_eq!(matcher.try_get(b"name"), None);
        assert_eq!(matcher.try_get(b""), None);
    }
}

//! Versioned values and per-key version chains.

use crate::types::TransactionId;

/// One version of a key's value.
///
/// A version records the transaction that created it and, once
/// superseded or deleted, the transaction that ended it. The end marker
/// is written at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    created_by: TransactionId,
    ended_by: Option<TransactionId>,
    payload: String,
}

impl VersionedValue {
    /// Creates a live version written by `created_by`.
    pub fn new(created_by: TransactionId, payload: impl Into<String>) -> Self {
        Self {
            created_by,
            ended_by: None,
            payload: payload.into(),
        }
    }

    /// Returns the transaction that wrote this version.
    #[must_use]
    pub fn created_by(&self) -> TransactionId {
        self.created_by
    }

    /// Returns the transaction that ended this version, if any.
    #[must_use]
    pub fn ended_by(&self) -> Option<TransactionId> {
        self.ended_by
    }

    /// Returns the stored value.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns true if no transaction has ended this version.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.ended_by.is_none()
    }

    /// Marks the version as ended by `txid`.
    ///
    /// Returns false and leaves the version untouched if it was already
    /// ended.
    pub(crate) fn close(&mut self, txid: TransactionId) -> bool {
        if self.ended_by.is_some() {
            return false;
        }
        self.ended_by = Some(txid);
        true
    }
}

/// Every version ever written for one key, oldest first.
///
/// The chain only grows. Closing a version is the only in-place change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionChain {
    versions: Vec<VersionedValue>,
}

impl VersionChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns true if no version was ever written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Returns all versions, oldest first.
    #[must_use]
    pub fn versions(&self) -> &[VersionedValue] {
        &self.versions
    }

    /// Iterates versions from the most recently created to the oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &VersionedValue> {
        self.versions.iter().rev()
    }

    /// Returns the number of versions nobody has ended.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.versions.iter().filter(|v| v.is_live()).count()
    }

    /// Finds the newest version accepted by `visible`.
    pub fn find_visible<F>(&self, visible: F) -> Option<&VersionedValue>
    where
        F: Fn(&VersionedValue) -> bool,
    {
        self.newest_first().find(|&v| visible(v))
    }

    /// Appends a new version.
    pub(crate) fn push(&mut self, value: VersionedValue) {
        self.versions.push(value);
    }

    /// Ends every version accepted by `visible`, on behalf of `txid`.
    ///
    /// Visibility is decided for the whole chain before anything is
    /// closed. Returns the number of versions closed.
    pub(crate) fn close_visible<F>(&mut self, txid: TransactionId, visible: F) -> usize
    where
        F: Fn(&VersionedValue) -> bool,
    {
        let targets: Vec<usize> = self
            .versions
            .iter()
            .enumerate()
            .rev()
            .filter(|&(_, v)| visible(v))
            .map(|(idx, _)| idx)
            .collect();

        targets
            .into_iter()
            .filter(|&idx| self.versions[idx].close(txid))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: u64) -> TransactionId {
        TransactionId::new(id)
    }

    #[test]
    fn new_value_is_live() {
        let value = VersionedValue::new(tx(1), "hey");
        assert!(value.is_live());
        assert_eq!(value.created_by(), tx(1));
        assert_eq!(value.ended_by(), None);
        assert_eq!(value.payload(), "hey");
    }

    #[test]
    fn close_is_write_once() {
        let mut value = VersionedValue::new(tx(1), "hey");
        assert!(value.close(tx(2)));
        assert!(!value.close(tx(3)));
        assert_eq!(value.ended_by(), Some(tx(2)));
    }

    #[test]
    fn newest_first_reverses_creation_order() {
        let mut chain = VersionChain::new();
        chain.push(VersionedValue::new(tx(1), "a"));
        chain.push(VersionedValue::new(tx(2), "b"));

        let payloads: Vec<_> = chain.newest_first().map(VersionedValue::payload).collect();
        assert_eq!(payloads, vec!["b", "a"]);
    }

    #[test]
    fn find_visible_prefers_newest() {
        let mut chain = VersionChain::new();
        chain.push(VersionedValue::new(tx(1), "a"));
        chain.push(VersionedValue::new(tx(2), "b"));

        let found = chain.find_visible(|_| true).unwrap();
        assert_eq!(found.payload(), "b");
        assert!(chain.find_visible(|_| false).is_none());
    }

    #[test]
    fn close_visible_closes_every_match() {
        let mut chain = VersionChain::new();
        chain.push(VersionedValue::new(tx(1), "a"));
        chain.push(VersionedValue::new(tx(2), "b"));
        chain.push(VersionedValue::new(tx(3), "c"));

        let closed = chain.close_visible(tx(4), |v| v.payload() != "b");
        assert_eq!(closed, 2);
        assert_eq!(chain.versions()[0].ended_by(), Some(tx(4)));
        assert!(chain.versions()[1].is_live());
        assert_eq!(chain.versions()[2].ended_by(), Some(tx(4)));
        assert_eq!(chain.live_count(), 1);
    }

    #[test]
    fn close_visible_skips_already_ended() {
        let mut chain = VersionChain::new();
        chain.push(VersionedValue::new(tx(1), "a"));
        chain.close_visible(tx(2), VersionedValue::is_live);

        let closed = chain.close_visible(tx(3), |_| true);
        assert_eq!(closed, 0);
        assert_eq!(chain.versions()[0].ended_by(), Some(tx(2)));
    }

    #[test]
    fn empty_chain_closes_nothing() {
        let mut chain = VersionChain::new();
        assert_eq!(chain.close_visible(tx(1), |_| true), 0);
        assert!(chain.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Once a version is ended, later closes never rewrite it, and
            /// appends never reorder the chain.
            #[test]
            fn end_markers_are_stable(ops in prop::collection::vec((any::<bool>(), 1u64..20), 1..40)) {
                let mut chain = VersionChain::new();
                let mut seen: Vec<Option<TransactionId>> = Vec::new();

                for (is_write, id) in ops {
                    if is_write {
                        chain.close_visible(tx(id), VersionedValue::is_live);
                        chain.push(VersionedValue::new(tx(id), id.to_string()));
                    } else {
                        chain.close_visible(tx(id), |_| true);
                    }

                    for (old, version) in seen.iter().zip(chain.versions()) {
                        if old.is_some() {
                            prop_assert_eq!(*old, version.ended_by());
                        }
                    }
                    seen = chain.versions().iter().map(VersionedValue::ended_by).collect();
                    prop_assert!(chain.live_count() <= 1);
                }
            }
        }
    }
}

//! Last-processed payload fingerprints, one slot per refresh job.

use std::sync::{PoisonError, RwLock};

use bikeshare_feed::Fingerprint;

/// Which refresh job a fingerprint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSlot {
    Catalog,
    Counts,
}

/// Process-scoped fingerprint state. Empty slots mean "always changed".
#[derive(Debug, Default)]
pub struct FingerprintSlots {
    catalog: RwLock<Option<Fingerprint>>,
    counts: RwLock<Option<Fingerprint>>,
}

impl FingerprintSlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: FeedSlot) -> &RwLock<Option<Fingerprint>> {
        match slot {
            FeedSlot::Catalog => &self.catalog,
            FeedSlot::Counts => &self.counts,
        }
    }

    #[must_use]
    pub fn get(&self, slot: FeedSlot) -> Option<Fingerprint> {
        self.slot(slot)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self, slot: FeedSlot, fingerprint: Fingerprint) {
        *self
            .slot(slot)
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(fingerprint);
    }

    /// `true` when `fingerprint` differs from what `slot` last processed.
    #[must_use]
    pub fn has_changed(&self, slot: FeedSlot, fingerprint: &Fingerprint) -> bool {
        fingerprint.has_changed(self.get(slot).as_ref())
    }
}

//! Ordered, bounded LUT chain.
//!
//! Entries apply first-to-last. Capacity is enforced here, at mutation time;
//! the compositor only ever reads the first [`MAX_CHAIN_LEN`] entries.

use std::sync::Arc;

use lutmix_lut::LutDocument;
use tracing::debug;

use crate::{EngineError, EngineResult, LutId};

/// Maximum number of stacked LUTs.
pub const MAX_CHAIN_LEN: usize = 5;

/// One stage of a chain.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    id: LutId,
    lut: Arc<LutDocument>,
    intensity: f32,
}

impl ChainEntry {
    /// Creates an entry; `intensity` is clamped to [0, 1].
    pub fn new(id: LutId, lut: Arc<LutDocument>, intensity: f32) -> Self {
        Self { id, lut, intensity: clamp_intensity(intensity) }
    }

    /// Library identity of the LUT.
    pub fn id(&self) -> LutId {
        self.id
    }

    /// LUT document.
    pub fn lut(&self) -> &Arc<LutDocument> {
        &self.lut
    }

    /// Blend weight in [0, 1].
    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

/// Ordered chain of at most [`MAX_CHAIN_LEN`] entries.
#[derive(Debug, Clone, Default)]
pub struct LutChain {
    entries: Vec<ChainEntry>,
}

impl LutChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(MAX_CHAIN_LEN) }
    }

    /// Appends a LUT at full intensity.
    pub fn push(&mut self, id: LutId, lut: Arc<LutDocument>) -> EngineResult<()> {
        self.push_entry(ChainEntry::new(id, lut, 1.0))
    }

    /// Appends a prepared entry.
    pub fn push_entry(&mut self, entry: ChainEntry) -> EngineResult<()> {
        self.insert_entry(self.entries.len(), entry)
    }

    /// Inserts a prepared entry at `index`.
    pub fn insert_entry(&mut self, index: usize, entry: ChainEntry) -> EngineResult<()> {
        if self.entries.len() >= MAX_CHAIN_LEN {
            debug!(id = %entry.id, "rejecting chain insert, chain full");
            return Err(EngineError::ChainCapacity { capacity: MAX_CHAIN_LEN });
        }
        if index > self.entries.len() {
            return Err(EngineError::IndexOutOfRange { index, len: self.entries.len() });
        }
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Removes and returns the entry at `index`.
    pub fn remove(&mut self, index: usize) -> EngineResult<ChainEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Drops every entry referencing `id`. Returns how many were removed.
    pub fn remove_lut(&mut self, id: LutId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before - self.entries.len()
    }

    /// Moves the entry at `from` so it ends up at `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) -> EngineResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Sets the blend weight of entry `index`, clamped to [0, 1].
    pub fn set_intensity(&mut self, index: usize, intensity: f32) -> EngineResult<()> {
        self.check_index(index)?;
        self.entries[index].intensity = clamp_intensity(intensity);
        Ok(())
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Iterates `(document, intensity)` stages in application order.
    pub fn stages(&self) -> impl Iterator<Item = (&LutDocument, f32)> + '_ {
        self.entries.iter().map(|e| (e.lut.as_ref(), e.intensity))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no LUT is stacked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when another insert would be rejected.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_CHAIN_LEN
    }

    fn check_index(&self, index: usize) -> EngineResult<()> {
        if index >= self.entries.len() {
            return Err(EngineError::IndexOutOfRange { index, len: self.entries.len() });
        }
        Ok(())
    }
}

fn clamp_intensity(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lut() -> Arc<LutDocument> {
        Arc::new(LutDocument::identity(2))
    }

    #[test]
    fn sixth_entry_is_rejected() {
        let mut chain = LutChain::new();
        for i in 0..5 {
            chain.push(LutId::from_raw(i), lut()).unwrap();
        }
        let err = chain.push(LutId::from_raw(5), lut()).unwrap_err();
        assert!(matches!(err, EngineError::ChainCapacity { capacity: 5 }));
        assert_eq!(chain.len(), 5);
        assert!(chain.entries().iter().all(|e| e.id().raw() < 5));
    }

    #[test]
    fn intensity_is_clamped_by_mutator() {
        let mut chain = LutChain::new();
        chain.push(LutId::from_raw(1), lut()).unwrap();
        chain.set_intensity(0, 1.7).unwrap();
        assert_eq!(chain.entries()[0].intensity(), 1.0);
        chain.set_intensity(0, -0.2).unwrap();
        assert_eq!(chain.entries()[0].intensity(), 0.0);
        chain.set_intensity(0, f32::NAN).unwrap();
        assert_eq!(chain.entries()[0].intensity(), 0.0);
        assert!(chain.set_intensity(3, 0.5).is_err());
    }

    #[test]
    fn move_and_remove_keep_order() {
        let mut chain = LutChain::new();
        for i in 0..4 {
            chain.push(LutId::from_raw(i), lut()).unwrap();
        }
        chain.move_entry(0, 3).unwrap();
        let ids: Vec<u64> = chain.entries().iter().map(|e| e.id().raw()).collect();
        assert_eq!(ids, vec![1, 2, 3, 0]);

        chain.remove(1).unwrap();
        let ids: Vec<u64> = chain.entries().iter().map(|e| e.id().raw()).collect();
        assert_eq!(ids, vec![1, 3, 0]);
        assert!(chain.remove(3).is_err());
    }

    #[test]
    fn remove_lut_drops_all_references() {
        let mut chain = LutChain::new();
        let shared = lut();
        chain.push(LutId::from_raw(7), shared.clone()).unwrap();
        chain.push(LutId::from_raw(8), lut()).unwrap();
        chain.push(LutId::from_raw(7), shared).unwrap();
        assert_eq!(chain.remove_lut(LutId::from_raw(7)), 2);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn insert_at_front() {
        let mut chain = LutChain::new();
        chain.push(LutId::from_raw(1), lut()).unwrap();
        chain
            .insert_entry(0, ChainEntry::new(LutId::from_raw(2), lut(), 0.5))
            .unwrap();
        assert_eq!(chain.entries()[0].id().raw(), 2);
        assert_eq!(chain.entries()[0].intensity(), 0.5);
        assert!(chain.insert_entry(9, ChainEntry::new(LutId::from_raw(3), lut(), 1.0)).is_err());
    }
}

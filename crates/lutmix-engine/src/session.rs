//! Editing session: LUT library, active chain and preview cache.
//!
//! All state the UI layer needs lives in an explicit [`Session`] value passed
//! to the engine entry points; nothing here is global.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lutmix_lut::{cube, LutDocument};
use tracing::{debug, info};

use crate::backend::{ChainUniforms, SamplingBackend};
use crate::{
    apply_chain, bake, render_thumbnail, ChainEntry, EngineError, EngineResult, Image, LutCache,
    LutChain, MAX_CHAIN_LEN,
};

/// Opaque LUT identity, assigned at import and never reused by a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LutId(u64);

impl LutId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One imported LUT.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Display name, usually the file stem.
    pub name: String,
    /// Parsed document.
    pub lut: Arc<LutDocument>,
}

/// User LUT library.
#[derive(Debug, Default)]
pub struct Library {
    entries: BTreeMap<LutId, LibraryEntry>,
    next_id: u64,
}

impl Library {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses CUBE text and adds it. A failed parse leaves the library unchanged.
    pub fn import_cube(&mut self, name: &str, text: &str) -> EngineResult<LutId> {
        let lut = cube::parse(text)?;
        Ok(self.insert(name, lut))
    }

    /// Adds an already-built document.
    pub fn insert(&mut self, name: &str, lut: LutDocument) -> LutId {
        let id = LutId(self.next_id);
        self.next_id += 1;
        debug!(%id, lut_name = name, size = lut.size(), "added LUT to library");
        self.entries.insert(id, LibraryEntry { name: name.to_string(), lut: Arc::new(lut) });
        id
    }

    /// Looks up an entry.
    pub fn get(&self, id: LutId) -> Option<&LibraryEntry> {
        self.entries.get(&id)
    }

    /// Removes an entry.
    pub fn remove(&mut self, id: LutId) -> Option<LibraryEntry> {
        self.entries.remove(&id)
    }

    /// Entries in import order.
    pub fn iter(&self) -> impl Iterator<Item = (LutId, &LibraryEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Editing context for one photo.
pub struct Session<B: SamplingBackend> {
    library: Library,
    chain: LutChain,
    cache: LutCache<B>,
    show_original: bool,
}

impl<B: SamplingBackend> Session<B> {
    /// New session rendering previews with `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            library: Library::new(),
            chain: LutChain::new(),
            cache: LutCache::new(backend),
            show_original: false,
        }
    }

    /// LUT library.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Active chain.
    pub fn chain(&self) -> &LutChain {
        &self.chain
    }

    /// Active chain, for reordering and intensity edits.
    pub fn chain_mut(&mut self) -> &mut LutChain {
        &mut self.chain
    }

    /// Preview resource cache.
    pub fn cache(&self) -> &LutCache<B> {
        &self.cache
    }

    /// Imports CUBE text into the library.
    pub fn import_cube(&mut self, name: &str, text: &str) -> EngineResult<LutId> {
        self.library.import_cube(name, text)
    }

    /// Imports a built document into the library.
    pub fn import_document(&mut self, name: &str, lut: LutDocument) -> LutId {
        self.library.insert(name, lut)
    }

    /// Removes a LUT from the library, the chain and the cache.
    pub fn remove_lut(&mut self, id: LutId) -> EngineResult<()> {
        let entry = self.library.remove(id).ok_or(EngineError::UnknownLut(id))?;
        let dropped = self.chain.remove_lut(id);
        self.cache.dispose(id);
        info!(%id, lut_name = %entry.name, chain_entries = dropped, "removed LUT");
        Ok(())
    }

    /// Appends a library LUT to the chain at full intensity.
    pub fn add_to_chain(&mut self, id: LutId) -> EngineResult<()> {
        self.add_to_chain_with(id, 1.0)
    }

    /// Appends a library LUT to the chain at `intensity`.
    pub fn add_to_chain_with(&mut self, id: LutId, intensity: f32) -> EngineResult<()> {
        let entry = self.library.get(id).ok_or(EngineError::UnknownLut(id))?;
        self.chain.push_entry(ChainEntry::new(id, entry.lut.clone(), intensity))
    }

    /// Compare toggle.
    pub fn show_original(&self) -> bool {
        self.show_original
    }

    /// Sets the compare toggle.
    pub fn set_show_original(&mut self, show: bool) {
        self.show_original = show;
    }

    /// Renders the interactive preview through the backend.
    ///
    /// Missing resources are uploaded on first use.
    pub fn preview(&mut self, image: &Image) -> EngineResult<Image> {
        for entry in self.chain.entries().iter().take(MAX_CHAIN_LEN) {
            self.cache.get_or_create(entry.id(), entry.lut())?;
        }
        let mut uniforms = ChainUniforms::new(self.show_original);
        for entry in self.chain.entries().iter().take(MAX_CHAIN_LEN) {
            let resource = self
                .cache
                .get(entry.id())
                .ok_or(EngineError::UnknownLut(entry.id()))?;
            uniforms.push(resource, entry.intensity())?;
        }
        self.cache.backend().render(&uniforms, image)
    }

    /// Applies the chain to a full-resolution photo for export.
    ///
    /// Always uses the CPU sampler; the compare toggle does not apply.
    pub fn export_photo(&self, image: &Image) -> EngineResult<Image> {
        let mut out = image.clone();
        apply_chain(&self.chain, &mut out)?;
        Ok(out)
    }

    /// Bakes the chain into one merged LUT.
    pub fn export_merged_lut(&self) -> EngineResult<LutDocument> {
        bake(&self.chain)
    }

    /// Bakes the chain and serializes it as CUBE text.
    pub fn export_merged_cube(&self) -> EngineResult<String> {
        Ok(cube::serialize(&self.export_merged_lut()?))
    }

    /// Renders a library thumbnail for one LUT.
    pub fn thumbnail(&self, id: LutId, intensity: f32, image: &Image, max_side: u32) -> EngineResult<Image> {
        let entry = self.library.get(id).ok_or(EngineError::UnknownLut(id))?;
        render_thumbnail(image, &entry.lut, intensity, max_side)
    }
}

//! Resource Registry - content-addressed font and image store.
//!
//! Every embedded payload is keyed by the MD5 digest of its bytes, so the
//! same font program or image shown on many pages is stored once and always
//! referenced by the same ID. The registry and the [`IdAllocator`] are
//! document-wide; both are safe to share between pages translated on
//! different threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::ImageCodec;
use crate::ofd::document::{DEFAULT_COLOR_SPACE_ID, RES_BASE_LOC};
use crate::ofd::{FontResource, Id, MultiMedia, ResourceManifest};

/// Monotonic ID source for one document.
///
/// Seeded at the top of the reserved block; `allocate` never returns a
/// reserved or previously returned value.
#[derive(Debug)]
pub struct IdAllocator {
    current: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_COLOR_SPACE_ID.get())
    }

    /// Allocator whose first ID is `seed + 1`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            current: AtomicU64::new(seed),
        }
    }

    pub fn allocate(&self) -> Id {
        Id(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Highest ID handed out so far (the seed when none was).
    pub fn current(&self) -> Id {
        Id(self.current.load(Ordering::SeqCst))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a registered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    Image,
}

/// Digest-indexed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub digest: [u8; 16],
    pub id: Id,
    /// File name inside the resource directory
    pub name: String,
    pub kind: ResourceKind,
    pub bytes: Vec<u8>,
}

/// Outcome of interning a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHandle {
    pub id: Id,
    /// Registered without a font program
    pub stub: bool,
    /// Newly registered by this call
    pub created: bool,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Payload entries in registration order, by kind and digest
    entries: IndexMap<(ResourceKind, [u8; 16]), ResourceEntry>,
    /// Source font object identity -> font resource ID
    font_keys: FxHashMap<u64, Id>,
    fonts: Vec<FontResource>,
    multimedia: Vec<MultiMedia>,
}

impl RegistryInner {
    fn unique_name(&self, stem: &str, ext: &str, id: Id) -> String {
        let name = format!("{stem}.{ext}");
        if self.entries.values().any(|e| e.name == name) {
            format!("{stem}_{id}.{ext}")
        } else {
            name
        }
    }
}

/// Document-wide font/image store.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    inner: Mutex<RegistryInner>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // A panic while holding the lock cannot leave the maps half-updated
        // in a way later lookups depend on.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a font previously interned under `key`.
    pub fn font_for_key(&self, key: u64) -> Option<Id> {
        self.lock().font_keys.get(&key).copied()
    }

    /// Register a font, returning the ID of an existing identical one.
    ///
    /// `key` identifies the source font object; `bytes` is its program.
    /// Without a program the font is registered as a stub that only
    /// carries names.
    pub fn intern_font(
        &self,
        ids: &IdAllocator,
        key: u64,
        bytes: Option<&[u8]>,
        family_name: &str,
        logical_name: &str,
    ) -> FontHandle {
        let mut inner = self.lock();
        if let Some(&id) = inner.font_keys.get(&key) {
            let stub = !inner.fonts.iter().any(|f| f.id == id && f.font_file.is_some());
            return FontHandle {
                id,
                stub,
                created: false,
            };
        }

        let bytes = bytes.filter(|b| !b.is_empty());
        let Some(bytes) = bytes else {
            let id = ids.allocate();
            debug!(font = logical_name, %id, "no font program, registering stub");
            inner.fonts.push(FontResource {
                id,
                family_name: family_name.to_string(),
                font_name: logical_name.to_string(),
                font_file: None,
            });
            inner.font_keys.insert(key, id);
            return FontHandle {
                id,
                stub: true,
                created: true,
            };
        };

        let digest = md5::compute(bytes).0;
        if let Some(entry) = inner.entries.get(&(ResourceKind::Font, digest)) {
            let id = entry.id;
            debug!(font = logical_name, %id, "font program already registered");
            inner.font_keys.insert(key, id);
            return FontHandle {
                id,
                stub: false,
                created: false,
            };
        }

        let id = ids.allocate();
        let name = inner.unique_name(&file_stem(logical_name), "otf", id);
        debug!(font = logical_name, %id, file = %name, "registered font");
        inner.fonts.push(FontResource {
            id,
            family_name: family_name.to_string(),
            font_name: logical_name.to_string(),
            font_file: Some(name.clone()),
        });
        inner.entries.insert(
            (ResourceKind::Font, digest),
            ResourceEntry {
                digest,
                id,
                name,
                kind: ResourceKind::Font,
                bytes: bytes.to_vec(),
            },
        );
        inner.font_keys.insert(key, id);
        FontHandle {
            id,
            stub: false,
            created: true,
        }
    }

    /// Register encoded image bytes under `<hex md5>.<ext>`.
    pub fn intern_image(&self, ids: &IdAllocator, bytes: &[u8], codec: ImageCodec) -> Id {
        let digest = md5::compute(bytes);
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.get(&(ResourceKind::Image, digest.0)) {
            debug!(id = %entry.id, "image already registered");
            return entry.id;
        }

        let id = ids.allocate();
        let name = format!("{:x}.{}", digest, codec.extension());
        debug!(%id, file = %name, "registered image");
        inner.multimedia.push(MultiMedia {
            id,
            codec,
            file: name.clone(),
        });
        inner.entries.insert(
            (ResourceKind::Image, digest.0),
            ResourceEntry {
                digest: digest.0,
                id,
                name,
                kind: ResourceKind::Image,
                bytes: bytes.to_vec(),
            },
        );
        id
    }

    /// Number of digest-indexed payloads.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the payload entries in registration order.
    pub fn entries(&self) -> Vec<ResourceEntry> {
        self.lock().entries.values().cloned().collect()
    }

    /// Consume the registry into the manifest handed to the container writer.
    pub fn into_manifest(self) -> ResourceManifest {
        let inner = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        let files = inner
            .entries
            .into_values()
            .map(|e| (format!("{RES_BASE_LOC}/{}", e.name), e.bytes))
            .collect();
        ResourceManifest {
            fonts: inner.fonts,
            multimedia: inner.multimedia,
            files,
        }
    }
}

/// Font names end up as file names; keep them to a portable character set.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "font".to_string()
    } else {
        stem
    }
}

use super::{DrawingSummary, KeyValueStore, PersistenceError, PersistenceResult, SavedDrawing};
use crate::id_generator::{DRAWING_ID_PREFIX, generate_drawing_id};
use crate::scene::{RasterFormat, Scene};
use crate::util::time;

/// Key of the catalog record listing every saved drawing
pub const CATALOG_KEY: &str = "manga-drawings";

/// Default scale of the catalog preview relative to the canvas
pub const DEFAULT_PREVIEW_SCALE: f32 = 0.25;

/// Previews are never larger than the canvas
pub const MAX_PREVIEW_SCALE: f32 = 1.0;

/// Saves, lists, loads and deletes named drawings in a key-value store.
///
/// Each drawing is stored twice: the full record under its own id, and a
/// summary in the catalog record. The two are always written as a pair.
#[derive(Debug)]
pub struct PersistenceManager<K: KeyValueStore> {
    store: K,
    preview_scale: f32,
}

impl<K: KeyValueStore> PersistenceManager<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            preview_scale: DEFAULT_PREVIEW_SCALE,
        }
    }

    /// Scales outside (0, 1] fall back to [`DEFAULT_PREVIEW_SCALE`]
    pub fn with_preview_scale(mut self, scale: f32) -> Self {
        self.preview_scale = if scale > 0.0 && scale <= MAX_PREVIEW_SCALE {
            scale
        } else {
            log::warn!("Ignoring preview scale {}", scale);
            DEFAULT_PREVIEW_SCALE
        };
        self
    }

    pub fn preview_scale(&self) -> f32 {
        self.preview_scale
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Save the scene under a fresh id and add it to the catalog.
    ///
    /// The record is written first; if the catalog update then fails the
    /// record is removed again so no drawing exists outside the catalog.
    pub fn save(&mut self, name: &str, scene: &dyn Scene) -> PersistenceResult<DrawingSummary> {
        let record = SavedDrawing {
            id: generate_drawing_id(),
            name: name.to_owned(),
            preview: scene.to_raster(RasterFormat::Png, self.preview_scale)?,
            serialized_scene: scene.serialize()?,
            last_modified: time::timestamp_millis(),
        };
        let summary = DrawingSummary::from(&record);

        let mut catalog = self.read_catalog()?;
        catalog.push(summary.clone());
        let catalog_json = serde_json::to_string(&catalog)?;

        self.store.set(&record.id, &serde_json::to_string(&record)?)?;
        if let Err(err) = self.store.set(CATALOG_KEY, &catalog_json) {
            log::error!("Catalog update failed, rolling back record {}: {}", record.id, err);
            if let Err(rollback) = self.store.remove(&record.id) {
                log::error!("Rollback of {} failed: {}", record.id, rollback);
            }
            return Err(err);
        }

        log::info!("Saved drawing '{}' as {}", record.name, record.id);
        Ok(summary)
    }

    /// Summaries of every saved drawing, oldest first. An unreadable
    /// catalog lists as empty; [`Self::reconcile`] rebuilds it.
    pub fn catalog(&self) -> PersistenceResult<Vec<DrawingSummary>> {
        match self.read_catalog() {
            Err(PersistenceError::CorruptCatalog(err)) => {
                log::warn!("Unreadable drawing catalog, listing as empty: {}", err);
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// The stored catalog; fails rather than guessing when it can't be parsed
    fn read_catalog(&self) -> PersistenceResult<Vec<DrawingSummary>> {
        let Some(json) = self.store.get(CATALOG_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|err| PersistenceError::CorruptCatalog(err.to_string()))
    }

    /// Fetch the full record of a drawing
    pub fn record(&self, id: &str) -> PersistenceResult<SavedDrawing> {
        let json = self
            .store
            .get(id)?
            .ok_or_else(|| PersistenceError::NotFound(id.to_owned()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Replace the scene with a saved drawing; returns the drawing's name
    pub fn load(&self, id: &str, scene: &mut dyn Scene) -> PersistenceResult<String> {
        let record = self.record(id)?;
        scene.deserialize(&record.serialized_scene)?;
        log::info!("Loaded drawing '{}' ({})", record.name, id);
        Ok(record.name)
    }

    /// Remove a drawing and its catalog entry. Best effort: a failure
    /// halfway is reported but not rolled back.
    pub fn delete(&mut self, id: &str) -> PersistenceResult<()> {
        let mut catalog = self.read_catalog()?;
        self.store.remove(id)?;

        let before = catalog.len();
        catalog.retain(|entry| entry.id != id);
        if catalog.len() != before {
            self.store.set(CATALOG_KEY, &serde_json::to_string(&catalog)?)?;
        }

        log::info!("Deleted drawing {}", id);
        Ok(())
    }

    /// Bring the catalog and the stored records back in line: entries
    /// whose record is gone are dropped, readable records missing from the
    /// catalog are listed again, and unreadable ones are removed. An
    /// unreadable catalog is rebuilt from the records.
    ///
    /// Returns the number of entries dropped, re-listed or removed.
    pub fn reconcile(&mut self) -> PersistenceResult<usize> {
        let (catalog, rebuild) = match self.read_catalog() {
            Ok(catalog) => (catalog, false),
            Err(PersistenceError::CorruptCatalog(err)) => {
                log::warn!("Rebuilding unreadable drawing catalog: {}", err);
                (Vec::new(), true)
            }
            Err(err) => return Err(err),
        };

        let mut changes = 0;
        let mut kept = Vec::with_capacity(catalog.len());
        for entry in catalog {
            if self.store.contains(&entry.id)? {
                kept.push(entry);
            } else {
                log::warn!("Dropping orphaned catalog entry {} ('{}')", entry.id, entry.name);
                changes += 1;
            }
        }

        let mut unlisted = Vec::new();
        for key in self.store.list_keys()? {
            if !key.starts_with(DRAWING_ID_PREFIX) || kept.iter().any(|entry| entry.id == key) {
                continue;
            }
            match self.record(&key) {
                Ok(record) => {
                    log::warn!("Re-listing drawing {} ('{}')", record.id, record.name);
                    unlisted.push(DrawingSummary::from(&record));
                }
                Err(err) => {
                    log::warn!("Removing unreadable drawing {}: {}", key, err);
                    self.store.remove(&key)?;
                }
            }
            changes += 1;
        }
        unlisted.sort_by_key(|summary| summary.last_modified);
        kept.extend(unlisted);

        if changes > 0 || rebuild {
            self.store.set(CATALOG_KEY, &serde_json::to_string(&kept)?)?;
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use crate::persistence::MemoryStore;
    use crate::scene::{Document, ObjectData};
    use egui::{Color32, Pos2};

    fn sketch() -> Document {
        let mut doc = Document::default();
        doc.add_object(
            factory::create_circle(Pos2::new(10.0, 10.0), 3.0, Color32::RED),
            ObjectData::permanent(),
        );
        doc
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let manager = PersistenceManager::new(MemoryStore::new());
        assert!(manager.catalog().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_catalog_lists_empty_but_blocks_writes() {
        let doc = sketch();
        let mut manager = PersistenceManager::new(MemoryStore::new());
        let first = manager.save("First", &doc).unwrap();
        manager.store.set(CATALOG_KEY, "{oops").unwrap();

        assert!(manager.catalog().unwrap().is_empty());
        assert!(matches!(
            manager.save("Second", &doc),
            Err(PersistenceError::CorruptCatalog(_))
        ));
        assert!(matches!(
            manager.delete(&first.id),
            Err(PersistenceError::CorruptCatalog(_))
        ));
        assert!(manager.store().contains(&first.id).unwrap());
        assert_eq!(manager.store().get(CATALOG_KEY).unwrap().as_deref(), Some("{oops"));
    }

    #[test]
    fn test_reconcile_rebuilds_corrupt_catalog() {
        let doc = sketch();
        let mut manager = PersistenceManager::new(MemoryStore::new());
        let first = manager.save("First", &doc).unwrap();
        let second = manager.save("Second", &doc).unwrap();
        manager.store.set(CATALOG_KEY, "{oops").unwrap();

        assert_eq!(manager.reconcile().unwrap(), 2);
        let ids: Vec<_> = manager.catalog().unwrap().into_iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));

        let third = manager.save("Third", &doc).unwrap();
        assert_eq!(manager.catalog().unwrap().last().map(|entry| &entry.id), Some(&third.id));
    }

    #[test]
    fn test_reconcile_removes_unreadable_records() {
        let mut manager = PersistenceManager::new(MemoryStore::new());
        manager.store.set("drawing-broken", "not a record").unwrap();
        manager.store.set("unrelated", "kept").unwrap();

        assert_eq!(manager.reconcile().unwrap(), 1);
        assert!(!manager.store().contains("drawing-broken").unwrap());
        assert!(manager.store().contains("unrelated").unwrap());
        assert!(manager.catalog().unwrap().is_empty());
    }

    #[test]
    fn test_preview_scale_is_bounded() {
        let manager = PersistenceManager::new(MemoryStore::new());
        assert_eq!(manager.with_preview_scale(0.5).preview_scale(), 0.5);
        for scale in [0.0, -1.0, 40.0, f32::NAN, f32::INFINITY] {
            let manager = PersistenceManager::new(MemoryStore::new()).with_preview_scale(scale);
            assert_eq!(manager.preview_scale(), DEFAULT_PREVIEW_SCALE);
        }
    }

    #[test]
    fn test_failed_catalog_write_rolls_back_record() {
        let doc = sketch();
        // Measure what one save needs, then allow the record but not the catalog
        let mut probe = PersistenceManager::new(MemoryStore::new());
        probe.save("Probe", &doc).unwrap();
        let record_bytes = probe
            .store()
            .keys()
            .filter(|key| *key != CATALOG_KEY)
            .map(|key| key.len() + probe.store().get(key).unwrap().unwrap().len())
            .sum::<usize>();

        let mut manager = PersistenceManager::new(MemoryStore::with_quota(record_bytes + 8));
        let err = manager.save("Probe", &doc).unwrap_err();
        assert!(matches!(err, PersistenceError::StorageQuota { .. }));
        assert_eq!(manager.store().keys().count(), 0);
    }

    #[test]
    fn test_reconcile_drops_orphans() {
        let doc = sketch();
        let mut manager = PersistenceManager::new(MemoryStore::new());
        let kept = manager.save("Kept", &doc).unwrap();
        let orphan = manager.save("Orphan", &doc).unwrap();

        manager.store.remove(&orphan.id).unwrap();
        assert_eq!(manager.reconcile().unwrap(), 1);

        let catalog = manager.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, kept.id);
        assert_eq!(manager.reconcile().unwrap(), 0);
    }
}

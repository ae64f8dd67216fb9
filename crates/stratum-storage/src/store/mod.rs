//! Page store: stateful operations against page files.
//!
//! A [`PageStore`] mutates one page file per call. Every operation opens
//! the file, performs targeted positional reads and writes against fixed
//! offsets, concludes mutations with `fsync`, and closes — no handle is
//! cached between calls. The store assumes a single caller per page file
//! at any instant; concurrent mutation of the same file is not
//! coordinated.
//!
//! None of the multi-write mutations is atomic: a crash between two
//! positional writes can leave the frame structurally inconsistent. The
//! durability contract is only that data written and then synced is
//! readable after reopen.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use stratum_common::constants::{MAX_PAGE_RECORDS, PAGE_HEADER_SIZE, PAGE_SIZE, SLOT_SIZE};
use stratum_common::types::SlotId;

use crate::file::{FileHandle, OpenOptions, ReadAt, StandardFile};
use crate::page::{
    entry_offset, find_by_id, load_contents, load_directory, load_record, pack,
    size_field_offset, tombstone_byte_offset, Compaction, PageContents, PageError, PageHeader,
    SlotEntry, SlotRecord, SlottedPage,
};

mod config;
mod error;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};

/// Outcome of [`PageStore::compact_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactOutcome {
    /// The page had no tombstones; nothing was written.
    Unchanged,
    /// Tombstoned entries were evicted and the page rewritten.
    Compacted,
    /// Every entry was tombstoned. The frame was rewritten as a valid
    /// empty page with its slot-ID counter preserved; the caller may
    /// delete the file.
    Drained,
}

/// Stateful façade over single-page files.
pub struct PageStore {
    config: StoreConfig,
}

impl PageStore {
    /// Creates a store with the given configuration.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate().map_err(StoreError::config_error)?;
        Ok(Self { config })
    }

    /// Creates a store rooted at a directory prefix.
    pub fn with_dir(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::new(StoreConfig::new().with_dir(dir))
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Appends a record to the page, creating the file if missing.
    ///
    /// A fresh file is laid down as a zeroed frame (a valid empty page)
    /// and synced before the append proceeds. Returns the slot ID
    /// assigned to the record.
    ///
    /// Fails with [`StoreError::InsufficientSpace`] when the record does
    /// not fit in the free run between the directory and the record heap.
    /// Tombstoned space is not considered; compact first to reclaim it.
    pub async fn write_record(&self, name: &str, record: &[u8]) -> StoreResult<SlotId> {
        let path = self.config.resolve(name);
        let file = StandardFile::open(&path, OpenOptions::for_create()).await?;

        if file.size().await? < PAGE_SIZE as u64 {
            file.write_all_at(&SlottedPage::empty().into_bytes(), 0)
                .await?;
            self.finish(&file).await?;
            debug!(path = %path.display(), "created empty page file");
        }

        let header = PageHeader::load(&file).await?;
        let count = header.item_count as usize;
        if count == MAX_PAGE_RECORDS {
            return Err(PageError::too_many_records(count + 1).into());
        }

        // The heap grows leftward; its top is the most recent entry's offset.
        let heap_top = if count == 0 {
            PAGE_SIZE
        } else {
            let mut bytes = [0u8; 2];
            file.read_exact_at(&mut bytes, entry_offset(count - 1) as u64)
                .await?;
            u16::from_be_bytes(bytes) as usize
        };

        let available = heap_top.saturating_sub(PAGE_HEADER_SIZE + (count + 1) * SLOT_SIZE);
        if record.len() > available {
            return Err(StoreError::insufficient_space(record.len(), available));
        }

        let offset = heap_top - record.len();
        let slot_id = header.next_slot_id;

        file.write_all_at(record, offset as u64).await?;
        let entry = SlotEntry::new(offset as u16, record.len() as u16, slot_id);
        file.write_all_at(&entry.to_bytes(), entry_offset(count) as u64)
            .await?;
        file.write_all_at(&[header.item_count + 1], 0).await?;
        file.write_all_at(&slot_id.next().to_be_bytes(), 1).await?;
        self.finish(&file).await?;

        debug!(path = %path.display(), slot = %slot_id, size = record.len(), "appended record");
        Ok(slot_id)
    }

    /// Reads the whole page into its in-memory projection.
    ///
    /// Tombstoned entries are retained in the projection with an empty
    /// payload so callers can inspect the tombstone flag; the live and
    /// tombstone counts are reported separately.
    pub async fn read_page(&self, name: &str) -> StoreResult<PageContents> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_read()).await?;
        let contents = load_contents(&file).await?;
        trace!(path = %path.display(), live = contents.live, "read page");
        Ok(contents)
    }

    /// Reads a single record by slot ID.
    ///
    /// Binary-searches the directory, which is ascending in slot ID for
    /// every page this store writes. Never-issued and tombstoned IDs both
    /// report slot-not-found. Returns a projection holding exactly the
    /// matched slot with its payload loaded.
    pub async fn read_record(&self, name: &str, id: SlotId) -> StoreResult<PageContents> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_read()).await?;

        let header = PageHeader::load(&file).await?;
        let entries = load_directory(&file, header.item_count).await?;
        let index = match find_by_id(&entries, id) {
            Some(index) if entries[index].is_live() => index,
            _ => return Err(PageError::slot_not_found(id).into()),
        };

        let entry = entries[index];
        let payload = load_record(&file, &entry).await?;
        trace!(path = %path.display(), slot = %id, "read record");
        Ok(PageContents {
            header,
            slots: vec![SlotRecord {
                index,
                entry,
                payload,
            }],
            live: 1,
            tombstones: 0,
        })
    }

    /// Tombstones a record by slot ID.
    ///
    /// Idempotent on absent slots: IDs at or beyond the page's counter
    /// and IDs missing from the directory return success without touching
    /// the file. Otherwise a single tombstone byte is written and synced.
    pub async fn delete_record(&self, name: &str, id: SlotId) -> StoreResult<()> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_write()).await?;

        let header = PageHeader::load(&file).await?;
        if id >= header.next_slot_id {
            trace!(path = %path.display(), slot = %id, "delete of unissued slot ignored");
            return Ok(());
        }

        let entries = load_directory(&file, header.item_count).await?;
        let Some(index) = find_by_id(&entries, id) else {
            trace!(path = %path.display(), slot = %id, "delete of absent slot ignored");
            return Ok(());
        };

        file.write_all_at(&[1], tombstone_byte_offset(index) as u64)
            .await?;
        self.finish(&file).await?;
        debug!(path = %path.display(), slot = %id, "tombstoned record");
        Ok(())
    }

    /// Replaces a record's payload.
    ///
    /// Same-size payloads are overwritten in place. Smaller payloads are
    /// overwritten in place and the directory's size field shrunk; the
    /// vacated tail becomes dead space until compaction. Larger payloads
    /// force a full rewrite that repacks every live record — dropping
    /// tombstoned entries as a side effect — while preserving surviving
    /// slot IDs and the ID counter.
    pub async fn update_record(&self, name: &str, id: SlotId, record: &[u8]) -> StoreResult<()> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_write()).await?;

        let header = PageHeader::load(&file).await?;
        let entries = load_directory(&file, header.item_count).await?;
        let index = match find_by_id(&entries, id) {
            Some(index) if entries[index].is_live() => index,
            _ => return Err(PageError::slot_not_found(id).into()),
        };
        let entry = entries[index];

        match record.len().cmp(&(entry.size as usize)) {
            Ordering::Equal => {
                file.write_all_at(record, entry.offset as u64).await?;
            }
            Ordering::Less => {
                file.write_all_at(record, entry.offset as u64).await?;
                file.write_all_at(
                    &(record.len() as u16).to_be_bytes(),
                    size_field_offset(index) as u64,
                )
                .await?;
            }
            Ordering::Greater => {
                let mut survivors: Vec<(SlotId, Vec<u8>)> = Vec::new();
                for live in entries.iter().filter(|entry| entry.is_live()) {
                    let payload = if live.id == id {
                        record.to_vec()
                    } else {
                        load_record(&file, live).await?
                    };
                    survivors.push((live.id, payload));
                }
                let pairs: Vec<(SlotId, &[u8])> = survivors
                    .iter()
                    .map(|(id, payload)| (*id, payload.as_slice()))
                    .collect();
                let page = pack(header.next_slot_id, &pairs)?;
                file.write_all_at(page.as_bytes(), 0).await?;
            }
        }

        self.finish(&file).await?;
        debug!(path = %path.display(), slot = %id, size = record.len(), "updated record");
        Ok(())
    }

    /// Compacts the page, evicting tombstoned entries.
    ///
    /// Surviving records keep their slot IDs and relative order; the ID
    /// counter is preserved. Idempotent when no tombstones exist.
    pub async fn compact_page(&self, name: &str) -> StoreResult<CompactOutcome> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_write()).await?;

        let mut frame = vec![0u8; PAGE_SIZE];
        file.read_exact_at(&mut frame, 0).await?;
        let page = SlottedPage::from_bytes(frame)?;
        let next_slot_id = page.header().next_slot_id;

        let outcome = match page.compact().await? {
            Compaction::Unchanged(_) => CompactOutcome::Unchanged,
            Compaction::Rewritten(page) => {
                file.write_all_at(page.as_bytes(), 0).await?;
                self.finish(&file).await?;
                CompactOutcome::Compacted
            }
            Compaction::Drained => {
                let empty = pack(next_slot_id, &[])?;
                file.write_all_at(empty.as_bytes(), 0).await?;
                self.finish(&file).await?;
                CompactOutcome::Drained
            }
        };

        debug!(path = %path.display(), outcome = ?outcome, "compacted page");
        Ok(outcome)
    }

    /// Returns the entire page file verbatim.
    ///
    /// For callers implementing their own parsing or checksumming.
    pub async fn read_raw(&self, name: &str) -> StoreResult<Vec<u8>> {
        let path = self.config.resolve(name);
        let file = self.open_existing(&path, OpenOptions::for_read()).await?;
        let size = file.size().await?;
        let mut bytes = vec![0u8; size as usize];
        file.read_exact_at(&mut bytes, 0).await?;
        Ok(bytes)
    }

    async fn open_existing(&self, path: &Path, options: OpenOptions) -> StoreResult<StandardFile> {
        StandardFile::open(path, options).await.map_err(|err| {
            if err.is_not_found() {
                StoreError::page_not_found(path)
            } else {
                StoreError::from(err)
            }
        })
    }

    async fn finish(&self, file: &StandardFile) -> StoreResult<()> {
        if self.config.sync_writes {
            file.sync().await?;
        }
        Ok(())
    }
}

//! Slotted page codec.
//!
//! Pure operations over a page-sized byte buffer: building a page from a
//! list of records, parsing it back, tombstoning a slot, and compacting
//! away tombstoned entries. Nothing in this module touches the
//! filesystem; the parsing half is generic over [`ReadAt`], so the same
//! code also serves the store's targeted reads against open files.

use stratum_common::constants::{MAX_PAGE_RECORDS, PAGE_HEADER_SIZE, PAGE_SIZE, SLOT_SIZE};
use stratum_common::types::SlotId;

use super::error::{PageError, PageResult};
use super::header::PageHeader;
use super::slot::{entry_offset, load_directory, tombstone_byte_offset, SlotEntry};
use crate::file::ReadAt;

/// Combined byte footprint of a page holding the given record sizes.
///
/// # Example
///
/// ```rust
/// use stratum_storage::page::footprint;
///
/// // header + 2 directory entries + 11 payload bytes
/// assert_eq!(footprint([5, 6]), 5 + 2 * 9 + 11);
/// ```
pub fn footprint<I: IntoIterator<Item = usize>>(sizes: I) -> usize {
    let mut total = PAGE_HEADER_SIZE;
    for size in sizes {
        total += SLOT_SIZE + size;
    }
    total
}

/// One parsed directory entry together with its payload.
///
/// Tombstoned entries keep their directory position but carry an empty
/// payload; their bytes are never materialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    /// Position of the entry in the directory.
    pub index: usize,
    /// The directory entry itself.
    pub entry: SlotEntry,
    /// The record payload; empty for tombstoned entries.
    pub payload: Vec<u8>,
}

/// Full in-memory projection of a parsed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContents {
    /// The parsed page header.
    pub header: PageHeader,
    /// Every directory entry, tombstoned ones included.
    pub slots: Vec<SlotRecord>,
    /// Number of live records.
    pub live: usize,
    /// Number of tombstoned entries.
    pub tombstones: usize,
}

impl PageContents {
    /// Live record payloads in directory order, tombstoned entries
    /// dropped.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.slots
            .iter()
            .filter(|slot| slot.entry.is_live())
            .map(|slot| slot.payload.as_slice())
    }

    /// Bytes left between the end of the directory and the record heap.
    ///
    /// Tombstoned space does not count as free until compaction.
    pub fn free_space(&self) -> usize {
        let heap_top = self
            .slots
            .last()
            .map(|slot| slot.entry.offset as usize)
            .unwrap_or(PAGE_SIZE);
        let directory_end = PAGE_HEADER_SIZE + self.slots.len() * SLOT_SIZE;
        heap_top.saturating_sub(directory_end)
    }
}

/// Reads one record payload from a positional byte source.
pub async fn load_record<S: ReadAt + ?Sized>(src: &S, entry: &SlotEntry) -> PageResult<Vec<u8>> {
    let mut payload = vec![0u8; entry.size as usize];
    src.read_exact_at(&mut payload, entry.offset as u64).await?;
    Ok(payload)
}

/// Parses a whole page from a positional byte source.
///
/// Walks the header and the directory, then fetches payloads for live
/// entries only. Tombstoned entries are retained in the projection with
/// an empty payload so callers can inspect the tombstone flag.
pub async fn load_contents<S: ReadAt + ?Sized>(src: &S) -> PageResult<PageContents> {
    let header = PageHeader::load(src).await?;
    let entries = load_directory(src, header.item_count).await?;

    let mut slots = Vec::with_capacity(entries.len());
    let mut tombstones = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        let payload = if entry.is_live() {
            load_record(src, &entry).await?
        } else {
            tombstones += 1;
            Vec::new()
        };
        slots.push(SlotRecord {
            index,
            entry,
            payload,
        });
    }

    let live = slots.len() - tombstones;
    Ok(PageContents {
        header,
        slots,
        live,
        tombstones,
    })
}

/// Outcome of compacting a page.
#[derive(Debug)]
pub enum Compaction {
    /// No tombstoned entries existed; the page is returned untouched.
    Unchanged(SlottedPage),
    /// Tombstoned entries were evicted and the survivors repacked.
    Rewritten(SlottedPage),
    /// Every entry was tombstoned; the page holds nothing worth keeping.
    Drained,
}

/// An owned page frame.
///
/// # Example
///
/// ```rust
/// use stratum_storage::page::SlottedPage;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let page = SlottedPage::build([b"alpha".as_slice(), b"beta".as_slice()]).unwrap();
/// let contents = page.contents().await.unwrap();
/// assert_eq!(contents.records().collect::<Vec<_>>(), vec![b"alpha".as_slice(), b"beta".as_slice()]);
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlottedPage {
    data: Vec<u8>,
}

impl SlottedPage {
    /// Creates an empty page frame.
    ///
    /// All-zero bytes decode as item count 0 and next slot ID 0, so the
    /// fresh frame is already a valid page.
    pub fn empty() -> Self {
        Self {
            data: vec![0u8; PAGE_SIZE],
        }
    }

    /// Builds a page from an ordered sequence of records.
    ///
    /// Slot IDs are assigned `0, 1, …` in input order and the header
    /// counter is left at the next unissued ID. Fails if more than 255
    /// records are given or their combined footprint exceeds the frame.
    pub fn build<I, B>(records: I) -> PageResult<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let records: Vec<B> = records.into_iter().collect();
        let pairs: Vec<(SlotId, &[u8])> = records
            .iter()
            .enumerate()
            .map(|(index, record)| (SlotId::new(index as u32), record.as_ref()))
            .collect();
        pack(SlotId::new(pairs.len() as u32), &pairs)
    }

    /// Wraps an existing frame.
    ///
    /// Fails unless the buffer is exactly one page long.
    pub fn from_bytes(data: Vec<u8>) -> PageResult<Self> {
        if data.len() != PAGE_SIZE {
            return Err(PageError::BadFrame {
                expected: PAGE_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// The raw frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the page, returning the raw frame.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Decodes the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::deserialize(&mut &self.data[..PageHeader::SIZE])
    }

    /// Parses the whole frame into its in-memory projection.
    pub async fn contents(&self) -> PageResult<PageContents> {
        load_contents(&self.data[..]).await
    }

    /// Tombstones the directory entry carrying the given slot ID.
    ///
    /// The entry and its payload stay in place; only the tombstone flag
    /// is set. The directory is scanned linearly, so this works on
    /// buffers whatever their slot-ID order. Fails if no entry matches.
    pub async fn tombstone(&mut self, id: SlotId) -> PageResult<()> {
        let header = self.header();
        let entries = load_directory(&self.data[..], header.item_count).await?;
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| PageError::slot_not_found(id))?;
        self.data[tombstone_byte_offset(index)] = 1;
        Ok(())
    }

    /// Compacts the page, evicting tombstoned entries.
    ///
    /// Surviving records are repacked flush against the end of the frame
    /// in their existing directory order, keeping their slot IDs and
    /// sizes; only their offsets change. The header counter is preserved
    /// so evicted IDs are never reissued.
    pub async fn compact(self) -> PageResult<Compaction> {
        let header = self.header();
        let entries = load_directory(&self.data[..], header.item_count).await?;

        if entries.iter().all(SlotEntry::is_live) {
            return Ok(Compaction::Unchanged(self));
        }

        let mut survivors = Vec::new();
        for entry in entries.iter().filter(|entry| entry.is_live()) {
            survivors.push((entry.id, load_record(&self.data[..], entry).await?));
        }
        if survivors.is_empty() {
            return Ok(Compaction::Drained);
        }

        let pairs: Vec<(SlotId, &[u8])> = survivors
            .iter()
            .map(|(id, payload)| (*id, payload.as_slice()))
            .collect();
        Ok(Compaction::Rewritten(pack(header.next_slot_id, &pairs)?))
    }
}

/// Packs records into a fresh frame.
///
/// Records are laid down in order: directory entries from the header
/// rightward, payloads from the end of the frame leftward, each offset
/// produced by running subtraction. The caller controls the IDs and the
/// header counter, which is what lets compaction and grow-updates keep
/// both intact.
pub(crate) fn pack(next_slot_id: SlotId, records: &[(SlotId, &[u8])]) -> PageResult<SlottedPage> {
    if records.len() > MAX_PAGE_RECORDS {
        return Err(PageError::too_many_records(records.len()));
    }
    let required = footprint(records.iter().map(|(_, payload)| payload.len()));
    if required > PAGE_SIZE {
        return Err(PageError::overflow(required));
    }

    let mut data = vec![0u8; PAGE_SIZE];
    let header = PageHeader::new(records.len() as u8, next_slot_id);
    data[..PageHeader::SIZE].copy_from_slice(&header.to_bytes());

    let mut heap_top = PAGE_SIZE;
    for (index, (id, payload)) in records.iter().enumerate() {
        heap_top -= payload.len();
        data[heap_top..heap_top + payload.len()].copy_from_slice(payload);

        let entry = SlotEntry::new(heap_top as u16, payload.len() as u16, *id);
        let at = entry_offset(index);
        data[at..at + SlotEntry::SIZE].copy_from_slice(&entry.to_bytes());
    }

    Ok(SlottedPage { data })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> SlottedPage {
        SlottedPage::build([
            b"hello world".as_slice(),
            "Привет мир".as_bytes(),
            b"hola amigo".as_slice(),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_and_parse_roundtrip() {
        let one = br#"["something","interesting"]"#.to_vec();
        let two = br#"["something","else"]"#.to_vec();
        let page = SlottedPage::build([&one, &two]).unwrap();

        let contents = page.contents().await.unwrap();
        assert_eq!(contents.live, 2);
        assert_eq!(contents.tombstones, 0);
        assert_eq!(contents.header, PageHeader::new(2, SlotId::new(2)));
        assert_eq!(
            contents.records().collect::<Vec<_>>(),
            vec![one.as_slice(), two.as_slice()]
        );
    }

    #[tokio::test]
    async fn test_build_packs_from_the_right() {
        let page = SlottedPage::build([b"aaaa".as_slice(), b"bb".as_slice()]).unwrap();
        let contents = page.contents().await.unwrap();

        let first = contents.slots[0].entry;
        let second = contents.slots[1].entry;
        assert_eq!(first.offset as usize, PAGE_SIZE - 4);
        assert_eq!(first.size, 4);
        assert_eq!(second.offset as usize, PAGE_SIZE - 6);
        assert_eq!(second.size, 2);
        assert_eq!(first.id, SlotId::new(0));
        assert_eq!(second.id, SlotId::new(1));
    }

    #[test]
    fn test_build_rejects_too_many_records() {
        let records = vec![b"x".as_slice(); 256];
        let result = SlottedPage::build(records);
        assert!(matches!(result, Err(PageError::TooManyRecords { .. })));

        let records = vec![b"x".as_slice(); 255];
        assert!(SlottedPage::build(records).is_ok());
    }

    #[test]
    fn test_build_rejects_overflow() {
        // 5 + 9 + 3987 = 4001
        let result = SlottedPage::build([vec![0u8; 3987]]);
        assert!(matches!(result, Err(PageError::Overflow { .. })));

        // 5 + 9 + 3986 = 4000, exactly full
        assert!(SlottedPage::build([vec![0u8; 3986]]).is_ok());
    }

    #[test]
    fn test_from_bytes_checks_length() {
        assert!(SlottedPage::from_bytes(vec![0u8; PAGE_SIZE]).is_ok());
        let result = SlottedPage::from_bytes(vec![0u8; 100]);
        assert!(matches!(result, Err(PageError::BadFrame { .. })));
    }

    #[tokio::test]
    async fn test_empty_page() {
        let page = SlottedPage::empty();
        let contents = page.contents().await.unwrap();
        assert_eq!(contents.header, PageHeader::default());
        assert!(contents.slots.is_empty());
        assert_eq!(contents.free_space(), PAGE_SIZE - PAGE_HEADER_SIZE);
    }

    #[tokio::test]
    async fn test_tombstone() {
        let mut page = sample_page();
        page.tombstone(SlotId::new(1)).await.unwrap();

        let contents = page.contents().await.unwrap();
        assert_eq!(contents.live, 2);
        assert_eq!(contents.tombstones, 1);
        assert!(contents.slots[1].entry.tombstone);
        assert!(contents.slots[1].payload.is_empty());
        assert_eq!(
            contents.records().collect::<Vec<_>>(),
            vec![b"hello world".as_slice(), b"hola amigo".as_slice()]
        );
    }

    #[tokio::test]
    async fn test_tombstone_missing_slot() {
        let mut page = sample_page();
        let result = page.tombstone(SlotId::new(42)).await;
        assert!(matches!(result, Err(PageError::SlotNotFound { .. })));
    }

    #[tokio::test]
    async fn test_compact_unchanged_without_tombstones() {
        let page = sample_page();
        let original = page.as_bytes().to_vec();
        match page.compact().await.unwrap() {
            Compaction::Unchanged(page) => assert_eq!(page.as_bytes(), &original[..]),
            other => panic!("expected Unchanged, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_compact_evicts_tombstones() {
        let mut page = sample_page();
        page.tombstone(SlotId::new(1)).await.unwrap();

        let compacted = match page.compact().await.unwrap() {
            Compaction::Rewritten(page) => page,
            other => panic!("expected Rewritten, got {:?}", other),
        };

        let contents = compacted.contents().await.unwrap();
        assert_eq!(contents.live, 2);
        assert_eq!(contents.tombstones, 0);
        assert_eq!(contents.header.item_count, 2);
        // The counter is preserved so slot ID 1 is never reissued
        assert_eq!(contents.header.next_slot_id, SlotId::new(3));
        assert_eq!(contents.slots[0].entry.id, SlotId::new(0));
        assert_eq!(contents.slots[1].entry.id, SlotId::new(2));
        assert_eq!(
            contents.records().collect::<Vec<_>>(),
            vec![b"hello world".as_slice(), b"hola amigo".as_slice()]
        );
        // Survivors are repacked flush against the end of the frame
        assert_eq!(contents.slots[0].entry.end(), PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_compact_drained() {
        let mut page = SlottedPage::build([b"only".as_slice()]).unwrap();
        page.tombstone(SlotId::new(0)).await.unwrap();
        assert!(matches!(page.compact().await.unwrap(), Compaction::Drained));
    }

    #[tokio::test]
    async fn test_free_space() {
        let page = SlottedPage::build([b"0123456789".as_slice()]).unwrap();
        let contents = page.contents().await.unwrap();
        assert_eq!(
            contents.free_space(),
            PAGE_SIZE - PAGE_HEADER_SIZE - SLOT_SIZE - 10
        );
    }

    #[test]
    fn test_footprint() {
        assert_eq!(footprint([]), PAGE_HEADER_SIZE);
        assert_eq!(footprint([10, 20]), PAGE_HEADER_SIZE + 2 * SLOT_SIZE + 30);
    }
}

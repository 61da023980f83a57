use crate::{FrameIndex, PageNumber, StepIndex};

/// Bookkeeping for one virtual page.
///
/// `frame` is `Some` exactly while the page is resident; `last_accessed`
/// and `next_access` are maintained by the dispatch loop on every
/// reference, before any fault handling runs.
#[derive(Copy, Clone, Default, Debug)]
pub struct PageTableEntry {
    pub frame: Option<FrameIndex>,
    pub last_accessed: StepIndex,
    pub next_access: Option<StepIndex>,
}

impl PageTableEntry {
    pub fn is_resident(&self) -> bool {
        self.frame.is_some()
    }
}

pub struct PageTable {
    table: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn new(max_pages: usize) -> Self {
        PageTable {
            table: vec![PageTableEntry::default(); max_pages],
        }
    }

    /// Number of virtual pages the table covers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, page_number: PageNumber) -> &PageTableEntry {
        &self.table[page_number]
    }

    /// Marks `page_number` resident in `frame_index`.
    pub fn map(&mut self, page_number: PageNumber, frame_index: FrameIndex) {
        self.table[page_number].frame = Some(frame_index);
    }

    /// Clears residency after an eviction. Timestamps stay; a page that
    /// comes back later still has its old `last_accessed` until the loop
    /// touches it again.
    pub fn unmap(&mut self, page_number: PageNumber) {
        self.table[page_number].frame = None;
    }

    pub fn touch(&mut self, page_number: PageNumber, step: StepIndex) {
        self.table[page_number].last_accessed = step;
    }

    pub fn set_next_access(&mut self, page_number: PageNumber, next: Option<StepIndex>) {
        self.table[page_number].next_access = next;
    }

    pub fn resident_count(&self) -> usize {
        self.table.iter().filter(|e| e.is_resident()).count()
    }
}

//! Victim selection.
//!
//! All four policies share one install path: take a free frame if any
//! exists, otherwise ask the policy for a victim. They differ only in how
//! `select_victim` scans the tables, so that is the whole trait surface a
//! policy has to implement.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::Error;
use crate::frame_table::FrameTable;
use crate::page_table::PageTable;
use crate::{FrameIndex, PageNumber, StepIndex};

/// Index of the first occurrence of `page` strictly after `after`, if any.
pub(crate) fn next_occurrence(
    refs: &[PageNumber],
    after: StepIndex,
    page: PageNumber,
) -> Option<StepIndex> {
    refs.iter()
        .skip(after + 1)
        .position(|&p| p == page)
        .map(|offset| after + 1 + offset)
}

/// How many times `page` recurs strictly after `after`.
fn future_frequency(refs: &[PageNumber], after: StepIndex, page: PageNumber) -> usize {
    refs.iter().skip(after + 1).filter(|&&p| p == page).count()
}

/// Index of the most recent occurrence of `page` strictly before `before`.
fn last_occurrence(refs: &[PageNumber], before: StepIndex, page: PageNumber) -> Option<StepIndex> {
    refs[..before].iter().rposition(|&p| p == page)
}

pub trait PageReplacer {
    /// Picks the frame to evict. Only called when every frame is occupied.
    ///
    /// Frames are scanned in index order by every policy; which frame wins
    /// a tie is part of each policy's contract, not an accident.
    fn select_victim(
        &mut self,
        page_table: &PageTable,
        frames: &FrameTable,
        refs: &[PageNumber],
        step: StepIndex,
    ) -> FrameIndex;

    /// Installs `page_number` on a fault: free frame first, eviction only
    /// when none remains. Mutates both tables so their views of frame
    /// ownership stay in agreement.
    fn replace(
        &mut self,
        page_table: &mut PageTable,
        frames: &mut FrameTable,
        page_number: PageNumber,
        refs: &[PageNumber],
        step: StepIndex,
    ) {
        if let Some(free) = frames.find_free_frame() {
            debug!(
                "mmu: free frame {} for page {}",
                free, page_number
            );
            frames.install(free, page_number);
            page_table.map(page_number, free);
            return;
        }

        let victim = self.select_victim(page_table, frames, refs, step);
        if let Some(evicted) = frames.page_at(victim) {
            debug!(
                "mmu: no free frame for page {}, evicting page {} from frame {}",
                page_number, evicted, victim
            );
            page_table.unmap(evicted);
        }
        frames.install(victim, page_number);
        page_table.map(page_number, victim);
    }
}

/// Round-robin over frame indices. The cursor belongs to this instance,
/// so a fresh simulation always starts evicting at frame 0, and it only
/// advances on evictions, never on free-frame installs.
pub struct FifoReplacer {
    next_victim_slot: FrameIndex,
}

impl FifoReplacer {
    pub fn new() -> Self {
        FifoReplacer {
            next_victim_slot: 0,
        }
    }
}

impl Default for FifoReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReplacer for FifoReplacer {
    fn select_victim(
        &mut self,
        _page_table: &PageTable,
        frames: &FrameTable,
        _refs: &[PageNumber],
        _step: StepIndex,
    ) -> FrameIndex {
        let victim = self.next_victim_slot;
        self.next_victim_slot = (self.next_victim_slot + 1) % frames.len();
        victim
    }
}

/// Evicts the page with the oldest `last_accessed` stamp. The dispatch
/// loop touches the faulting page before the fault is handled, so the
/// faulting page can never be picked against itself.
pub struct LruReplacer;

impl PageReplacer for LruReplacer {
    fn select_victim(
        &mut self,
        page_table: &PageTable,
        frames: &FrameTable,
        _refs: &[PageNumber],
        _step: StepIndex,
    ) -> FrameIndex {
        let mut victim = 0;
        let mut oldest = StepIndex::MAX;
        for (idx, frame) in frames.iter().enumerate() {
            if let Some(page) = frame.resident_page {
                let last = page_table.get(page).last_accessed;
                // strict < keeps the first minimum: lowest frame index wins ties
                if last < oldest {
                    oldest = last;
                    victim = idx;
                }
            }
        }
        victim
    }
}

/// Evicts the page whose next use lies farthest in the future. A page
/// that never recurs counts as distance `refs.len()`, which outranks any
/// real future index.
pub struct OptReplacer;

impl PageReplacer for OptReplacer {
    fn select_victim(
        &mut self,
        _page_table: &PageTable,
        frames: &FrameTable,
        refs: &[PageNumber],
        step: StepIndex,
    ) -> FrameIndex {
        let mut victim = 0;
        let mut farthest: Option<StepIndex> = None;
        for (idx, frame) in frames.iter().enumerate() {
            if let Some(page) = frame.resident_page {
                let next = next_occurrence(refs, step, page).unwrap_or(refs.len());
                // strict > keeps the first frame reaching the maximum
                if farthest.map_or(true, |best| next > best) {
                    farthest = Some(next);
                    victim = idx;
                }
            }
        }
        victim
    }
}

/// Hybrid heuristic: evict a page that never recurs as soon as one is
/// found, otherwise evict the page with the fewest future uses.
///
/// The frequency scan seeds its minimum from the first occupied frame and
/// compares with `<=`, so it always lands on a candidate and a later
/// frame takes frequency ties from an earlier one. That also means the
/// past-recency scan below it only runs if no frame held a resident page,
/// which never happens on the full table this is called with.
pub struct HpraReplacer;

impl PageReplacer for HpraReplacer {
    fn select_victim(
        &mut self,
        _page_table: &PageTable,
        frames: &FrameTable,
        refs: &[PageNumber],
        step: StepIndex,
    ) -> FrameIndex {
        let mut candidate: Option<(FrameIndex, usize)> = None;
        for (idx, frame) in frames.iter().enumerate() {
            let page = match frame.resident_page {
                Some(page) => page,
                None => continue,
            };
            if next_occurrence(refs, step, page).is_none() {
                // never referenced again: evict without finishing the scan
                return idx;
            }
            let freq = future_frequency(refs, step, page);
            match candidate {
                Some((_, min_freq)) if freq > min_freq => {}
                _ => candidate = Some((idx, freq)),
            }
        }
        if let Some((idx, _)) = candidate {
            return idx;
        }

        // Past-recency fallback: the frame referenced closest before the
        // current step.
        let mut victim = 0;
        let mut best_gap = usize::MAX;
        for (idx, frame) in frames.iter().enumerate() {
            if let Some(page) = frame.resident_page {
                if let Some(past) = last_occurrence(refs, step, page) {
                    let gap = step - past;
                    if gap < best_gap {
                        best_gap = gap;
                        victim = idx;
                    }
                }
            }
        }
        victim
    }
}

/// The closed set of replacement policies, picked once at configuration
/// time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    Fifo,
    Lru,
    Opt,
    Hpra,
}

impl Policy {
    pub const ALL: [Policy; 4] = [Policy::Fifo, Policy::Lru, Policy::Opt, Policy::Hpra];

    pub fn replacer(self) -> Box<dyn PageReplacer> {
        match self {
            Policy::Fifo => Box::new(FifoReplacer::new()),
            Policy::Lru => Box::new(LruReplacer),
            Policy::Opt => Box::new(OptReplacer),
            Policy::Hpra => Box::new(HpraReplacer),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::Fifo => "fifo",
            Policy::Lru => "lru",
            Policy::Opt => "opt",
            Policy::Hpra => "hpra",
        };
        f.write_str(name)
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Policy::Fifo),
            "lru" => Ok(Policy::Lru),
            "opt" => Ok(Policy::Opt),
            "hpra" => Ok(Policy::Hpra),
            other => Err(Error::UnknownPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_tables(pages: &[PageNumber], max_pages: usize) -> (PageTable, FrameTable) {
        let mut page_table = PageTable::new(max_pages);
        let mut frames = FrameTable::new(pages.len());
        for (idx, &page) in pages.iter().enumerate() {
            frames.install(idx, page);
            page_table.map(page, idx);
        }
        (page_table, frames)
    }

    #[test]
    fn lookahead_helpers() {
        let refs = [7, 0, 1, 2, 0, 3, 0];
        assert_eq!(next_occurrence(&refs, 1, 0), Some(4));
        assert_eq!(next_occurrence(&refs, 4, 0), Some(6));
        assert_eq!(next_occurrence(&refs, 0, 7), None);
        assert_eq!(next_occurrence(&refs, 6, 3), None);
        assert_eq!(future_frequency(&refs, 1, 0), 2);
        assert_eq!(future_frequency(&refs, 0, 7), 0);
        assert_eq!(last_occurrence(&refs, 5, 0), Some(4));
        assert_eq!(last_occurrence(&refs, 1, 3), None);
    }

    #[test]
    fn fifo_cursor_is_round_robin() {
        let refs = [0, 1, 2, 3, 4, 5];
        let (page_table, frames) = full_tables(&[0, 1, 2], 6);
        let mut fifo = FifoReplacer::new();
        assert_eq!(fifo.select_victim(&page_table, &frames, &refs, 3), 0);
        assert_eq!(fifo.select_victim(&page_table, &frames, &refs, 4), 1);
        assert_eq!(fifo.select_victim(&page_table, &frames, &refs, 5), 2);
        assert_eq!(fifo.select_victim(&page_table, &frames, &refs, 6), 0);
    }

    #[test]
    fn lru_picks_oldest_stamp_lowest_frame_on_tie() {
        let refs = [0, 1, 2, 3];
        let (mut page_table, frames) = full_tables(&[0, 1, 2], 4);
        page_table.touch(0, 5);
        page_table.touch(1, 2);
        page_table.touch(2, 4);
        let mut lru = LruReplacer;
        assert_eq!(lru.select_victim(&page_table, &frames, &refs, 3), 1);

        // equal stamps: the first minimum found wins
        page_table.touch(1, 4);
        assert_eq!(lru.select_victim(&page_table, &frames, &refs, 3), 1);
        page_table.touch(1, 5);
        assert_eq!(lru.select_victim(&page_table, &frames, &refs, 3), 2);
    }

    #[test]
    fn opt_picks_farthest_next_use() {
        // after step 3: page 0 next at 4, page 1 at 5, page 2 never
        let refs = [0, 1, 2, 3, 0, 1];
        let (page_table, frames) = full_tables(&[0, 1, 2], 4);
        let mut opt = OptReplacer;
        assert_eq!(opt.select_victim(&page_table, &frames, &refs, 3), 2);
    }

    #[test]
    fn opt_ties_go_to_lowest_frame() {
        // no resident page recurs after step 3: all tie at distance
        // refs.len(), and the first frame reaching the maximum keeps it
        let refs = [0, 1, 2, 3];
        let (page_table, frames) = full_tables(&[0, 1, 2], 4);
        let mut opt = OptReplacer;
        assert_eq!(opt.select_victim(&page_table, &frames, &refs, 3), 0);
    }

    #[test]
    fn hpra_no_future_page_short_circuits() {
        // page 2 (frame 2) never recurs; pages 0 and 1 do
        let refs = [0, 1, 2, 3, 0, 1];
        let (page_table, frames) = full_tables(&[0, 1, 2], 4);
        let mut hpra = HpraReplacer;
        assert_eq!(hpra.select_victim(&page_table, &frames, &refs, 3), 2);
    }

    #[test]
    fn hpra_frequency_tie_goes_to_highest_frame() {
        // every resident page recurs exactly once after step 3, so the
        // non-strict minimum walks to the last frame scanned
        let refs = [0, 1, 2, 3, 0, 1, 2];
        let (page_table, frames) = full_tables(&[0, 1, 2], 4);
        let mut hpra = HpraReplacer;
        assert_eq!(hpra.select_victim(&page_table, &frames, &refs, 3), 2);
    }

    #[test]
    fn hpra_prefers_lowest_future_frequency() {
        // after step 4: page 0 recurs twice, page 1 once, page 2 twice
        let refs = [0, 1, 2, 4, 4, 0, 1, 2, 0, 2];
        let (page_table, frames) = full_tables(&[0, 1, 2], 5);
        let mut hpra = HpraReplacer;
        assert_eq!(hpra.select_victim(&page_table, &frames, &refs, 4), 1);
    }

    #[test]
    fn policy_parses_and_prints() {
        assert_eq!("fifo".parse::<Policy>().unwrap(), Policy::Fifo);
        assert_eq!("LRU".parse::<Policy>().unwrap(), Policy::Lru);
        assert_eq!("Opt".parse::<Policy>().unwrap(), Policy::Opt);
        assert_eq!("hpra".parse::<Policy>().unwrap(), Policy::Hpra);
        assert!(matches!(
            "clock".parse::<Policy>(),
            Err(Error::UnknownPolicy(_))
        ));
        assert_eq!(Policy::Opt.to_string(), "opt");
    }
}

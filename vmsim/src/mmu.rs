use log::debug;

use crate::error::{Error, Result};
use crate::frame_table::FrameTable;
use crate::page_replacer::{next_occurrence, PageReplacer, Policy};
use crate::page_table::PageTable;
use crate::{PageNumber, StepIndex};

/// Simulation parameters, consumed once at construction.
#[derive(Clone, Debug)]
pub struct MmuConfig {
    /// Physical frame capacity. Must be positive.
    pub frame_count: usize,
    /// Sizes the page table; every reference must be below this.
    pub max_pages: usize,
    /// Which victim-selection rule runs on faults.
    pub policy: Policy,
    /// Collect a per-step record alongside the summary.
    pub trace: bool,
}

impl MmuConfig {
    pub fn new(frame_count: usize, max_pages: usize, policy: Policy) -> Self {
        MmuConfig {
            frame_count,
            max_pages,
            policy,
            trace: false,
        }
    }

    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::InvalidConfig(
                "frame_count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a single reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Hit,
    Fault,
}

/// One entry of the optional diagnostic trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepTrace {
    pub step: StepIndex,
    pub page: PageNumber,
    pub access: Access,
    /// Frame occupancy after the reference was handled.
    pub frames: Vec<Option<PageNumber>>,
}

/// Per-run totals handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub faults: usize,
    pub hits: usize,
    /// Resident page per frame at the end of the run, in frame order.
    pub frames: Vec<Option<PageNumber>>,
    /// Empty unless the config asked for tracing.
    pub trace: Vec<StepTrace>,
}

/// The memory management unit model: one page table, one frame table, one
/// replacement policy. All table mutation funnels through [`Mmu::run`].
pub struct Mmu {
    page_table: PageTable,
    frames: FrameTable,
    replacer: Box<dyn PageReplacer>,
    trace: bool,
}

impl Mmu {
    pub fn new(config: &MmuConfig) -> Result<Self> {
        Self::with_replacer(config, config.policy.replacer())
    }

    /// Builds an MMU around a caller-supplied policy instance.
    pub fn with_replacer(config: &MmuConfig, replacer: Box<dyn PageReplacer>) -> Result<Self> {
        config.validate()?;
        Ok(Mmu {
            page_table: PageTable::new(config.max_pages),
            frames: FrameTable::new(config.frame_count),
            replacer,
            trace: config.trace,
        })
    }

    /// Drives the whole reference sequence through the MMU and reports the
    /// totals.
    ///
    /// Consumes the MMU: page-table timestamps and policy state (the FIFO
    /// cursor in particular) are meaningful for exactly one run, so a
    /// second run needs a fresh instance.
    pub fn run(mut self, refs: &[PageNumber]) -> Result<Summary> {
        // Reject bad input before any state mutates.
        let max_pages = self.page_table.len();
        for (step, &page) in refs.iter().enumerate() {
            if page >= max_pages {
                return Err(Error::PageOutOfRange {
                    page,
                    step,
                    max_pages,
                });
            }
        }

        let mut summary = Summary {
            faults: 0,
            hits: 0,
            frames: Vec::new(),
            trace: Vec::new(),
        };

        for (step, &page) in refs.iter().enumerate() {
            let access = self.reference(page, refs, step);
            match access {
                Access::Hit => summary.hits += 1,
                Access::Fault => summary.faults += 1,
            }
            if self.trace {
                summary.trace.push(StepTrace {
                    step,
                    page,
                    access,
                    frames: self.frames.occupancy(),
                });
            }
            debug_assert_eq!(
                self.frames.occupied_count(),
                self.page_table.resident_count()
            );
        }

        summary.frames = self.frames.occupancy();
        Ok(summary)
    }

    /// Handles one reference: bookkeeping first, then hit/fault
    /// classification, then the policy on a fault.
    fn reference(&mut self, page: PageNumber, refs: &[PageNumber], step: StepIndex) -> Access {
        // The faulting page's own stamp is refreshed before the policy
        // runs, which is what keeps it safe from LRU.
        self.page_table.touch(page, step);
        self.page_table
            .set_next_access(page, next_occurrence(refs, step, page));

        if self.page_table.get(page).is_resident() {
            debug!("mmu: page hit for {}", page);
            Access::Hit
        } else {
            debug!("mmu: page fault for {}", page);
            self.replacer
                .replace(&mut self.page_table, &mut self.frames, page, refs, step);
            Access::Fault
        }
    }
}

//! Page-replacement simulator.
//!
//! A fixed sequence of page references is driven through an [`mmu::Mmu`],
//! which classifies every access as hit or fault and, on fault, installs
//! the page through one of the [`page_replacer`] policies. Frames carry no
//! page contents, only the number of the resident page; the interesting
//! behavior lives entirely in the victim-selection rules.

pub mod error;
pub mod frame_table;
pub mod mmu;
pub mod page_replacer;
pub mod page_table;

/// A virtual page number, `0..max_pages`.
pub type PageNumber = usize;

/// An index into the physical frame table.
pub type FrameIndex = usize;

/// A position in the reference sequence.
pub type StepIndex = usize;

use crate::{PageNumber, StepIndex};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Rejected simulation parameters.
    InvalidConfig(String),
    /// The reference sequence names a page the page table cannot hold.
    PageOutOfRange {
        page: PageNumber,
        step: StepIndex,
        max_pages: usize,
    },
    /// A policy name that does not match any known policy.
    UnknownPolicy(String),
}

impl std::error::Error for Error {}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::PageOutOfRange {
                page,
                step,
                max_pages,
            } => write!(
                f,
                "page {} at step {} is outside the page table (max_pages = {})",
                page, step, max_pages
            ),
            Error::UnknownPolicy(name) => write!(f, "unknown policy: {}", name),
        }
    }
}

//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod date_format;
mod inventory;
mod retirement;
mod summary;
mod tag;

pub use date_format::{DEFAULT_DATE_FORMAT, DateFormat};
pub use inventory::{ResourceGroupNode, ResourceNode, SubscriptionNode};
pub use retirement::{
    DEFAULT_DELETE_BY_TAG_KEY, DEFAULT_TARGET_TAG_KEY, DEFAULT_TARGET_TAG_VALUE, Decision,
    ExecutionMode, Outcome, RetirementPolicy,
};
pub use summary::RunSummary;
pub use tag::{CaseSensitivity, ResourceTagSet, TagRule};

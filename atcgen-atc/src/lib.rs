//! Automated test case construction for atcgen
//!
//! Turns a [`SpecTable`](atcgen_core::SpecTable) and a
//! [`CallSequence`](atcgen_core::CallSequence) into a language-neutral
//! [`TestUnit`]: one helper method per distinct function under test and an
//! entrypoint that replays the call sequence.

pub mod builder;
pub mod config;
pub mod error;
pub mod ir;
pub mod transform;

pub use builder::AtcBuilder;
pub use config::{AtcConfig, UnmatchedCallPolicy};
pub use error::{AtcError, AtcResult};
pub use ir::{HelperMethod, Statement, TestUnit};
pub use transform::{
    collect_old_state_vars, find_post_state_parameter, transform_post_condition, OldStateMap,
};

//! Upgrade tracking: catalog of known upgrades and the tracker that reads them off
//! the in-battle upgrade panels.

pub mod catalog;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use catalog::{Upgrade, UpgradeOption, UpgradeWindow};
pub use tracker::{ReadingOutcome, UpgradeTracker};

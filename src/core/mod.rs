//! Pure launcher logic, testable without real processes or sockets

pub mod poller;
pub mod reaper;

pub use poller::{ReadinessPoller, ReadyReport};
pub use reaper::PortReaper;

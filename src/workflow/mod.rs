//! Module workflow engine: per-session state machines, the background
//! progress driver and the notification seam between them.

pub mod driver;
pub mod extraction;
pub mod notify;
pub mod session;
pub mod types;

//! Process-level plumbing shared by the explorer services: logging setup and
//! cooperative shutdown signalling.

pub mod logging;
pub mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownGuard, ShutdownSignal};

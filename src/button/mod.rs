pub mod config;
pub mod control;
pub mod lifecycle;
pub mod registry;
pub mod state;

pub use config::ButtonConfig;
pub use control::{Container, Control, MemoryContainer, MemoryControl, SharedControl};
pub use lifecycle::{ButtonLifecycle, ClickOutcome};
pub use registry::{ButtonRegistry, STATEFUL_MARKER};
pub use state::{ButtonState, OriginalSnapshot};

pub mod event;

pub use event::{EventKind, InboundEvent};

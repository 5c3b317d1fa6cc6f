pub mod ports;
pub mod render;
pub mod webhook;

pub use ports::{BlockSink, Clock, FixedClock, MemorySink, StdoutSink, SystemClock};
pub use render::{Highlight, RenderOptions, Renderer, ResponseColorPolicy};
pub use webhook::{SharedWebhookService, WebhookService};

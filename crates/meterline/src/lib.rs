//! Top-level facade crate for meterline.
//!
//! Re-exports the metric core and the HTTP exporter so users can depend on a single crate.

pub mod core {
    pub use meterline_core::*;
}

pub mod http {
    pub use meterline_http::*;
}

pub use meterline_core::{global, render_text, Registry};

//! Top-level facade crate for demo-svc.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use demo_svc_core::*;
}

pub mod server {
    pub use demo_svc_server::*;
}

//! HTTP API handlers for binsight-relay

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod reconcile;
pub mod ui;

pub use analyze::analyze;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use reconcile::reconcile_payload;
pub use ui::{serve_app_js, serve_index};

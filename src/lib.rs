//! Campus Voice — complaint routing & workflow engine.
//!
//! Routes student grievances to the correct human handler, enforces who may
//! move a complaint through its lifecycle, and prevents anyone mentioned in
//! a complaint from adjudicating it.
//!
//! The engine is a pure decision layer: durable state lives behind the
//! [`ports`] traits, the routing tables are an immutable [`RoutingConfig`]
//! built once at startup, and every operation takes the acting user
//! explicitly.
//!
//! ```no_run
//! use std::sync::Arc;
//! use campus_voice::{GrievanceService, MemoryStore, NullClassifier, RoutingConfig};
//!
//! let store = Arc::new(MemoryStore::new());
//! let service = GrievanceService::new(
//!     Arc::new(RoutingConfig::default()),
//!     store.clone(),
//!     store,
//!     Arc::new(NullClassifier),
//! );
//! ```

pub mod assignment;
pub mod conflict;
pub mod error;
pub mod memory;
pub mod ports;
pub mod routing;
pub mod service;

pub use assignment::{AssignmentDecision, AssignmentEngine};
pub use error::EngineError;
pub use memory::MemoryStore;
pub use ports::{CategoryClassifier, ComplaintStore, NullClassifier, Result, UserDirectory};
pub use routing::{Authority, RoutingConfig};
pub use service::GrievanceService;

// Re-export the boundary types so callers need a single dependency.
pub use campus_voice_types as types;

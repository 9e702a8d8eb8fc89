pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod store;
pub mod submit;
pub mod viewport;

pub use cache::{CachedSignature, KeyValueStorage, MemoryStorage, SignatureCache};
pub use config::{InputGate, SigningConfig};
pub use error::SignError;
pub use geometry::Corner;
pub use id::PlacementId;
pub use model::{ImageRef, Placement};
pub use store::PlacementStore;
pub use submit::{SigningEndpoint, SubmissionRecord, build_submission};
pub use viewport::{ViewportMetrics, ViewportTracker};

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Point, Size, Vec2};

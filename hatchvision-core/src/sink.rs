//! Seam between the vision loop and the shared state store

use crate::error::Result;
use crate::types::{Offset, RobotMode};
use async_trait::async_trait;

/// Consumer of per-frame offsets
///
/// Implementations must not block indefinitely in `publish`; the loop drops
/// a value rather than queueing it, since a stale offset is worse than a
/// missing one.
#[async_trait]
pub trait StateSink: Send + Sync {
    /// Get the sink name
    fn name(&self) -> &str;

    /// Whether the underlying store is connected
    fn is_ready(&self) -> bool;

    /// Publish one frame's offset
    async fn publish(&self, offset: &Offset) -> Result<()>;

    /// Current robot mode; read-only from the sink's point of view
    fn mode(&self) -> RobotMode;
}

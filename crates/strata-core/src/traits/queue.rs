use async_trait::async_trait;

use crate::errors::StrataResult;
use crate::models::Event;

/// Durable, path-coalescing mailbox of pending events.
#[async_trait]
pub trait EventQueue: Send + Sync {
    /// Upsert by path. Overwrites any unconsumed event for the same path.
    async fn enqueue(&self, event: &Event) -> StrataResult<()>;

    /// Insert only if nothing is pending for the path. Returns whether a
    /// row was written.
    async fn enqueue_if_absent(&self, event: &Event) -> StrataResult<bool>;

    /// Oldest pending event by timestamp. Does not remove it.
    async fn dequeue_oldest(&self) -> StrataResult<Option<Event>>;

    /// Remove the row carrying `event_id`. A newer event that coalesced
    /// onto the same path is left in place. Returns whether a row was removed.
    async fn acknowledge(&self, event_id: &str) -> StrataResult<bool>;

    /// Number of pending rows.
    async fn pending_count(&self) -> StrataResult<usize>;
}

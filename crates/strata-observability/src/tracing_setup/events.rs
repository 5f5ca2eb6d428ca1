//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// A model finished reconciling a path.
pub fn event_reconciled(path: &str, model: &str, action: &str, event_id: &str) {
    tracing::info!(
        event = "event_reconciled",
        path = %path,
        model = %model,
        action = %action,
        event_id = %event_id,
        "event reconciled"
    );
}

/// A path was skipped by a business rule.
pub fn event_ignored(path: &str, model: &str, reason: &str) {
    tracing::info!(
        event = "event_ignored",
        path = %path,
        model = %model,
        reason = %reason,
        "event ignored"
    );
}

/// Reconciling a path failed and an error row was written.
pub fn event_failed(path: &str, model: &str, error: &str) {
    tracing::warn!(
        event = "event_failed",
        path = %path,
        model = %model,
        error = %error,
        "event failed"
    );
}

/// An access-control change requeued its root.
pub fn acl_requeued(acl_path: &str, root: &str) {
    tracing::info!(
        event = "acl_requeued",
        acl_path = %acl_path,
        root = %root,
        "access control changed, root requeued"
    );
}

/// A subtree was invalidated after its root became inaccessible.
pub fn cascade_invalidated(root: &str, removed: usize, failed: usize) {
    tracing::info!(
        event = "cascade_invalidated",
        root = %root,
        removed = removed,
        failed = failed,
        "cascade invalidation completed"
    );
}

/// A bulk recrawl finished.
pub fn crawl_completed(root: &str, visited: usize, emitted: usize, failed: usize) {
    tracing::info!(
        event = "crawl_completed",
        root = %root,
        visited = visited,
        emitted = emitted,
        failed = failed,
        "recrawl completed"
    );
}

/// The poll loop hit a queue/ledger failure and is backing off.
pub fn transient_backoff(error: &str, backoff_secs: u64) {
    tracing::warn!(
        event = "transient_backoff",
        error = %error,
        backoff_secs = backoff_secs,
        "infrastructure failure, backing off"
    );
}

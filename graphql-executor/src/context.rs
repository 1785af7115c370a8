//! Provide a [`Context`] for the execution of one operation.
//!
//! Resolvers asking for it receive the context of their field, which shares cancellation and
//! entries with the whole request.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;
use crate::error::Cancelled;
use crate::json_ext::Value;

/// Context for an operation being executed.
///
/// Cloning is cheap. Clones and derived contexts observe the same cancellation and entries.
#[derive(Clone, Debug)]
pub struct Context {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    entries: Arc<DashMap<String, Value>>,
    span: tracing::Span,
    created_at: Instant,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Context {
            cancellation: CancellationToken::new(),
            deadline: None,
            entries: Default::default(),
            span: tracing::Span::current(),
            created_at: Instant::now(),
        }
    }

    /// Cancels the operation. Resolvers not started yet will not be called.
    pub fn cancel(&self) {
        self.cancellation.cancel()
    }

    /// Token cancelling this context, for transports that detect disconnected clients.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Derives a context that expires after `timeout`, or earlier if this one already does.
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a context that expires at `deadline`, or earlier if this one already does.
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Context {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context stopped, if it did.
    ///
    /// Explicit cancellation takes precedence over an expired deadline.
    pub fn cancelled(&self) -> Option<Cancelled> {
        if self.cancellation.is_cancelled() {
            Some(Cancelled::Canceled)
        } else if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            Some(Cancelled::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Cancelled {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancellation.cancelled() => Cancelled::Canceled,
                    _ = tokio::time::sleep_until(deadline.into()) => Cancelled::DeadlineExceeded,
                }
            }
            None => {
                self.cancellation.cancelled().await;
                Cancelled::Canceled
            }
        }
    }

    /// Returns true if the context contains a value for the specified key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a value from the context using the provided key.
    ///
    /// Semantics:
    ///  - If the operation fails, that is because we can't deserialize the value.
    ///  - If the operation succeeds, the value is an [`Option`].
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, BoxError> {
        self.entries
            .get(key)
            .map(|value| serde_json_bytes::from_value(value.value().clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Insert a value into the context using the provided key and value.
    ///
    /// Semantics:
    ///  - If the operation fails, then the pair has not been inserted.
    ///  - If the operation succeeds, the result is the old value as an [`Option`].
    pub fn insert<K, V>(&self, key: K, value: V) -> Result<Option<Value>, BoxError>
    where
        K: Into<String>,
        V: Serialize,
    {
        let value = serde_json_bytes::to_value(value)?;
        Ok(self.entries.insert(key.into(), value))
    }

    /// Time elapsed since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Span of the field currently executing, parent of the spans of nested fields.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub(crate) fn with_span(&self, span: tracing::Span) -> Context {
        Context {
            span,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_shared_with_derived_contexts() {
        let context = Context::new();
        let derived = context.with_timeout(Duration::from_secs(60));

        assert!(context.insert("user", "leia").unwrap().is_none());
        assert_eq!(
            derived.get::<String>("user").unwrap().as_deref(),
            Some("leia")
        );
        assert!(derived.contains_key("user"));
        assert!(context.get::<u32>("user").is_err());
    }

    #[test]
    fn cancellation_is_shared() {
        let context = Context::new();
        let derived = context.with_timeout(Duration::from_secs(60));
        assert_eq!(derived.cancelled(), None);

        context.cancel();
        assert_eq!(derived.cancelled(), Some(Cancelled::Canceled));
    }

    #[test]
    fn expired_deadline_reports_deadline_exceeded() {
        let context = Context::new().with_deadline(Instant::now());
        assert_eq!(context.cancelled(), Some(Cancelled::DeadlineExceeded));

        context.cancel();
        assert_eq!(context.cancelled(), Some(Cancelled::Canceled));
    }

    #[test]
    fn deadlines_only_shrink() {
        let context = Context::new().with_timeout(Duration::from_secs(1));
        let first = context.deadline().unwrap();
        let derived = context.with_timeout(Duration::from_secs(3600));
        assert_eq!(derived.deadline(), Some(first));
    }

    #[tokio::test]
    async fn done_resolves_on_cancel() {
        let context = Context::new();
        let waiter = context.clone();
        let handle = tokio::spawn(async move { waiter.done().await });
        context.cancel();
        assert_eq!(handle.await.unwrap(), Cancelled::Canceled);
    }

    #[tokio::test]
    async fn done_resolves_on_deadline() {
        let context = Context::new().with_timeout(Duration::from_millis(10));
        assert_eq!(context.done().await, Cancelled::DeadlineExceeded);
    }
}

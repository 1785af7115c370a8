//! Table-driven resolvers for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::BoxError;
use crate::json_ext::Object;
use crate::resolver::FieldCall;
use crate::resolver::ResolvedValue;
use crate::resolver::Resolver;
use crate::resolver::ResolverHandle;
use crate::spec::SelectedField;

/// Tracks how many calls run at once.
#[derive(Clone, Debug, Default)]
pub(crate) struct Gauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Gauge {
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

enum Behavior {
    Value(ResolvedValue),
    Fail(String),
    Panic(String),
    Delay(Duration, ResolvedValue),
    Measure(Gauge, Duration, ResolvedValue),
    Cancel(ResolvedValue),
}

/// What a resolver method received.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordedCall {
    pub(crate) method: usize,
    pub(crate) has_context: bool,
    pub(crate) arguments: Option<Object>,
    pub(crate) selected: Option<Vec<SelectedField>>,
}

/// Resolver whose methods return canned results.
///
/// Methods without an entry return null.
#[derive(Default)]
pub(crate) struct MockResolver {
    methods: HashMap<usize, Behavior>,
    narrowings: HashMap<usize, ResolverHandle>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn returns(mut self, method: usize, value: impl Into<ResolvedValue>) -> Self {
        self.methods.insert(method, Behavior::Value(value.into()));
        self
    }

    pub(crate) fn fails(mut self, method: usize, message: &str) -> Self {
        self.methods
            .insert(method, Behavior::Fail(message.to_string()));
        self
    }

    pub(crate) fn panics(mut self, method: usize, message: &str) -> Self {
        self.methods
            .insert(method, Behavior::Panic(message.to_string()));
        self
    }

    pub(crate) fn delays(
        mut self,
        method: usize,
        delay: Duration,
        value: impl Into<ResolvedValue>,
    ) -> Self {
        self.methods
            .insert(method, Behavior::Delay(delay, value.into()));
        self
    }

    pub(crate) fn measures(
        mut self,
        method: usize,
        gauge: &Gauge,
        delay: Duration,
        value: impl Into<ResolvedValue>,
    ) -> Self {
        self.methods.insert(
            method,
            Behavior::Measure(gauge.clone(), delay, value.into()),
        );
        self
    }

    /// Cancels the request context, which the method must ask for, then returns `value`.
    pub(crate) fn cancels(mut self, method: usize, value: impl Into<ResolvedValue>) -> Self {
        self.methods.insert(method, Behavior::Cancel(value.into()));
        self
    }

    pub(crate) fn narrows(mut self, method: usize, narrowed: ResolverHandle) -> Self {
        self.narrowings.insert(method, narrowed);
        self
    }

    /// Shares the log of received calls.
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        self.calls.clone()
    }

    pub(crate) fn into_handle(self) -> ResolverHandle {
        Arc::new(self)
    }

    pub(crate) fn into_value(self) -> ResolvedValue {
        ResolvedValue::Object(self.into_handle())
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn call(&self, method: usize, call: FieldCall<'_>) -> Result<ResolvedValue, BoxError> {
        self.calls.lock().push(RecordedCall {
            method,
            has_context: call.context.is_some(),
            arguments: call.arguments.cloned(),
            selected: call.selected.clone(),
        });

        match self.methods.get(&method) {
            None => Ok(ResolvedValue::Null),
            Some(Behavior::Value(value)) => Ok(value.clone()),
            Some(Behavior::Fail(message)) => Err(message.clone().into()),
            Some(Behavior::Panic(message)) => panic!("{message}"),
            Some(Behavior::Delay(delay, value)) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
            Some(Behavior::Measure(gauge, delay, value)) => {
                gauge.enter();
                tokio::time::sleep(*delay).await;
                gauge.exit();
                Ok(value.clone())
            }
            Some(Behavior::Cancel(value)) => {
                if let Some(context) = call.context {
                    context.cancel();
                }
                Ok(value.clone())
            }
        }
    }

    fn narrow(&self, method: usize) -> Option<ResolverHandle> {
        self.narrowings.get(&method).cloned()
    }
}

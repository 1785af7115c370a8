//! The public entry point for executing operations.

use std::sync::Arc;

use tracing::Instrument;

use crate::configuration::Configuration;
use crate::configuration::ConfigurationError;
use crate::context::Context;
use crate::execution::Limiter;
use crate::execution::Request;
use crate::graphql::Response;
use crate::spec::Operation;
use crate::spec::Schema;
use crate::trace::DefaultLogger;
use crate::trace::Logger;
use crate::trace::Tracer;
use crate::trace::TracingTracer;

/// Executes operations against a schema.
///
/// Cheap to clone. Each call to [`Executor::execute`] runs with its own error list and
/// concurrency limit.
#[derive(Clone)]
pub struct Executor {
    schema: Schema,
    configuration: Arc<Configuration>,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn Logger>,
}

#[buildstructor::buildstructor]
impl Executor {
    /// Returns a builder for an executor.
    ///
    /// Builder methods:
    ///
    /// * `.schema(Schema)`
    ///   Required.
    ///
    /// * `.configuration(Configuration)`
    ///   Optional. Validated when building.
    ///
    /// * `.tracer(Arc<dyn Tracer>)`
    ///   Optional. Defaults to [`TracingTracer`].
    ///
    /// * `.logger(Arc<dyn Logger>)`
    ///   Optional. Defaults to [`DefaultLogger`].
    #[builder(visibility = "pub")]
    fn new(
        schema: Schema,
        configuration: Option<Configuration>,
        tracer: Option<Arc<dyn Tracer>>,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            schema,
            configuration: Arc::new(configuration.unwrap_or_default().validate()?),
            tracer: tracer.unwrap_or_else(|| Arc::new(TracingTracer)),
            logger: logger.unwrap_or_else(|| Arc::new(DefaultLogger)),
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Executes `operation`.
    ///
    /// `data` is absent when the context was cancelled or timed out before the end of the
    /// execution. Partial results are never returned in that case.
    pub async fn execute(&self, context: &Context, operation: &Operation) -> Response {
        let context = match self.configuration.timeout {
            Some(timeout) => context.with_timeout(timeout),
            None => context.clone(),
        };
        let span = tracing::info_span!(
            parent: context.span(),
            "graphql.execute",
            "graphql.operation.kind" = %operation.kind,
            "graphql.operation.name" = operation.name.as_deref().unwrap_or_default(),
        );
        let context = context.with_span(span.clone());

        let request = Request::new(
            Limiter::new(self.configuration.max_parallelism),
            self.tracer.clone(),
            self.logger.clone(),
        );
        let (data, errors) = request
            .execute(&context, &self.schema, operation)
            .instrument(span)
            .await;

        tracing::debug!(
            errors = errors.len(),
            elapsed = ?context.elapsed(),
            "operation executed"
        );
        Response::new((!data.is_empty()).then_some(data), errors)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("schema", &self.schema)
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

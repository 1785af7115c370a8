//! Field tracing and panic logging hooks.
//!
//! The defaults report through `tracing`; embedders may plug their own backends.

use tracing::field::Empty;

use crate::context::Context;
use crate::error::PanicPayload;
use crate::graphql::Error;
use crate::json_ext::Object;

/// Opens one span per executed field.
pub trait Tracer: Send + Sync {
    /// Starts the span of a field.
    ///
    /// The returned context is handed to the resolver and to nested fields. The returned span
    /// must be finished exactly once.
    fn trace_field(
        &self,
        context: &Context,
        label: &str,
        type_name: &str,
        field_name: &str,
        trivial: bool,
        arguments: Option<&Object>,
    ) -> (Context, Box<dyn FieldSpan>);
}

/// An open field span.
pub trait FieldSpan: Send {
    fn finish(self: Box<Self>, error: Option<&Error>);
}

/// Receives panics caught during execution.
pub trait Logger: Send + Sync {
    fn log_panic(&self, context: &Context, payload: &PanicPayload);
}

/// Reports fields as `graphql.field` spans nested under the span of their parent field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn trace_field(
        &self,
        context: &Context,
        label: &str,
        type_name: &str,
        field_name: &str,
        trivial: bool,
        arguments: Option<&Object>,
    ) -> (Context, Box<dyn FieldSpan>) {
        let span = tracing::info_span!(
            parent: context.span(),
            "graphql.field",
            "graphql.field.label" = label,
            "graphql.type.name" = type_name,
            "graphql.field.name" = field_name,
            "graphql.field.trivial" = trivial,
            "graphql.field.arguments" = Empty,
            "graphql.field.error" = Empty,
        );
        if let Some(arguments) = arguments
            && let Ok(arguments) = serde_json::to_string(arguments)
        {
            span.record("graphql.field.arguments", arguments.as_str());
        }

        (
            context.with_span(span.clone()),
            Box::new(TracingFieldSpan { span }),
        )
    }
}

struct TracingFieldSpan {
    span: tracing::Span,
}

impl FieldSpan for TracingFieldSpan {
    fn finish(self: Box<Self>, error: Option<&Error>) {
        if let Some(error) = error {
            self.span
                .record("graphql.field.error", tracing::field::display(error));
        }
    }
}

/// Does not trace anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn trace_field(
        &self,
        context: &Context,
        _label: &str,
        _type_name: &str,
        _field_name: &str,
        _trivial: bool,
        _arguments: Option<&Object>,
    ) -> (Context, Box<dyn FieldSpan>) {
        (context.clone(), Box::new(NoopFieldSpan))
    }
}

struct NoopFieldSpan;

impl FieldSpan for NoopFieldSpan {
    fn finish(self: Box<Self>, _error: Option<&Error>) {}
}

/// Logs panics as `tracing` error events.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log_panic(&self, context: &Context, payload: &PanicPayload) {
        tracing::error!(
            parent: context.span(),
            panic = %payload,
            "graphql: panic occurred while executing operation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_keeps_the_context() {
        let context = Context::new();
        context.insert("key", 1).unwrap();
        let (derived, span) = NoopTracer.trace_field(&context, "", "Query", "a", true, None);
        span.finish(None);
        assert_eq!(derived.get::<i32>("key").unwrap(), Some(1));
    }
}

//! Execution of one operation against a resolver graph.
//!
//! The selection tree is walked top-down. Every selection set is merged into the fields to execute
//! for the current value, each field calls its resolver method, and the result is serialized as
//! JSON directly into the output buffer, descending into nested selection sets on the way.
//!
//! Selection sets containing asynchronous fields run their fields concurrently, list elements run
//! concurrently when anything below them is asynchronous. Each of these units has its own panic
//! boundary. Mutation root fields always run one after the other.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod field;
mod limiter;
mod merge;
mod path;
mod serialize;

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::join_all;
use parking_lot::Mutex;

pub(crate) use self::limiter::Limiter;
use self::merge::FieldToExecute;
use self::path::PathSegment;
use crate::context::Context;
use crate::error::ExecutionError;
use crate::error::PanicPayload;
use crate::graphql::Error;
use crate::resolver::ResolverHandle;
use crate::spec::Operation;
use crate::spec::Schema;
use crate::spec::Selection;
use crate::trace::Logger;
use crate::trace::Tracer;

/// Raised when a value could not be completed at a non-null position.
///
/// The error has already been recorded. The nearest nullable ancestor replaces its output with
/// `null`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct InvalidValue;

const NULL: &[u8] = b"null";

/// The state of one operation being executed.
pub(crate) struct Request {
    errors: Mutex<Vec<Error>>,
    limiter: Limiter,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn Logger>,
}

impl Request {
    pub(crate) fn new(limiter: Limiter, tracer: Arc<dyn Tracer>, logger: Arc<dyn Logger>) -> Self {
        Self {
            errors: Default::default(),
            limiter,
            tracer,
            logger,
        }
    }

    /// Executes `operation` from the root resolver of `schema`.
    ///
    /// Returns the serialized data, `null` if a non-null violation reached the root. If the
    /// context was cancelled by the end of the walk, the data is dropped and the only error is
    /// the cancellation.
    pub(crate) async fn execute(
        &self,
        context: &Context,
        schema: &Schema,
        operation: &Operation,
    ) -> (Bytes, Vec<Error>) {
        let mut out = Vec::new();
        let result = AssertUnwindSafe(self.execute_selections(
            context,
            operation.selection_set.iter().collect(),
            &schema.resolver,
            None,
            operation.kind.is_serial(),
            &mut out,
        ))
        .catch_unwind()
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(InvalidValue)) => {
                out.clear();
                out.extend_from_slice(NULL);
            }
            Err(payload) => {
                let error = self.panicked(context, payload).to_graphql_error(None);
                self.add_error(error);
                out.clear();
                out.extend_from_slice(NULL);
            }
        }

        if let Some(cause) = context.cancelled() {
            tracing::debug!(%cause, "discarding the result of a cancelled operation");
            return (
                Bytes::new(),
                vec![ExecutionError::Cancelled(cause).to_graphql_error(None)],
            );
        }

        (Bytes::from(out), std::mem::take(&mut *self.errors.lock()))
    }

    /// Writes the JSON object selected by `selections` on `resolver`.
    fn execute_selections<'a>(
        &'a self,
        context: &'a Context,
        selections: Vec<&'a Selection>,
        resolver: &'a ResolverHandle,
        path: Option<&'a PathSegment<'a>>,
        serially: bool,
        out: &'a mut Vec<u8>,
    ) -> BoxFuture<'a, Result<(), InvalidValue>> {
        async move {
            let concurrent = !serially && Selection::has_async(selections.iter().copied());

            let mut fields = Vec::new();
            merge::collect_fields(selections, resolver, &mut fields, &mut HashMap::new());

            let mut valid = true;
            out.push(b'{');
            if concurrent {
                let outputs = join_all(
                    fields
                        .iter()
                        .map(|field| self.execute_field_task(context, field, path)),
                )
                .await;
                for (index, (field, (result, output))) in fields.iter().zip(outputs).enumerate() {
                    if index > 0 {
                        out.push(b',');
                    }
                    serialize::write_key(out, field.alias());
                    out.extend_from_slice(&output);
                    valid &= result.is_ok();
                }
            } else {
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        out.push(b',');
                    }
                    serialize::write_key(out, field.alias());
                    let path = PathSegment::key(path, field.alias());
                    valid &= self
                        .execute_field(context, field, &path, false, out)
                        .await
                        .is_ok();
                }
            }
            out.push(b'}');

            if valid { Ok(()) } else { Err(InvalidValue) }
        }
        .boxed()
    }

    /// Runs one field of a concurrent selection set into its own buffer.
    async fn execute_field_task(
        &self,
        context: &Context,
        field: &FieldToExecute<'_>,
        parent: Option<&PathSegment<'_>>,
    ) -> (Result<(), InvalidValue>, Vec<u8>) {
        let path = PathSegment::key(parent, field.alias());
        let mut output = Vec::new();
        let result = AssertUnwindSafe(self.execute_field(context, field, &path, true, &mut output))
            .catch_unwind()
            .await;
        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                let error = self.panicked(context, payload);
                self.fail(error, &path, field.field.field.field_type.is_non_null(), &mut output, 0)
            }
        };
        (result, output)
    }

    /// Records `error` at `path` and nulls the output written since `start`, unless the position
    /// is non-null, in which case the parent has to.
    fn fail(
        &self,
        error: ExecutionError,
        path: &PathSegment<'_>,
        non_null: bool,
        out: &mut Vec<u8>,
        start: usize,
    ) -> Result<(), InvalidValue> {
        self.add_error(error.to_graphql_error(Some(path.to_path())));
        if non_null {
            Err(InvalidValue)
        } else {
            out.truncate(start);
            out.extend_from_slice(NULL);
            Ok(())
        }
    }

    fn panicked(&self, context: &Context, payload: Box<dyn Any + Send>) -> ExecutionError {
        let payload = PanicPayload::from(payload);
        self.logger.log_panic(context, &payload);
        ExecutionError::Panic(payload)
    }

    fn add_error(&self, error: Error) {
        self.errors.lock().push(error);
    }
}

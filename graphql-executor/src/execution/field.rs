use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::Instrument;

use super::InvalidValue;
use super::Request;
use super::merge::FieldToExecute;
use super::path::PathSegment;
use crate::context::Context;
use crate::error::ExecutionError;
use crate::resolver::FieldCall;
use crate::resolver::ResolvedValue;
use crate::spec::SelectedField;

impl Request {
    /// Executes one field and writes its value to `out`.
    ///
    /// Resolver failures and panics are recorded on the field's path. The field then completes as
    /// `null`, or fails with [`InvalidValue`] if its type is non-null.
    pub(super) async fn execute_field(
        &self,
        context: &Context,
        field: &FieldToExecute<'_>,
        path: &PathSegment<'_>,
        concurrent: bool,
        out: &mut Vec<u8>,
    ) -> Result<(), InvalidValue> {
        let definition = &field.field.field;

        let permit = if concurrent {
            self.limiter.acquire().await
        } else {
            None
        };

        let (context, span) = self.tracer.trace_field(
            context,
            &definition.trace_label,
            &definition.type_name,
            &definition.name,
            !definition.is_async,
            field.field.arguments.as_ref(),
        );

        let result = match AssertUnwindSafe(self.invoke(&context, field))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(self.panicked(&context, payload)),
        };
        drop(permit);

        match result {
            Ok(value) => {
                span.finish(None);
                let selections = field.selections.as_slice();
                self.complete_value(&context, value, &definition.field_type, selections, path, out)
                    .await
            }
            Err(error) => {
                let error = error.to_graphql_error(Some(path.to_path()));
                span.finish(Some(&error));
                self.add_error(error);
                if definition.field_type.is_non_null() {
                    Err(InvalidValue)
                } else {
                    out.extend_from_slice(super::NULL);
                    Ok(())
                }
            }
        }
    }

    async fn invoke(
        &self,
        context: &Context,
        field: &FieldToExecute<'_>,
    ) -> Result<ResolvedValue, ExecutionError> {
        if let Some(fixed) = &field.field.fixed_result {
            return Ok(fixed.clone());
        }
        if let Some(cause) = context.cancelled() {
            return Err(ExecutionError::Cancelled(cause));
        }

        let definition = &field.field.field;
        let mut call = FieldCall::default();
        if definition.has_context {
            call.context = Some(context);
        }
        call.arguments = field.field.arguments.as_ref();
        if definition.has_selected {
            call.selected = Some(SelectedField::from_selections(
                field.selections.iter().copied(),
            ));
        }

        field
            .resolver
            .call(definition.method_index, call)
            .instrument(context.span().clone())
            .await
            .map_err(ExecutionError::Resolver)
    }
}

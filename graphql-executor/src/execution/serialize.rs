//! Type-directed serialization of resolved values.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::join_all;

use super::InvalidValue;
use super::NULL;
use super::Request;
use super::path::PathSegment;
use crate::context::Context;
use crate::error::ExecutionError;
use crate::resolver::ResolvedValue;
use crate::spec::FieldType;
use crate::spec::Selection;

/// Writes `"key":`.
pub(super) fn write_key(out: &mut Vec<u8>, key: &str) {
    write_string(out, key);
    out.push(b':');
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    // serializing a str into memory does not fail
    let _ = serde_json::to_writer(out, value);
}

impl Request {
    /// Writes `value` as JSON according to `field_type`.
    ///
    /// Composite values execute `selections` one level down. A value that cannot be completed at
    /// a nullable position is replaced by `null`, at a non-null position the failure is handed to
    /// the caller.
    pub(super) fn complete_value<'a>(
        &'a self,
        context: &'a Context,
        value: ResolvedValue,
        field_type: &'a FieldType,
        selections: &'a [&'a Selection],
        path: &'a PathSegment<'a>,
        out: &'a mut Vec<u8>,
    ) -> BoxFuture<'a, Result<(), InvalidValue>> {
        async move {
            let (bare_type, non_null) = field_type.unwrap_non_null();

            if value.is_null() {
                if non_null {
                    let error = ExecutionError::NullValue {
                        type_name: field_type.to_string(),
                    };
                    return self.fail(error, path, true, out, 0);
                }
                out.extend_from_slice(NULL);
                return Ok(());
            }

            let start = out.len();
            match self
                .complete_present_value(context, value, bare_type, selections, path, out)
                .await
            {
                Err(InvalidValue) if !non_null => {
                    out.truncate(start);
                    out.extend_from_slice(NULL);
                    Ok(())
                }
                result => result,
            }
        }
        .boxed()
    }

    async fn complete_present_value(
        &self,
        context: &Context,
        value: ResolvedValue,
        bare_type: &FieldType,
        selections: &[&Selection],
        path: &PathSegment<'_>,
        out: &mut Vec<u8>,
    ) -> Result<(), InvalidValue> {
        match (bare_type, value) {
            (bare_type, ResolvedValue::Object(resolver)) if bare_type.is_composite() => {
                self.execute_selections(
                    context,
                    selections.to_vec(),
                    &resolver,
                    Some(path),
                    false,
                    out,
                )
                .await
            }
            (FieldType::List(item_type), ResolvedValue::List(items)) => {
                self.complete_list(context, items, item_type, selections, path, out)
                    .await
            }
            (FieldType::Scalar(type_name), ResolvedValue::Scalar(scalar)) => {
                let start = out.len();
                match scalar.write_json(out) {
                    Ok(()) => Ok(()),
                    Err(error) => {
                        let error = ExecutionError::Encoding {
                            type_name: type_name.clone(),
                            reason: error.to_string(),
                        };
                        self.fail(error, path, true, out, start)
                    }
                }
            }
            (FieldType::Enum(_), ResolvedValue::Enum(name)) => {
                write_string(out, &name);
                Ok(())
            }
            (bare_type, value) => {
                let error = ExecutionError::UnexpectedValue {
                    expected: bare_type.to_string(),
                    actual: value.kind(),
                };
                self.fail(error, path, true, out, 0)
            }
        }
    }

    /// Writes a JSON array, in element order whether or not elements run concurrently.
    async fn complete_list(
        &self,
        context: &Context,
        items: Vec<ResolvedValue>,
        item_type: &FieldType,
        selections: &[&Selection],
        path: &PathSegment<'_>,
        out: &mut Vec<u8>,
    ) -> Result<(), InvalidValue> {
        let mut valid = true;
        out.push(b'[');

        if Selection::has_async_descendant(selections.iter().copied()) {
            let outputs = join_all(items.into_iter().enumerate().map(|(index, item)| {
                self.complete_list_item(context, item, item_type, selections, path, index)
            }))
            .await;
            for (index, (result, output)) in outputs.into_iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(&output);
                valid &= result.is_ok();
            }
        } else {
            for (index, item) in items.into_iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                let path = PathSegment::index(path, index);
                valid &= self
                    .complete_value(context, item, item_type, selections, &path, out)
                    .await
                    .is_ok();
            }
        }

        out.push(b']');
        if valid { Ok(()) } else { Err(InvalidValue) }
    }

    /// Completes one element of a concurrent list into its own buffer.
    async fn complete_list_item(
        &self,
        context: &Context,
        item: ResolvedValue,
        item_type: &FieldType,
        selections: &[&Selection],
        parent: &PathSegment<'_>,
        index: usize,
    ) -> (Result<(), InvalidValue>, Vec<u8>) {
        let path = PathSegment::index(parent, index);
        let mut output = Vec::new();
        let result = AssertUnwindSafe(self.complete_value(
            context,
            item,
            item_type,
            selections,
            &path,
            &mut output,
        ))
        .catch_unwind()
        .await;
        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                let error = self.panicked(context, payload);
                self.fail(error, &path, item_type.is_non_null(), &mut output, 0)
            }
        };
        (result, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_escaped() {
        let mut out = Vec::new();
        write_key(&mut out, "a\"b");
        assert_eq!(out, br#""a\"b":"#);
    }
}

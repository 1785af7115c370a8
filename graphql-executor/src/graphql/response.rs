use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::graphql::Error;

/// A GraphQL response.
///
/// `data` is kept as the raw bytes produced by execution, it is never re-parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Response {
    /// The serialized data object, absent when execution was aborted as a whole.
    pub data: Option<Bytes>,

    /// The errors collected while executing, in no particular order.
    pub errors: Vec<Error>,
}

impl Response {
    pub(crate) fn new(data: Option<Bytes>, errors: Vec<Error>) -> Self {
        Self { data, errors }
    }

    /// Serializes the response as `{"data":...,"errors":[...]}`.
    ///
    /// `data` is omitted when absent and `errors` when empty.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        let mut out = BytesMut::new().writer();
        {
            let buffer = out.get_mut();
            buffer.put_u8(b'{');
            if let Some(data) = &self.data {
                buffer.put_slice(b"\"data\":");
                buffer.put_slice(data);
            }
            if !self.errors.is_empty() {
                if self.data.is_some() {
                    buffer.put_u8(b',');
                }
                buffer.put_slice(b"\"errors\":");
            }
        }
        if !self.errors.is_empty() {
            serde_json::to_writer(&mut out, &self.errors)?;
        }
        let mut buffer = out.into_inner();
        buffer.put_u8(b'}');
        Ok(buffer.freeze())
    }
}

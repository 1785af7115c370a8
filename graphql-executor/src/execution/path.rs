//! Location of the value being completed, as a chain of borrowed segments.
//!
//! Each segment lives in the frame that completes its value and only points at its parent, so
//! extending the path never allocates. It is turned into a [`Path`] when an error is built.

use crate::json_ext::Path;
use crate::json_ext::PathElement;

#[derive(Clone, Copy, Debug)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PathSegment<'a> {
    parent: Option<&'a PathSegment<'a>>,
    segment: Segment<'a>,
}

impl<'a> PathSegment<'a> {
    pub(crate) fn key(parent: Option<&'a PathSegment<'a>>, key: &'a str) -> Self {
        Self {
            parent,
            segment: Segment::Key(key),
        }
    }

    pub(crate) fn index(parent: &'a PathSegment<'a>, index: usize) -> Self {
        Self {
            parent: Some(parent),
            segment: Segment::Index(index),
        }
    }

    pub(crate) fn to_path(&self) -> Path {
        let mut elements = Vec::new();
        let mut current = Some(self);
        while let Some(segment) = current {
            elements.push(match segment.segment {
                Segment::Key(key) => PathElement::Key(key.to_owned()),
                Segment::Index(index) => PathElement::Index(index),
            });
            current = segment.parent;
        }
        elements.reverse();
        Path(elements)
    }
}

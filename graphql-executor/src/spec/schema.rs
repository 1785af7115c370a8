use std::fmt;

use crate::resolver::ResolverHandle;

/// The executable schema: the root resolver every operation starts from.
///
/// Query, mutation and subscription root fields are all methods of this resolver.
#[derive(Clone)]
pub struct Schema {
    pub(crate) resolver: ResolverHandle,
}

impl Schema {
    pub fn new(resolver: ResolverHandle) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ResolverHandle {
        &self.resolver
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").finish_non_exhaustive()
    }
}

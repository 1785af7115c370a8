//! Execution core for GraphQL operations.
//!
//! Walks the selection tree of an already validated [`Operation`], calls [`Resolver`] methods and
//! serializes their results straight into JSON bytes, collecting located errors on the way.
//!
//! ```ignore
//! let executor = Executor::builder().schema(Schema::new(root)).build()?;
//! let response = executor.execute(&Context::new(), &operation).await;
//! ```

#![warn(unreachable_pub)]

pub mod json_ext;

mod configuration;
mod context;
pub mod error;
mod execution;
mod executor;
pub mod graphql;
pub mod resolver;
pub mod spec;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_harness;

pub use configuration::Configuration;
pub use context::Context;
pub use executor::Executor;
pub use resolver::FieldCall;
pub use resolver::ResolvedValue;
pub use resolver::Resolver;
pub use resolver::ResolverHandle;
pub use spec::Operation;
pub use spec::Schema;

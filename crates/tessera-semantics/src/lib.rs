//! Tessera Semantics - multi-axis consistency configuration
//!
//! A [`Semantics`] value describes six independent axes that govern how
//! operations are batched, made durable and observed:
//!
//! | Axis | Values |
//! |------|--------|
//! | Atomicity | none, operation, batch |
//! | Concurrency | none, non-overlapping, overlapping |
//! | Consistency | none, eventual, immediate |
//! | Persistency | none, eventual, immediate |
//! | Safety | none, network, storage |
//! | Security | none, strict |
//!
//! Values are configured through a [`SemanticsBuilder`] and frozen by
//! [`SemanticsBuilder::build`]. A built value has no setters, so sharing it
//! (usually as `Arc<Semantics>`) can never expose a half-configured state.
//!
//! ```
//! use tessera_semantics::{Atomicity, Semantics, Template};
//!
//! let semantics = Semantics::builder(Template::Posix)
//!     .with(Atomicity::Batch)
//!     .build();
//! assert_eq!(semantics.atomicity(), Atomicity::Batch);
//!
//! let parsed = tessera_semantics::parse("posix", Some("atomicity=batch"));
//! assert_eq!(parsed, semantics);
//! ```

pub mod axis;
pub mod error;
pub mod parse;
pub mod semantics;
pub mod template;

pub use axis::{
    Atomicity, Axis, AxisValue, Concurrency, Consistency, Persistency, Safety, Security,
};
pub use error::SemanticsError;
pub use parse::parse;
pub use semantics::{Semantics, SemanticsBuilder};
pub use template::Template;

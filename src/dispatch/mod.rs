//! Operator overloading by inferred operand type.
//!
//! Operators applied to graph references are resolved here to a concrete
//! overload. The tracer then wraps the selected implementation in an ordinary
//! component, so operators run exactly like user-declared steps.

mod builtins;
pub mod operator;
pub mod registry;

pub use operator::Operator;
pub use registry::{DispatchRegistry, OperatorFn, Overload, Signature};

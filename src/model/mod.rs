//! Model tracing: variable schema, expression columns and decoded solutions.

mod codec;
mod column;
mod solution;
mod tracer;
mod variables;

pub use codec::SchemaRegistry;
pub use column::{Column, Constraint, Operand, Var};
pub use solution::{DecodedVar, Solution};
pub use tracer::{
    model_fn, ChromosomeView, Evaluation, HeurModel, Mode, ModelTracer, Schema, TraceContext,
};
pub use variables::{Bound, Shape, VarHandle, VarKind, VariableSpec};

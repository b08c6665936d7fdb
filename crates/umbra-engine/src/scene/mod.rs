//! Scene authoring and compilation.
//!
//! Responsibilities:
//! - hold authoring data for shapes (`ShapeDescriptor`) in a parent/child graph
//! - flatten that graph into the positional record stream the raymarch kernel reads
//! - provide deterministic group ordering (operation precedence + discovery order)

mod compiler;
mod descriptor;
mod graph;
mod key;
mod record;

pub use compiler::SceneCompiler;
pub use descriptor::{Operation, Rgb, ShapeDescriptor, ShapeKind};
pub use graph::{SceneGraph, SceneGraphReader, ShapeId};
pub use key::GroupKey;
pub use record::{BLEND_AMPLIFICATION, SHAPE_RECORD_STRIDE, ShapeRecord};

pub mod builder;
pub mod config;
pub mod err;
pub mod node;
pub mod scope;
pub mod trace;

mod handlers;

pub use builder::{IrBuilder, TranslateResult};
pub use config::{BuilderConfig, DEFAULT_MAX_DEPTH};
pub use err::{DepthLimitError, ExportError, MalformedTreeError, UnsupportedShapeError};
pub use node::{FunctionNode, GenericNode, IrValue, NodeId, next_node_id};
pub use scope::{DEFAULT_SEPARATOR, ScopeGuard, ScopeTracker};
pub use trace::{LogTrace, NoTrace, TraceSink};

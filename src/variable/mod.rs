pub mod references;
pub mod scope;
pub mod types;

pub use references::ReferenceScanner;
pub use scope::{BindingSource, ScopeRegistry, VariableBinding, merge_bindings};
pub use types::{
    FileVariable, PromptVariable, ReferenceKind, ReferencePart, ReferenceSource, RequestSetting,
    VariableReference, VariableScope,
};

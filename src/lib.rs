pub mod ast;
pub mod config;
pub mod error;
pub mod logger;
pub mod parser;
pub mod printer;
pub mod variable;

// Re-export commonly used types
pub use ast::{HttpRequestAst, Request};
pub use error::{HttpAstError, Result};
pub use parser::{HttpFileParser, ParseOptions, ParseOutput, parse_content, parse_file};

pub mod assembler;
pub mod types;

pub use assembler::AstAssembler;
pub use types::{
    AstNode, BodyContent, BodyStatus, DocumentVariables, ExpectedResponse, FormPart, FormValue,
    Header, HttpRequestAst, ParsedBody, QueryParam, Request, ResponseBody, TextRange, find_header,
};

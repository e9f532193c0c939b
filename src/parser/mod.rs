pub mod body;
pub mod classifier;
pub mod curl;
pub mod directive;
pub mod headers;
pub mod http_file;
pub mod lines;
pub mod multipart;
pub mod query;
pub mod request_line;
pub mod segment;
pub mod segmenter;
pub mod types;

// Re-export commonly used types
pub use body::{BodyMode, BodyParser};
pub use classifier::SegmentClassifier;
pub use curl::{CurlCommand, CurlParser};
pub use headers::{HeaderParseResult, HeaderParser};
pub use http_file::HttpFileParser;
pub use query::{QueryParseResult, QueryParser};
pub use segment::{ParseContext, SegmentParser};
pub use types::{
    ClassifiedSegment, Diagnostic, LineContext, LineEnding, MessageType, ParseError,
    ParseMetadata, ParseOptions, ParseOutput, ParseResult, Segment, SegmentType, Severity,
    SourceDescriptor,
};

/// 从文件路径解析 HTTP 文件
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> ParseResult<ParseOutput> {
    HttpFileParser::parse_file(path, &ParseOptions::default())
}

/// 从字符串内容解析 HTTP 请求
pub fn parse_content(content: &str) -> ParseOutput {
    HttpFileParser::parse_content(content)
}

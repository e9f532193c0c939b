use crate::ast::HttpRequestAst;
use serde::Serialize;
use std::path::PathBuf;

/// 行结束符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

/// 带偏移信息的单行文本
///
/// 偏移量为 UTF-8 字节偏移，满足 `&source[start_offset..end_offset] == text`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineContext {
    /// 行号（从 1 开始）
    pub line_number: usize,

    /// 起始偏移（包含）
    pub start_offset: usize,

    /// 结束偏移（不包含，不含换行符）
    pub end_offset: usize,

    /// 行内容（不含换行符）
    pub text: String,

    /// 原始换行符，最后一行为 None
    pub line_ending: Option<LineEnding>,
}

impl LineContext {
    /// 是否为空白行
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 由分隔符切分出的文档片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub segment_id: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<LineContext>,
}

/// 片段消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
}

/// 片段子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Http,
    Curl,
    Graphql,
}

/// 分类后的片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedSegment {
    #[serde(flatten)]
    pub segment: Segment,

    pub message_type: MessageType,

    pub segment_type: SegmentType,

    /// 第一条有效内容行（跳过空行、注释和指令），即请求行/响应行
    pub first_non_empty_line: Option<LineContext>,

    /// 有效内容行在 `segment.lines` 中的下标
    #[serde(skip)]
    pub anchor_index: Option<usize>,
}

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// 解析过程中产生的诊断信息，不会中断整个解析
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line_number: Option<usize>,
    pub segment_id: Option<usize>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, line_number: Option<usize>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            line_number,
            segment_id: None,
        }
    }

    pub fn warning(message: impl Into<String>, line_number: Option<usize>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            line_number,
            segment_id: None,
        }
    }

    pub fn in_segment(mut self, segment_id: usize) -> Self {
        self.segment_id = Some(segment_id);
        self
    }
}

/// 解析选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// 严格模式：孤立响应、重复响应会产生警告诊断
    pub strict: bool,

    /// 额外允许的自定义 HTTP 方法
    pub extra_methods: Vec<String>,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_extra_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_methods
            .extend(methods.into_iter().map(|m| m.into().to_uppercase()));
        self
    }
}

/// 输入来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SourceDescriptor {
    /// 内存中的字符串
    Inline,
    /// 由字节流解码而来
    Bytes,
    /// 文件
    File { path: PathBuf },
}

/// 解析元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    /// 输入长度（字节）
    pub length: usize,
    pub line_count: usize,
    pub encoding: &'static str,
    pub source: SourceDescriptor,
}

/// 一次完整解析的输出
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutput {
    pub ast: HttpRequestAst,
    pub metadata: ParseMetadata,
    pub lines: Vec<LineContext>,
    pub segments: Vec<ClassifiedSegment>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    /// 是否包含错误级别的诊断
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// 解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 格式错误
    #[error("Invalid format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// 无效的 HTTP 方法
    #[error("Invalid HTTP method '{method}' at line {line}")]
    InvalidMethod { method: String, line: usize },

    /// JSON 请求体无法解析
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// multipart 缺少 boundary
    #[error("Missing multipart boundary in Content-Type")]
    MissingBoundary,

    /// 输入不是合法的 UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// 错误对应的行号（如果有）
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::InvalidFormat { line, .. } | ParseError::InvalidMethod { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_as_str() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
        assert_eq!(LineEnding::Cr.as_str(), "\r");
    }

    #[test]
    fn test_parse_options_extra_methods() {
        let options = ParseOptions::strict().with_extra_methods(["propfind", "LIST"]);
        assert!(options.strict);
        assert_eq!(options.extra_methods, vec!["PROPFIND", "LIST"]);
    }

    #[test]
    fn test_parse_error_line() {
        let err = ParseError::InvalidMethod {
            method: "FETCH".to_string(),
            line: 3,
        };
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.to_string(), "Invalid HTTP method 'FETCH' at line 3");
        assert_eq!(ParseError::MissingBoundary.line(), None);
    }

    #[test]
    fn test_diagnostic_in_segment() {
        let diag = Diagnostic::warning("orphan", Some(4)).in_segment(2);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.segment_id, Some(2));
        assert_eq!(diag.line_number, Some(4));
    }
}

use crate::ast::AstAssembler;
use crate::parser::classifier::SegmentClassifier;
use crate::parser::lines::scan_lines;
use crate::parser::segment::{ParseContext, SegmentParser};
use crate::parser::segmenter::{first_delimiter_line, segment_lines};
use crate::parser::types::{
    ParseMetadata, ParseOptions, ParseOutput, ParseResult, SourceDescriptor,
};
use crate::variable::scope::ScopeRegistry;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// HTTP 文件解析器
pub struct HttpFileParser;

impl HttpFileParser {
    /// 从文件路径解析
    pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> ParseResult<ParseOutput> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let content = Self::decode(&bytes)?;
        Ok(Self::run(
            content,
            options,
            SourceDescriptor::File {
                path: path.to_path_buf(),
            },
        ))
    }

    /// 从字节流解析：去除 UTF-8 BOM 并校验编码
    pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> ParseResult<ParseOutput> {
        let content = Self::decode(bytes)?;
        Ok(Self::run(content, options, SourceDescriptor::Bytes))
    }

    /// 从字符串内容解析，使用默认选项
    pub fn parse_content(content: &str) -> ParseOutput {
        Self::parse_with_options(content, &ParseOptions::default())
    }

    /// 从字符串内容解析
    ///
    /// 结构错误不会中断解析，而是记录在 `diagnostics` 中。
    pub fn parse_with_options(content: &str, options: &ParseOptions) -> ParseOutput {
        Self::run(content, options, SourceDescriptor::Inline)
    }

    fn decode(bytes: &[u8]) -> ParseResult<&str> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        Ok(std::str::from_utf8(bytes)?)
    }

    fn run(content: &str, options: &ParseOptions, source: SourceDescriptor) -> ParseOutput {
        let lines = scan_lines(content);
        tracing::debug!("Scanned {} lines ({} bytes)", lines.len(), content.len());

        let segments = SegmentClassifier::classify_all(segment_lines(&lines));
        tracing::debug!("Found {} segments", segments.len());

        let registry = ScopeRegistry::new(first_delimiter_line(&lines), segments.len());
        let mut ctx = ParseContext::new(options.clone(), registry);

        let nodes: Vec<_> = segments
            .iter()
            .filter_map(|segment| SegmentParser::parse(segment, &mut ctx))
            .collect();

        let ast = AstAssembler::assemble(nodes, &mut ctx);
        tracing::debug!(
            "Assembled {} requests, {} variables, {} diagnostics",
            ast.requests.len(),
            ast.variables.global.len(),
            ctx.diagnostics.len()
        );

        ParseOutput {
            ast,
            metadata: ParseMetadata {
                length: content.len(),
                line_count: lines.len(),
                encoding: "utf-8",
                source,
            },
            lines,
            segments,
            diagnostics: ctx.diagnostics,
        }
    }
}

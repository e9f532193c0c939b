use crate::ast::{
    AstNode, ExpectedResponse, QueryParam, Request, ResponseBody, TextRange, find_header,
};
use crate::parser::body::{BodyMode, BodyParser, is_json_content_type};
use crate::parser::curl::CurlParser;
use crate::parser::directive::{Directive, LineKind, scan_line};
use crate::parser::headers::HeaderParser;
use crate::parser::query::QueryParser;
use crate::parser::request_line::{parse_request_line, parse_response_line};
use crate::parser::types::{
    ClassifiedSegment, Diagnostic, LineContext, MessageType, ParseError, ParseOptions,
    SegmentType,
};
use crate::variable::references::ReferenceScanner;
use crate::variable::scope::ScopeRegistry;
use crate::variable::types::{PromptVariable, RequestSetting};

/// 单次解析的上下文：选项、变量登记表和诊断信息
#[derive(Debug, Default)]
pub struct ParseContext {
    pub options: ParseOptions,
    pub registry: ScopeRegistry,
    pub diagnostics: Vec<Diagnostic>,
    /// 因结构错误被丢弃的请求片段
    pub dropped_requests: Vec<usize>,
}

impl ParseContext {
    pub fn new(options: ParseOptions, registry: ScopeRegistry) -> Self {
        Self {
            options,
            registry,
            diagnostics: Vec::new(),
            dropped_requests: Vec::new(),
        }
    }

    /// 记录结构错误，对应片段不会产生节点
    fn structural_error(&mut self, error: &ParseError, segment_id: usize) {
        tracing::warn!("Segment {}: {}", segment_id, error);
        self.diagnostics
            .push(Diagnostic::error(error.to_string(), error.line()).in_segment(segment_id));
    }

    /// 严格模式下记录警告
    pub fn strict_warning(
        &mut self,
        message: impl Into<String>,
        line_number: Option<usize>,
        segment_id: usize,
    ) {
        let message = message.into();
        tracing::debug!("Segment {}: {}", segment_id, message);
        if self.options.strict {
            self.diagnostics
                .push(Diagnostic::warning(message, line_number).in_segment(segment_id));
        }
    }
}

/// 请求行/响应行之前的定义与注释
#[derive(Debug, Default)]
struct Preamble {
    name: Option<String>,
    prompts: Vec<PromptVariable>,
    settings: Vec<RequestSetting>,
    comments: Vec<String>,
}

/// 片段解析器：把一个分类后的片段解析为请求或预期响应节点
pub struct SegmentParser;

impl SegmentParser {
    /// 解析单个片段
    ///
    /// 没有请求行/响应行的片段（只有注释或变量定义）不产生节点，
    /// 其中的变量定义仍会登记到上下文。
    pub fn parse(segment: &ClassifiedSegment, ctx: &mut ParseContext) -> Option<AstNode> {
        let lines = &segment.segment.lines;
        let segment_id = segment.segment.segment_id;
        let anchor_index = segment.anchor_index;

        let preamble_end = anchor_index.unwrap_or(lines.len());
        let preamble = Self::scan_preamble(&lines[..preamble_end], segment_id, ctx);

        let index = anchor_index?;
        let anchor = &lines[index];
        let rest: Vec<&str> = lines[index + 1..].iter().map(|l| l.text.as_str()).collect();
        let raw_text_range = TextRange {
            start_line: segment.segment.start_line,
            end_line: segment.segment.end_line,
        };

        match segment.message_type {
            MessageType::Request => {
                let mut request = Request::new(segment_id, raw_text_range);
                request.name = preamble.name;
                request.prompt_variables = preamble.prompts;
                request.settings = preamble.settings;
                request.comments = preamble.comments;
                request.variable_references = ReferenceScanner::scan_lines(lines);

                let parsed = match segment.segment_type {
                    SegmentType::Curl => Self::parse_curl(&mut request, anchor, &rest),
                    SegmentType::Http => {
                        Self::parse_http(&mut request, anchor, &rest, BodyMode::Standard, ctx)
                    }
                    SegmentType::Graphql => {
                        Self::parse_http(&mut request, anchor, &rest, BodyMode::Graphql, ctx)
                    }
                };

                match parsed {
                    Ok(()) => {
                        tracing::debug!(
                            "Segment {}: {} {}",
                            segment_id,
                            request.method_or_default(),
                            request.url
                        );
                        Some(AstNode::Request(request))
                    }
                    Err(e) => {
                        ctx.structural_error(&e, segment_id);
                        ctx.dropped_requests.push(segment_id);
                        None
                    }
                }
            }
            MessageType::Response => {
                let response = Self::parse_response(anchor, &rest, segment_id, raw_text_range, ctx);
                Some(AstNode::Response(ExpectedResponse {
                    variable_references: ReferenceScanner::scan_lines(lines),
                    ..response
                }))
            }
        }
    }

    /// 扫描前导行：变量定义登记到作用域，其余收集为名称、提示变量、设置和注释
    fn scan_preamble(lines: &[LineContext], segment_id: usize, ctx: &mut ParseContext) -> Preamble {
        let mut preamble = Preamble::default();

        for line in lines {
            match scan_line(&line.text) {
                LineKind::Variable { key, value } => {
                    ctx.registry.define(key, value, line.line_number, segment_id);
                }
                LineKind::Directive(Directive::Name(name)) => {
                    // 只取第一个
                    if preamble.name.is_none() {
                        preamble.name = Some(name);
                    }
                }
                LineKind::Directive(Directive::Prompt { name, description }) => {
                    preamble.prompts.push(PromptVariable {
                        name,
                        description,
                        line_number: line.line_number,
                    });
                }
                LineKind::Directive(Directive::Setting { name, value }) => {
                    preamble.settings.push(RequestSetting {
                        name,
                        value,
                        line_number: line.line_number,
                    });
                }
                LineKind::Comment(comment) => preamble.comments.push(comment),
                LineKind::Blank | LineKind::Content => {}
            }
        }

        preamble
    }

    fn parse_http(
        request: &mut Request,
        anchor: &LineContext,
        rest: &[&str],
        mode: BodyMode,
        ctx: &mut ParseContext,
    ) -> Result<(), ParseError> {
        let request_line =
            parse_request_line(&anchor.text, anchor.line_number, &ctx.options.extra_methods)?;

        // 多行查询参数
        let query = QueryParser::parse(rest);
        let mut url = request_line.url;
        let mut query_params: Vec<QueryParam> = QueryParser::parse_inline(&url);
        for line in &rest[..query.consumed_lines_count] {
            url.push_str(line.trim());
        }
        query_params.extend(query.params);

        // Headers
        let mut index = query.consumed_lines_count;
        let headers = HeaderParser::parse(&rest[index..]);
        index += headers.consumed_lines_count;

        if rest.get(index).is_some_and(|line| !line.trim().is_empty()) {
            ctx.strict_warning(
                format!("Header section ended at non-header line: {}", rest[index].trim()),
                Some(anchor.line_number + 1 + index),
                request.segment_id,
            );
        }

        // 跳过 headers 和 body 之间的空行
        if rest.get(index).is_some_and(|line| line.trim().is_empty()) {
            index += 1;
        }

        request.method = request_line.method;
        request.url = url;
        request.http_version = request_line.http_version;
        request.query_params = query_params;
        request.headers = headers.headers;
        request.comments.extend(headers.comments);

        let body_lines = &rest[index..];
        if body_lines.iter().any(|line| !line.trim().is_empty()) {
            let body = BodyParser::parse(body_lines, request.header("Content-Type"), mode);
            if let Some(error) = &body.error {
                ctx.strict_warning(error.clone(), Some(anchor.line_number + 1 + index), request.segment_id);
            }
            request.body = Some(body);
        }

        Ok(())
    }

    fn parse_curl(
        request: &mut Request,
        anchor: &LineContext,
        rest: &[&str],
    ) -> Result<(), ParseError> {
        let command_lines: Vec<&str> = std::iter::once(anchor.text.as_str())
            .chain(rest.iter().copied())
            .collect();
        let command = CurlParser::parse(&command_lines, anchor.line_number)?;

        request.query_params = QueryParser::parse_inline(&command.url);
        request.method = Some(command.method);
        request.url = command.url;
        request.headers = command.headers;

        if let Some(data) = command.body {
            let body_lines: Vec<&str> = data.lines().collect();
            request.body = Some(BodyParser::parse(
                &body_lines,
                request.header("Content-Type"),
                BodyMode::Standard,
            ));
        }

        Ok(())
    }

    fn parse_response(
        anchor: &LineContext,
        rest: &[&str],
        segment_id: usize,
        raw_text_range: TextRange,
        ctx: &mut ParseContext,
    ) -> ExpectedResponse {
        let response_line = parse_response_line(&anchor.text);
        if response_line.status_code.is_none() {
            ctx.strict_warning(
                "Response line has no status code",
                Some(anchor.line_number),
                segment_id,
            );
        }

        let headers = HeaderParser::parse(rest);
        let mut index = headers.consumed_lines_count;
        if rest.get(index).is_some_and(|line| line.trim().is_empty()) {
            index += 1;
        }

        let body_lines = &rest[index..];
        let end = body_lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |i| i + 1);
        let raw = body_lines[..end].join("\n");

        let body = (!raw.is_empty()).then(|| {
            let is_json = find_header(&headers.headers, "Content-Type").is_some_and(is_json_content_type);
            match serde_json::from_str(&raw) {
                Ok(value) if is_json => ResponseBody::Json(value),
                _ => ResponseBody::Text(raw),
            }
        });

        ExpectedResponse {
            segment_id,
            status_code: response_line.status_code.unwrap_or(0),
            status_text: response_line.status_text,
            http_version: response_line.http_version,
            headers: headers.headers,
            body,
            variable_references: Vec::new(),
            raw_text_range,
        }
    }
}

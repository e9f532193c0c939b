use crate::parser::types::{ParseError, ParseResult};

/// 内置支持的 HTTP 方法
pub const KNOWN_METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE", "CONNECT",
];

/// 解析后的请求行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// 只有 URL 时为 None，由调用方决定默认值
    pub method: Option<String>,
    pub url: String,
    pub http_version: Option<String>,
}

/// 解析后的响应行
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseLine {
    pub http_version: Option<String>,
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
}

fn is_http_version(token: &str) -> bool {
    token
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http/"))
}

fn is_known_method(method: &str, extra_methods: &[String]) -> bool {
    KNOWN_METHODS.contains(&method) || extra_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
}

/// 解析请求行
///
/// 支持的格式（按优先级）：
/// - `METHOD URL HTTP/x`
/// - `METHOD URL`
/// - `URL HTTP/x`
/// - `URL`
pub fn parse_request_line(
    line: &str,
    line_number: usize,
    extra_methods: &[String],
) -> ParseResult<RequestLine> {
    let mut parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Err(ParseError::InvalidFormat {
            line: line_number,
            message: "Empty request line".to_string(),
        });
    }

    let http_version = if parts.len() > 1 && parts.last().is_some_and(|v| is_http_version(v)) {
        parts.pop().map(str::to_string)
    } else {
        None
    };

    let first = parts[0];
    let method = if parts.len() > 1 && first.chars().all(|c| c.is_ascii_alphabetic()) {
        let method = first.to_uppercase();
        if !is_known_method(&method, extra_methods) {
            return Err(ParseError::InvalidMethod {
                method: first.to_string(),
                line: line_number,
            });
        }
        Some(method)
    } else {
        None
    };

    let url_parts = if method.is_some() { &parts[1..] } else { &parts[..] };
    let url = url_parts.join(" ");

    Ok(RequestLine {
        method,
        url,
        http_version,
    })
}

/// 解析响应行，各部分都可以缺失
///
/// 例如 `HTTP/1.1 200 OK`、`HTTP/2 204`、`200`、`Created`
pub fn parse_response_line(line: &str) -> ResponseLine {
    let mut parts = line.split_whitespace().peekable();
    let mut response = ResponseLine::default();

    if let Some(token) = parts.next_if(|t| is_http_version(t)) {
        response.http_version = Some(token.to_string());
    }

    if let Some(token) = parts.next_if(|t| t.parse::<u16>().is_ok()) {
        response.status_code = token.parse().ok();
    }

    let status_text = parts.collect::<Vec<_>>().join(" ");
    if !status_text.is_empty() {
        response.status_text = Some(status_text);
    }

    response
}

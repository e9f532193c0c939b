use crate::ast::Header;
use crate::parser::headers::HeaderParser;
use crate::parser::types::{ParseError, ParseResult};

/// 解析后的 curl 命令
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurlCommand {
    pub method: String,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: Option<String>,
    /// 合并续行时消耗的行数
    pub consumed_lines_count: usize,
}

/// 接受一个参数值的其他选项，解析时跳过其参数
const VALUE_FLAGS: [&str; 22] = [
    "-u", "--user", "-o", "--output", "-m", "--max-time", "--connect-timeout", "-x", "--proxy",
    "-F", "--form", "--cert", "--key", "--cacert", "-w", "--write-out", "-T", "--upload-file",
    "-c", "--cookie-jar", "--resolve", "--retry",
];

/// 接受参数值、但不影响请求的短选项
const SHORT_VALUE_FLAGS: [char; 8] = ['u', 'o', 'm', 'x', 'F', 'w', 'T', 'c'];

/// 将以 `\` 结尾的续行合并为一行
pub fn merge_continuations(lines: &[&str]) -> (String, usize) {
    let mut parts = Vec::new();
    let mut consumed = 0;

    for line in lines {
        consumed += 1;
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(rest) => parts.push(rest.trim().to_string()),
            None => {
                parts.push(trimmed.trim().to_string());
                break;
            }
        }
    }

    let merged = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (merged, consumed)
}

/// 按 shell 规则切分参数（支持单双引号和反斜杠转义）
pub fn tokenize(command: &str, line_number: usize) -> ParseResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_single_quote => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                in_token = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                in_token = true;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_single_quote || in_double_quote {
        return Err(ParseError::InvalidFormat {
            line: line_number,
            message: "Unterminated quote in curl command".to_string(),
        });
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

/// curl 命令解析器
pub struct CurlParser;

impl CurlParser {
    /// 解析从 curl 命令行开始的若干行
    pub fn parse(lines: &[&str], line_number: usize) -> ParseResult<CurlCommand> {
        let (merged, consumed_lines_count) = merge_continuations(lines);
        let tokens = tokenize(&merged, line_number)?;

        let mut args = tokens.into_iter().peekable();
        // 跳过开头的 curl
        args.next_if(|t| t.eq_ignore_ascii_case("curl"));

        let mut method: Option<String> = None;
        let mut url: Option<String> = None;
        let mut headers = Vec::new();
        let mut body: Option<String> = None;
        let mut force_get = false;
        let mut head_only = false;

        while let Some(arg) = args.next() {
            // --request=PUT 这种形式
            let (flag, inline_value) = match arg.split_once('=') {
                Some((flag, value)) if arg.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };

            match flag.as_str() {
                // HTTP Method
                "-X" | "--request" => {
                    if let Some(m) = inline_value.or_else(|| args.next()) {
                        method = Some(m.to_uppercase());
                    }
                }
                // Header
                "-H" | "--header" => {
                    if let Some(header) = inline_value.or_else(|| args.next()) {
                        push_header(&mut headers, &header);
                    }
                }
                // Data (body)，最后一次出现的生效
                "-d" | "--data" | "--data-raw" | "--data-binary" | "--data-urlencode"
                | "--data-ascii" => {
                    if let Some(data) = inline_value.or_else(|| args.next()) {
                        body = Some(data);
                    }
                }
                "--url" => {
                    url = inline_value.or_else(|| args.next());
                }
                "-A" | "--user-agent" => {
                    if let Some(agent) = inline_value.or_else(|| args.next()) {
                        headers.push(Header::new("User-Agent", agent));
                    }
                }
                "-e" | "--referer" => {
                    if let Some(referer) = inline_value.or_else(|| args.next()) {
                        headers.push(Header::new("Referer", referer));
                    }
                }
                "-b" | "--cookie" => {
                    if let Some(cookie) = inline_value.or_else(|| args.next()) {
                        headers.push(Header::new("Cookie", cookie));
                    }
                }
                "-G" | "--get" => force_get = true,
                "-I" | "--head" => head_only = true,
                f if VALUE_FLAGS.contains(&f) => {
                    if inline_value.is_none() {
                        args.next();
                    }
                }
                // 短选项组合：-sSL、-XPOST、-H'Accept: */*'、-sX POST
                f if f.starts_with('-') && !f.starts_with("--") => {
                    let cluster = &f[1..];
                    for (i, c) in cluster.char_indices() {
                        let rest = &cluster[i + c.len_utf8()..];
                        match c {
                            'X' | 'H' | 'd' | 'A' | 'e' | 'b' => {
                                let value = if rest.is_empty() {
                                    args.next()
                                } else {
                                    Some(rest.to_string())
                                };
                                if let Some(value) = value {
                                    match c {
                                        'X' => method = Some(value.to_uppercase()),
                                        'H' => push_header(&mut headers, &value),
                                        'd' => body = Some(value),
                                        'A' => headers.push(Header::new("User-Agent", value)),
                                        'e' => headers.push(Header::new("Referer", value)),
                                        _ => headers.push(Header::new("Cookie", value)),
                                    }
                                }
                                break;
                            }
                            c if SHORT_VALUE_FLAGS.contains(&c) => {
                                if rest.is_empty() {
                                    args.next();
                                }
                                break;
                            }
                            'G' => force_get = true,
                            'I' => head_only = true,
                            _ => {}
                        }
                    }
                }
                // 其他未知的长选项暂时忽略
                f if f.starts_with("--") => {}
                // URL (位置参数)
                _ => {
                    if url.is_none() {
                        url = Some(arg);
                    }
                }
            }
        }

        let url = url.ok_or_else(|| ParseError::InvalidFormat {
            line: line_number,
            message: "URL is required in curl command".to_string(),
        })?;

        let method = match method {
            Some(m) => m,
            None if force_get => "GET".to_string(),
            None if head_only => "HEAD".to_string(),
            None if body.is_some() => "POST".to_string(),
            None => "GET".to_string(),
        };

        Ok(CurlCommand {
            method,
            url,
            headers,
            body,
            consumed_lines_count,
        })
    }
}

fn push_header(headers: &mut Vec<Header>, raw: &str) {
    if let Some((name, value)) = HeaderParser::parse_header(raw) {
        headers.push(Header::new(name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quotes() {
        let tokens = tokenize(r#"curl -H 'Content-Type: application/json' -d "{\"a\": 1}" ''"#, 1).unwrap();
        assert_eq!(
            tokens,
            vec!["curl", "-H", "Content-Type: application/json", "-d", r#"{"a": 1}"#, ""]
        );
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        assert!(matches!(
            tokenize("curl 'http://x", 4),
            Err(ParseError::InvalidFormat { line: 4, .. })
        ));
    }

    #[test]
    fn test_merge_continuations() {
        let (merged, consumed) = merge_continuations(&[
            "curl -X POST \\",
            "  -H 'Accept: */*' \\",
            "  https://example.com",
            "ignored",
        ]);
        assert_eq!(merged, "curl -X POST -H 'Accept: */*' https://example.com");
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_parse_simple_get() {
        let command = CurlParser::parse(&["curl https://example.com/users"], 1).unwrap();
        assert_eq!(command.method, "GET");
        assert_eq!(command.url, "https://example.com/users");
        assert!(command.headers.is_empty());
        assert_eq!(command.body, None);
    }

    #[test]
    fn test_data_defaults_to_post() {
        let command = CurlParser::parse(
            &["curl https://x/api -H 'Content-Type: application/json' -d '{\"a\":1}'"],
            1,
        )
        .unwrap();
        assert_eq!(command.method, "POST");
        assert_eq!(command.headers, vec![Header::new("Content-Type", "application/json")]);
        assert_eq!(command.body, Some(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_last_data_wins() {
        let command = CurlParser::parse(&["curl -d a=1 --data-raw b=2 http://x"], 1).unwrap();
        assert_eq!(command.body, Some("b=2".to_string()));
    }

    #[test]
    fn test_explicit_method_and_attached_forms() {
        let command = CurlParser::parse(&["curl -XPUT --header=X-A:1 -H'X-B: 2' http://x"], 1).unwrap();
        assert_eq!(command.method, "PUT");
        assert_eq!(
            command.headers,
            vec![Header::new("X-A", "1"), Header::new("X-B", "2")]
        );
    }

    #[test]
    fn test_value_flags_are_skipped() {
        let command =
            CurlParser::parse(&["curl -sSL -u admin:secret -o out.json --url http://x/y"], 1).unwrap();
        assert_eq!(command.url, "http://x/y");
        assert!(command.headers.is_empty());
    }

    #[test]
    fn test_header_shortcuts() {
        let command = CurlParser::parse(&["curl -A agent/1.0 -b 'a=1' -I http://x"], 1).unwrap();
        assert_eq!(command.method, "HEAD");
        assert_eq!(
            command.headers,
            vec![Header::new("User-Agent", "agent/1.0"), Header::new("Cookie", "a=1")]
        );
    }

    #[test]
    fn test_clustered_short_flags() {
        let command = CurlParser::parse(&["curl -sX POST http://x/api"], 1).unwrap();
        assert_eq!(command.method, "POST");
        assert_eq!(command.url, "http://x/api");

        let command = CurlParser::parse(&["curl -sH 'A: b' -sd data -sL http://x"], 1).unwrap();
        assert_eq!(command.headers, vec![Header::new("A", "b")]);
        assert_eq!(command.body, Some("data".to_string()));
        assert_eq!(command.method, "POST");
        assert_eq!(command.url, "http://x");
    }

    #[test]
    fn test_clustered_flags_with_attached_value() {
        let command = CurlParser::parse(&["curl -sXPUT -kIu admin:pw http://x"], 1).unwrap();
        assert_eq!(command.method, "PUT");
        assert_eq!(command.url, "http://x");

        let command = CurlParser::parse(&["curl -sI http://x"], 1).unwrap();
        assert_eq!(command.method, "HEAD");
    }

    #[test]
    fn test_multibyte_short_flag_does_not_panic() {
        let command = CurlParser::parse(&["curl -é -“ http://x"], 1).unwrap();
        assert_eq!(command.url, "http://x");
        assert_eq!(command.method, "GET");
    }

    #[test]
    fn test_missing_url() {
        assert!(CurlParser::parse(&["curl -X GET"], 9).is_err());
    }
}

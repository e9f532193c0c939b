use crate::ast::Header;
use crate::parser::directive::is_comment;

/// Header 解析结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderParseResult {
    pub headers: Vec<Header>,

    /// Header 之间的注释行
    pub comments: Vec<String>,

    /// 消耗的行数（不包含结束用的空行）
    pub consumed_lines_count: usize,
}

/// Header 解析器
pub struct HeaderParser;

impl HeaderParser {
    /// 解析 `Name: Value` 行，直到第一个空行或不含 `:` 的行
    pub fn parse(lines: &[&str]) -> HeaderParseResult {
        let mut result = HeaderParseResult::default();

        for line in lines {
            let trimmed = line.trim();

            // 空行表示 headers 结束，body 开始
            if trimmed.is_empty() {
                break;
            }

            if is_comment(trimmed) {
                result.comments.push(trimmed.to_string());
                result.consumed_lines_count += 1;
                continue;
            }

            let Some((name, value)) = Self::parse_header(trimmed) else {
                break;
            };
            result.headers.push(Header::new(name, value));
            result.consumed_lines_count += 1;
        }

        result
    }

    /// 解析 header 行
    pub fn parse_header(line: &str) -> Option<(&str, &str)> {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key, value.trim()))
    }
}

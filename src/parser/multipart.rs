use crate::ast::{FormPart, Header, find_header};
use crate::parser::headers::HeaderParser;

/// 从 Content-Type 中提取 boundary 参数（去除引号）
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|boundary| !boundary.is_empty())
}

/// 按 `--boundary` 切分并解析各部分，没有 name 的部分会被丢弃
pub fn parse_parts(raw: &str, boundary: &str) -> Vec<FormPart> {
    let delimiter = format!("--{}", boundary);

    raw.split(delimiter.as_str())
        .filter_map(|section| {
            // 结束标记 `--boundary--` 切分后以 `--` 开头
            if section.starts_with("--") {
                return None;
            }
            let section = section.strip_prefix('\n').unwrap_or(section);
            let section = section.strip_suffix('\n').unwrap_or(section);
            if section.trim().is_empty() {
                return None;
            }
            parse_part(section)
        })
        .collect()
}

fn parse_part(section: &str) -> Option<FormPart> {
    let lines: Vec<&str> = section.split('\n').collect();
    let parsed = HeaderParser::parse(&lines);

    let mut value_start = parsed.consumed_lines_count;
    if lines.get(value_start).is_some_and(|l| l.trim().is_empty()) {
        value_start += 1;
    }
    let value = lines.get(value_start..).unwrap_or_default().join("\n");

    let disposition = find_header(&parsed.headers, "Content-Disposition")?;
    let name = disposition_param(disposition, "name")?;
    let filename = disposition_param(disposition, "filename");
    let content_type = find_header(&parsed.headers, "Content-Type").map(str::to_string);

    let headers: Vec<Header> = parsed.headers;
    Some(FormPart {
        name,
        value,
        filename,
        content_type,
        headers: (!headers.is_empty()).then_some(headers),
    })
}

/// 读取 `form-data; name="x"; filename="y"` 中的参数
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

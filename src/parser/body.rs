use crate::ast::{BodyContent, FormValue, ParsedBody};
use crate::parser::multipart;
use crate::parser::types::ParseError;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// 请求体解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    /// 按 Content-Type 分派
    #[default]
    Standard,
    /// GraphQL 请求：query 与 variables 以空行分隔
    Graphql,
}

/// 按 Content-Type 归类后的请求体格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
    Multipart,
    Text,
}

/// 请求体解析器
pub struct BodyParser;

impl BodyParser {
    /// 解析请求体行，结尾的空行会被丢弃；不会返回错误，失败时返回错误状态的结果
    pub fn parse(lines: &[&str], content_type: Option<&str>, mode: BodyMode) -> ParsedBody {
        let end = lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |i| i + 1);
        let lines = &lines[..end];
        let raw = lines.join("\n");
        let content_type = content_type.map(str::to_string);

        if mode == BodyMode::Graphql {
            return ParsedBody::ok(Self::parse_graphql(lines), raw, content_type);
        }

        if let Some(file_ref) = Self::parse_file_ref(lines) {
            return ParsedBody::ok(file_ref, raw, content_type);
        }

        let format = content_type.as_deref().map_or(BodyFormat::Text, classify);

        if raw.is_empty() {
            let content = if format == BodyFormat::Form {
                BodyContent::Form {
                    fields: IndexMap::new(),
                }
            } else {
                BodyContent::Text {
                    text: String::new(),
                }
            };
            return ParsedBody::ok(content, raw, content_type);
        }

        match format {
            BodyFormat::Json => match serde_json::from_str(&raw) {
                Ok(data) => ParsedBody::ok(BodyContent::Json { data }, raw, content_type),
                Err(e) => {
                    let message = ParseError::InvalidJson {
                        message: e.to_string(),
                    };
                    tracing::debug!("{}", message);
                    ParsedBody::error(message.to_string(), raw, content_type)
                }
            },
            BodyFormat::Form => {
                let fields = Self::parse_form(lines);
                ParsedBody::ok(BodyContent::Form { fields }, raw, content_type)
            }
            BodyFormat::Multipart => {
                let boundary = content_type.as_deref().and_then(multipart::extract_boundary);
                match boundary {
                    Some(boundary) => {
                        let parts = multipart::parse_parts(&raw, &boundary);
                        ParsedBody::ok(BodyContent::Multipart { boundary, parts }, raw, content_type)
                    }
                    None => {
                        ParsedBody::error(ParseError::MissingBoundary.to_string(), raw, content_type)
                    }
                }
            }
            BodyFormat::Text => ParsedBody::ok(BodyContent::Text { text: raw.clone() }, raw, content_type),
        }
    }

    /// 以第一个空行分隔 query 与 variables
    fn parse_graphql(lines: &[&str]) -> BodyContent {
        let split = lines.iter().position(|line| line.trim().is_empty());
        let (query_lines, variable_lines) = match split {
            Some(i) => (&lines[..i], &lines[i + 1..]),
            None => (lines, &[][..]),
        };

        let variables = variable_lines.join("\n").trim().to_string();
        BodyContent::Graphql {
            query: query_lines.join("\n"),
            variables: (!variables.is_empty()).then_some(variables),
        }
    }

    /// 单行的 `< path`、`<@ path`、`<@encoding path`
    fn parse_file_ref(lines: &[&str]) -> Option<BodyContent> {
        static FILE_REF_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = FILE_REF_REGEX.get_or_init(|| Regex::new(r"^<(@(\S*))?\s+(\S.*)$").unwrap());

        let mut content = lines.iter().filter(|line| !line.trim().is_empty());
        let line = content.next()?.trim();
        if content.next().is_some() {
            return None;
        }

        let caps = re.captures(line)?;
        let process_variables = caps.get(1).is_some();
        let encoding = caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Some(BodyContent::FileRef {
            path: caps[3].trim().to_string(),
            encoding,
            process_variables,
        })
    }

    /// `application/x-www-form-urlencoded`：多行拼接后按 `&` 切分并解码，重复 key 累积为数组
    fn parse_form(lines: &[&str]) -> IndexMap<String, FormValue> {
        let joined: String = lines.iter().map(|line| line.trim()).collect();
        let mut fields: IndexMap<String, FormValue> = IndexMap::new();

        for (key, value) in url::form_urlencoded::parse(joined.as_bytes()) {
            let value = value.into_owned();
            match fields.get_mut(&*key) {
                Some(existing) => existing.push(value),
                None => {
                    fields.insert(key.into_owned(), FormValue::Single(value));
                }
            }
        }

        fields
    }
}

/// 是否为 JSON 类型（含 `*+json`）
pub fn is_json_content_type(content_type: &str) -> bool {
    classify(content_type) == BodyFormat::Json
}

/// 归一化 Content-Type（小写、去掉参数）后分类
fn classify(content_type: &str) -> BodyFormat {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" | "text/json" => BodyFormat::Json,
        m if m.ends_with("+json") => BodyFormat::Json,
        "application/x-www-form-urlencoded" => BodyFormat::Form,
        "multipart/form-data" => BodyFormat::Multipart,
        _ => BodyFormat::Text,
    }
}

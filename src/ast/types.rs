use crate::variable::scope::{VariableBinding, merge_bindings};
use crate::variable::types::{
    FileVariable, PromptVariable, RequestSetting, VariableReference,
};
use indexmap::IndexMap;
use serde::Serialize;

/// 单个 Header，保留原始大小写
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 按名称查找 Header（不区分大小写），返回第一个匹配的值
pub fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// 查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 原文中的行范围（包含两端）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: usize,
    pub end_line: usize,
}

/// 表单字段值：重复的 key 会累积为数组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FormValue {
    /// 追加一个值，单值会转换为数组
    pub fn push(&mut self, value: String) {
        match self {
            FormValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = FormValue::Multiple(vec![first, value]);
            }
            FormValue::Multiple(values) => values.push(value),
        }
    }
}

/// multipart 的单个部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPart {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Header>>,
}

/// 请求体内容
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BodyContent {
    Json {
        data: serde_json::Value,
    },
    Text {
        text: String,
    },
    Form {
        fields: IndexMap<String, FormValue>,
    },
    Multipart {
        boundary: String,
        parts: Vec<FormPart>,
    },
    /// `< path`、`<@ path`、`<@encoding path`
    #[serde(rename_all = "camelCase")]
    FileRef {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        encoding: Option<String>,
        process_variables: bool,
    },
    Graphql {
        query: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        variables: Option<String>,
    },
}

impl BodyContent {
    /// 种类名称，与序列化后的 `kind` 一致
    pub fn kind(&self) -> &'static str {
        match self {
            BodyContent::Json { .. } => "json",
            BodyContent::Text { .. } => "text",
            BodyContent::Form { .. } => "form",
            BodyContent::Multipart { .. } => "multipart",
            BodyContent::FileRef { .. } => "fileRef",
            BodyContent::Graphql { .. } => "graphql",
        }
    }
}

/// 请求体解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyStatus {
    Ok,
    Error,
}

/// 请求体解析结果
///
/// 解析失败时 `content` 为 None，`error` 携带错误信息，原文与大小仍然保留。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBody {
    pub status: BodyStatus,
    pub content: Option<BodyContent>,
    pub raw: String,
    pub content_type: Option<String>,
    /// 原文的 UTF-8 字节数
    pub size: usize,
    pub error: Option<String>,
}

impl ParsedBody {
    pub fn ok(content: BodyContent, raw: String, content_type: Option<String>) -> Self {
        Self {
            status: BodyStatus::Ok,
            content: Some(content),
            size: raw.len(),
            raw,
            content_type,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, raw: String, content_type: Option<String>) -> Self {
        Self {
            status: BodyStatus::Error,
            content: None,
            size: raw.len(),
            raw,
            content_type,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == BodyStatus::Ok
    }

    pub fn kind(&self) -> Option<&'static str> {
        self.content.as_ref().map(BodyContent::kind)
    }
}

/// 单个请求节点，序列化时带有 `kind: "request"`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename = "request", rename_all = "camelCase")]
pub struct Request {
    pub segment_id: usize,

    /// 请求名称（`# @name`）
    pub name: Option<String>,

    /// 只有 URL 的请求行为 None，见 [`Request::method_or_default`]
    pub method: Option<String>,

    pub url: String,

    pub http_version: Option<String>,

    pub query_params: Vec<QueryParam>,

    /// Headers 列表，保持原始顺序
    pub headers: Vec<Header>,

    pub body: Option<ParsedBody>,

    /// 片段内部定义的变量
    pub block_variables: Vec<FileVariable>,

    pub prompt_variables: Vec<PromptVariable>,

    /// 片段中出现的所有 `{{...}}` 引用
    pub variable_references: Vec<VariableReference>,

    pub settings: Vec<RequestSetting>,

    pub comments: Vec<String>,

    pub raw_text_range: TextRange,

    pub expected_response: Option<ExpectedResponse>,
}

impl Request {
    /// 创建一个新的空请求
    pub fn new(segment_id: usize, raw_text_range: TextRange) -> Self {
        Self {
            segment_id,
            name: None,
            method: None,
            url: String::new(),
            http_version: None,
            query_params: Vec::new(),
            headers: Vec::new(),
            body: None,
            block_variables: Vec::new(),
            prompt_variables: Vec::new(),
            variable_references: Vec::new(),
            settings: Vec::new(),
            comments: Vec::new(),
            raw_text_range,
            expected_response: None,
        }
    }

    /// 获取 HTTP 方法，如果未指定则返回 "GET"
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    /// 获取请求名称（如果有）
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn setting(&self, name: &str) -> Option<&RequestSetting> {
        self.settings.iter().find(|s| s.name == name)
    }
}

/// 预期响应的 body：JSON 解析结果或原文
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

/// 预期响应节点，序列化时带有 `kind: "response"`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename = "response", rename_all = "camelCase")]
pub struct ExpectedResponse {
    pub segment_id: usize,

    /// 响应行缺少状态码时为 0
    pub status_code: u16,

    pub status_text: Option<String>,

    pub http_version: Option<String>,

    pub headers: Vec<Header>,

    pub body: Option<ResponseBody>,

    pub variable_references: Vec<VariableReference>,

    pub raw_text_range: TextRange,
}

impl ExpectedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// 片段解析出的节点，种类由节点自身的 `kind` 字段标注
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AstNode {
    Request(Request),
    Response(ExpectedResponse),
}

/// 文档级变量视图
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVariables {
    /// 第一个分隔符之前定义的变量
    pub file_scoped: Vec<FileVariable>,

    /// 文档中所有的定义，按出现顺序
    pub global: Vec<FileVariable>,
}

/// 整个文档的 AST
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestAst {
    pub requests: Vec<Request>,
    pub variables: DocumentVariables,
}

impl HttpRequestAst {
    /// 按名称查找请求
    pub fn find_request(&self, name: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.name() == Some(name))
    }

    /// 某个请求可见的变量及其来源：文件作用域 < 片段作用域 < 提示变量
    pub fn variable_bindings(&self, index: usize) -> Option<IndexMap<String, VariableBinding>> {
        let request = self.requests.get(index)?;
        Some(merge_bindings(
            &self.variables.file_scoped,
            &request.block_variables,
            &request.prompt_variables,
        ))
    }
}

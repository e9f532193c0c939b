use serde::Serialize;

/// 文件变量的作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VariableScope {
    /// 定义于第一个分隔符之前
    File,

    /// 定义于某个片段内部
    #[serde(rename_all = "camelCase")]
    Block { segment_id: usize },
}

/// `@key = value` 形式定义的变量
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileVariable {
    pub key: String,
    pub value: String,
    pub line_number: usize,
    pub scope: VariableScope,
}

/// `# @prompt name [description]` 声明的变量，仅作用于当前请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariable {
    pub name: String,
    pub description: Option<String>,
    pub line_number: usize,
}

/// `# @setting [value]` 形式的请求设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSetting {
    pub name: String,
    pub value: Option<String>,
    pub line_number: usize,
}

/// 请求变量引用的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Request,
    Response,
}

/// 请求变量引用的部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePart {
    Body,
    Headers,
}

/// `{{...}}` 引用的种类
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReferenceKind {
    /// 系统变量，如 `{{$guid}}`、`{{$randomInt 1 10}}`
    System { name: String, params: Option<String> },

    /// 请求变量，如 `{{login.response.body.$.token}}`
    #[serde(rename_all = "camelCase")]
    Request {
        request_name: String,
        source: ReferenceSource,
        part: ReferencePart,
        path: String,
    },

    /// 其他自定义变量
    Custom { name: String },
}

/// 文本中的一处变量引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableReference {
    #[serde(flatten)]
    pub kind: ReferenceKind,

    /// 包含花括号的原文
    pub raw: String,

    pub line_number: usize,

    /// 在所在行中的字节偏移
    pub offset: usize,

    pub length: usize,
}

impl VariableReference {
    /// 引用的变量名（请求变量返回请求名）
    pub fn name(&self) -> &str {
        match &self.kind {
            ReferenceKind::System { name, .. } | ReferenceKind::Custom { name } => name,
            ReferenceKind::Request { request_name, .. } => request_name,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self.kind, ReferenceKind::System { .. })
    }

    pub fn is_request(&self) -> bool {
        matches!(self.kind, ReferenceKind::Request { .. })
    }
}

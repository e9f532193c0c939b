use crate::variable::types::{FileVariable, PromptVariable, VariableScope};
use indexmap::IndexMap;
use serde::Serialize;

/// 单次解析内的变量登记表
///
/// 按片段 id 索引的 arena，每次解析新建，不跨调用共享。
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    first_delimiter_line: Option<usize>,
    global: Vec<FileVariable>,
    blocks: Vec<Vec<FileVariable>>,
}

impl ScopeRegistry {
    pub fn new(first_delimiter_line: Option<usize>, segment_count: usize) -> Self {
        Self {
            first_delimiter_line,
            global: Vec::new(),
            blocks: vec![Vec::new(); segment_count],
        }
    }

    /// 第一个分隔符之前（或文档没有分隔符）的定义属于文件作用域
    pub fn scope_for(&self, line_number: usize, segment_id: usize) -> VariableScope {
        match self.first_delimiter_line {
            Some(delimiter) if line_number > delimiter => VariableScope::Block { segment_id },
            _ => VariableScope::File,
        }
    }

    /// 登记一个变量定义
    pub fn define(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        line_number: usize,
        segment_id: usize,
    ) -> FileVariable {
        let variable = FileVariable {
            key: key.into(),
            value: value.into(),
            line_number,
            scope: self.scope_for(line_number, segment_id),
        };

        if let VariableScope::Block { segment_id } = variable.scope {
            if self.blocks.len() <= segment_id {
                self.blocks.resize(segment_id + 1, Vec::new());
            }
            self.blocks[segment_id].push(variable.clone());
        }
        self.global.push(variable.clone());

        variable
    }

    /// 所有定义，按文档顺序
    pub fn global(&self) -> &[FileVariable] {
        &self.global
    }

    /// 文件作用域的定义
    pub fn file_scoped(&self) -> Vec<FileVariable> {
        self.global
            .iter()
            .filter(|v| v.scope == VariableScope::File)
            .cloned()
            .collect()
    }

    /// 某个片段内部的定义
    pub fn block(&self, segment_id: usize) -> &[FileVariable] {
        self.blocks.get(segment_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// 变量绑定的来源，优先级从低到高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    File,
    Block,
    Prompt,
}

/// 某个请求可见的变量绑定（不做求值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableBinding {
    pub source: BindingSource,

    /// 提示变量在运行时由用户输入，没有值
    pub value: Option<String>,

    pub line_number: usize,
}

/// 计算变量优先级视图：文件作用域 < 片段作用域 < 提示变量
///
/// 同一作用域内后定义的覆盖先定义的。
pub fn merge_bindings(
    file_scoped: &[FileVariable],
    block: &[FileVariable],
    prompts: &[PromptVariable],
) -> IndexMap<String, VariableBinding> {
    let mut bindings = IndexMap::new();

    for variable in file_scoped {
        bindings.insert(
            variable.key.clone(),
            VariableBinding {
                source: BindingSource::File,
                value: Some(variable.value.clone()),
                line_number: variable.line_number,
            },
        );
    }

    for variable in block {
        bindings.insert(
            variable.key.clone(),
            VariableBinding {
                source: BindingSource::Block,
                value: Some(variable.value.clone()),
                line_number: variable.line_number,
            },
        );
    }

    for prompt in prompts {
        bindings.insert(
            prompt.name.clone(),
            VariableBinding {
                source: BindingSource::Prompt,
                value: None,
                line_number: prompt.line_number,
            },
        );
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_before_first_delimiter() {
        let registry = ScopeRegistry::new(Some(3), 2);
        assert_eq!(registry.scope_for(1, 0), VariableScope::File);
        assert_eq!(registry.scope_for(4, 1), VariableScope::Block { segment_id: 1 });
    }

    #[test]
    fn test_no_delimiter_is_file_scope() {
        let registry = ScopeRegistry::new(None, 1);
        assert_eq!(registry.scope_for(10, 0), VariableScope::File);
    }

    #[test]
    fn test_define_tracks_views() {
        let mut registry = ScopeRegistry::new(Some(2), 2);
        registry.define("host", "a", 1, 0);
        registry.define("token", "t", 4, 1);
        registry.define("host", "b", 5, 1);

        assert_eq!(registry.global().len(), 3);
        assert_eq!(registry.file_scoped().len(), 1);
        assert_eq!(registry.block(1).len(), 2);
        assert!(registry.block(0).is_empty());
        assert!(registry.block(9).is_empty());
    }

    #[test]
    fn test_merge_precedence() {
        let mut registry = ScopeRegistry::new(Some(3), 2);
        registry.define("host", "file-host", 1, 0);
        registry.define("user", "file-user", 2, 0);
        registry.define("host", "block-host", 5, 1);
        let prompts = vec![PromptVariable {
            name: "user".to_string(),
            description: Some("User name".to_string()),
            line_number: 6,
        }];

        let bindings = merge_bindings(&registry.file_scoped(), registry.block(1), &prompts);
        assert_eq!(bindings["host"].source, BindingSource::Block);
        assert_eq!(bindings["host"].value.as_deref(), Some("block-host"));
        assert_eq!(bindings["user"].source, BindingSource::Prompt);
        assert_eq!(bindings["user"].value, None);

        // 提示变量不会写回文件作用域
        assert_eq!(registry.file_scoped()[1].value, "file-user");
    }

    #[test]
    fn test_merge_later_definition_wins() {
        let mut registry = ScopeRegistry::new(None, 1);
        registry.define("host", "first", 1, 0);
        registry.define("host", "second", 2, 0);
        let bindings = merge_bindings(&registry.file_scoped(), &[], &[]);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings["host"].value.as_deref(), Some("second"));
    }
}

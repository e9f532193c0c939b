use crate::error::{HttpAstError, Result};
use crate::parser::ParseOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `httpast.toml` 中的配置项
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 严格模式：孤立响应、重复响应等情况产生警告
    pub strict: bool,

    /// 额外允许的 HTTP 方法，如 PROPFIND
    pub extra_methods: Vec<String>,

    /// 输出格式化的 JSON
    pub pretty: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: false,
            extra_methods: Vec::new(),
            pretty: true,
        }
    }
}

impl ParserConfig {
    /// 转换为解析选项
    pub fn to_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.strict,
            ..ParseOptions::default()
        }
        .with_extra_methods(self.extra_methods.iter().cloned())
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "httpast.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ParserConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HttpAstError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录
    /// 2. 父目录递归查找
    /// 3. 用户配置目录 ~/.config/httpast/
    ///
    /// 找到但无法解析的文件会返回错误，都找不到时返回 None
    pub fn find_and_load() -> Result<Option<ParserConfig>> {
        let found = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_from(&dir))
            .or_else(Self::user_config_path);

        found.map(Self::load_from_path).transpose()
    }

    /// 从给定目录向上查找配置文件
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(Self::CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// 用户配置目录中的配置文件（存在时）
    fn user_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("httpast").join(Self::CONFIG_FILE);
        config_path.is_file().then_some(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_from_path() {
        let config_content = r#"
strict = true
extra_methods = ["propfind", "MKCOL"]
pretty = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert!(config.strict);
        assert!(!config.pretty);
        assert_eq!(config.extra_methods, vec!["propfind", "MKCOL"]);

        let options = config.to_options();
        assert!(options.strict);
        assert_eq!(options.extra_methods, vec!["PROPFIND", "MKCOL"]);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: ParserConfig = toml::from_str("strict = true").unwrap();
        assert!(config.strict);
        assert!(config.pretty);
        assert!(config.extra_methods.is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"strict = \"yes\"").unwrap();
        temp_file.flush().unwrap();

        let result = ConfigLoader::load_from_path(temp_file.path());
        assert!(matches!(result, Err(HttpAstError::TomlError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_from_path("/nonexistent/httpast.toml");
        assert!(matches!(result, Err(HttpAstError::ConfigError(_))));
    }

    #[test]
    fn test_find_from_parent_dir() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join("httpast.toml"), "strict = true").unwrap();

        let found = ConfigLoader::find_from(&nested).unwrap();
        assert_eq!(found, root.path().join("httpast.toml"));
    }
}

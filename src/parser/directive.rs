/// 指令（注释中的 `@xxx` 或单独的 `@xxx value`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `@name`
    Name(String),

    /// `@prompt name [description]`
    Prompt {
        name: String,
        description: Option<String>,
    },

    /// 其他 `@setting [value]`
    Setting { name: String, value: Option<String> },
}

/// 行的种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,

    /// 普通注释，保留原文（去除首尾空白）
    Comment(String),

    Directive(Directive),

    /// `@key = value`
    Variable { key: String, value: String },

    /// 请求/响应内容
    Content,
}

/// 判断一行的种类（统一入口）
pub fn scan_line(text: &str) -> LineKind {
    let line = text.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some(rest) = line.strip_prefix('@') {
        if let Some((key, value)) = rest.split_once('=') {
            let key = key.trim();
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                return LineKind::Variable {
                    key: key.to_string(),
                    value: unescape(value.trim()),
                };
            }
        }
        // 注释外的 `@` 行只接受 name 和 prompt，设置必须写在注释里
        return match parse_directive(rest) {
            Some(directive @ (Directive::Name(_) | Directive::Prompt { .. })) => {
                LineKind::Directive(directive)
            }
            _ => LineKind::Comment(line.to_string()),
        };
    }

    let comment_body = if let Some(rest) = line.strip_prefix("//") {
        Some(rest)
    } else {
        line.strip_prefix('#').map(|rest| rest.trim_start_matches('#'))
    };

    match comment_body {
        Some(body) => match body.trim_start().strip_prefix('@').and_then(parse_directive) {
            Some(directive) => LineKind::Directive(directive),
            None => LineKind::Comment(line.to_string()),
        },
        None => LineKind::Content,
    }
}

/// 是否为注释行
pub fn is_comment(text: &str) -> bool {
    let line = text.trim_start();
    line.starts_with('#') || line.starts_with("//")
}

/// 解析 `@` 之后的指令内容
fn parse_directive(content: &str) -> Option<Directive> {
    let split_at = content
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(content.len());
    let (name, rest) = content.split_at(split_at);
    if name.is_empty() {
        return None;
    }

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();

    match name {
        "name" if !rest.is_empty() => Some(Directive::Name(rest.to_string())),
        "name" => None,
        "prompt" => {
            let (prompt_name, description) = match rest.split_once(char::is_whitespace) {
                Some((n, d)) => (n, Some(d.trim().to_string())),
                None => (rest, None),
            };
            if prompt_name.is_empty() {
                return None;
            }
            Some(Directive::Prompt {
                name: prompt_name.to_string(),
                description: description.filter(|d| !d.is_empty()),
            })
        }
        _ => Some(Directive::Setting {
            name: name.to_string(),
            value: (!rest.is_empty()).then(|| rest.to_string()),
        }),
    }
}

/// 反转义 `\n`、`\r`、`\t`、`\\`，其他序列保持原样
pub fn unescape(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some('t') => output.push('\t'),
            Some('\\') => output.push('\\'),
            _ => {
                output.push('\\');
                continue;
            }
        }
        chars.next();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_content() {
        assert_eq!(scan_line("   "), LineKind::Blank);
        assert_eq!(scan_line("GET http://x"), LineKind::Content);
        assert_eq!(scan_line("Accept: */*"), LineKind::Content);
    }

    #[test]
    fn test_file_variable() {
        assert_eq!(
            scan_line("@baseUrl = http://localhost:8080 "),
            LineKind::Variable {
                key: "baseUrl".to_string(),
                value: "http://localhost:8080".to_string(),
            }
        );
        assert_eq!(
            scan_line("@query=a=b"),
            LineKind::Variable {
                key: "query".to_string(),
                value: "a=b".to_string(),
            }
        );
    }

    #[test]
    fn test_file_variable_unescape() {
        assert_eq!(
            scan_line(r"@text = line1\nline2\t\\end\q"),
            LineKind::Variable {
                key: "text".to_string(),
                value: "line1\nline2\t\\end\\q".to_string(),
            }
        );
    }

    #[test]
    fn test_key_with_space_is_not_variable() {
        assert_eq!(
            scan_line("@my key = v"),
            LineKind::Comment("@my key = v".to_string())
        );
    }

    #[test]
    fn test_bare_setting_is_comment() {
        assert_eq!(
            scan_line("@no-redirect"),
            LineKind::Comment("@no-redirect".to_string())
        );
        assert_eq!(
            scan_line("@timeout 5s"),
            LineKind::Comment("@timeout 5s".to_string())
        );
        assert_eq!(
            scan_line("@prompt otp"),
            LineKind::Directive(Directive::Prompt {
                name: "otp".to_string(),
                description: None,
            })
        );
    }

    #[test]
    fn test_name_directive() {
        assert_eq!(
            scan_line("# @name login"),
            LineKind::Directive(Directive::Name("login".to_string()))
        );
        assert_eq!(
            scan_line("// @name login"),
            LineKind::Directive(Directive::Name("login".to_string()))
        );
        assert_eq!(
            scan_line("@name My Request"),
            LineKind::Directive(Directive::Name("My Request".to_string()))
        );
        assert_eq!(
            scan_line("#@name=login"),
            LineKind::Directive(Directive::Name("login".to_string()))
        );
    }

    #[test]
    fn test_prompt_directive() {
        assert_eq!(
            scan_line("# @prompt password Your password"),
            LineKind::Directive(Directive::Prompt {
                name: "password".to_string(),
                description: Some("Your password".to_string()),
            })
        );
        assert_eq!(
            scan_line("// @prompt otp"),
            LineKind::Directive(Directive::Prompt {
                name: "otp".to_string(),
                description: None,
            })
        );
    }

    #[test]
    fn test_setting_directive() {
        assert_eq!(
            scan_line("# @no-redirect"),
            LineKind::Directive(Directive::Setting {
                name: "no-redirect".to_string(),
                value: None,
            })
        );
        assert_eq!(
            scan_line("# @timeout 5000"),
            LineKind::Directive(Directive::Setting {
                name: "timeout".to_string(),
                value: Some("5000".to_string()),
            })
        );
    }

    #[test]
    fn test_plain_comments() {
        assert_eq!(
            scan_line("  # just a note  "),
            LineKind::Comment("# just a note".to_string())
        );
        assert_eq!(
            scan_line("### Get users"),
            LineKind::Comment("### Get users".to_string())
        );
        assert_eq!(
            scan_line("# @name"),
            LineKind::Comment("# @name".to_string())
        );
        assert_eq!(scan_line("# @"), LineKind::Comment("# @".to_string()));
    }

    #[test]
    fn test_is_comment() {
        assert!(is_comment("  # x"));
        assert!(is_comment("// x"));
        assert!(!is_comment("Host: x"));
    }
}

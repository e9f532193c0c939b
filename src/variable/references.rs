use crate::parser::types::LineContext;
use crate::variable::types::{ReferenceKind, ReferencePart, ReferenceSource, VariableReference};
use regex::Regex;
use std::sync::OnceLock;

/// `{{...}}` 引用扫描器
pub struct ReferenceScanner;

impl ReferenceScanner {
    /// 扫描多行中的所有引用
    pub fn scan_lines(lines: &[LineContext]) -> Vec<VariableReference> {
        lines
            .iter()
            .flat_map(|line| Self::scan_line(&line.text, line.line_number))
            .collect()
    }

    /// 扫描单行中的所有引用，引用不会跨行
    pub fn scan_line(text: &str, line_number: usize) -> Vec<VariableReference> {
        static REF_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REF_REGEX.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

        re.captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?.as_str().trim();
                if inner.is_empty() {
                    return None;
                }
                Some(VariableReference {
                    kind: classify_reference(inner),
                    raw: whole.as_str().to_string(),
                    line_number,
                    offset: whole.start(),
                    length: whole.len(),
                })
            })
            .collect()
    }
}

/// 按内部文本对引用分类
pub fn classify_reference(inner: &str) -> ReferenceKind {
    static REQUEST_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REQUEST_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][\w-]*)\.(request|response)\.(body|headers)\.(.+)$").unwrap()
    });

    if let Some(system) = inner.strip_prefix('$') {
        let (name, params) = match system.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim().to_string())),
            None => (system, None),
        };
        return ReferenceKind::System {
            name: name.to_string(),
            params: params.filter(|p| !p.is_empty()),
        };
    }

    if let Some(caps) = re.captures(inner) {
        let source = if &caps[2] == "request" {
            ReferenceSource::Request
        } else {
            ReferenceSource::Response
        };
        let part = if &caps[3] == "body" {
            ReferencePart::Body
        } else {
            ReferencePart::Headers
        };
        return ReferenceKind::Request {
            request_name: caps[1].to_string(),
            source,
            part,
            path: caps[4].to_string(),
        };
    }

    ReferenceKind::Custom {
        name: inner.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_custom() {
        let refs = ReferenceScanner::scan_line("GET {{baseUrl}}/users/{{ id }}", 3);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, ReferenceKind::Custom { name: "baseUrl".to_string() });
        assert_eq!(refs[0].offset, 4);
        assert_eq!(refs[0].length, 11);
        assert_eq!(refs[0].line_number, 3);
        assert_eq!(refs[1].raw, "{{ id }}");
        assert_eq!(refs[1].name(), "id");
    }

    #[test]
    fn test_scan_system() {
        let refs = ReferenceScanner::scan_line("X-Id: {{$randomInt 1 100}} {{$guid}}", 1);
        assert_eq!(
            refs[0].kind,
            ReferenceKind::System {
                name: "randomInt".to_string(),
                params: Some("1 100".to_string()),
            }
        );
        assert_eq!(
            refs[1].kind,
            ReferenceKind::System {
                name: "guid".to_string(),
                params: None,
            }
        );
    }

    #[test]
    fn test_scan_request_reference() {
        let refs = ReferenceScanner::scan_line(
            "Authorization: Bearer {{login.response.body.$.data.token}}",
            1,
        );
        assert_eq!(
            refs[0].kind,
            ReferenceKind::Request {
                request_name: "login".to_string(),
                source: ReferenceSource::Response,
                part: ReferencePart::Body,
                path: "$.data.token".to_string(),
            }
        );
    }

    #[test]
    fn test_request_headers_reference() {
        let kind = classify_reference("create-user.request.headers.Content-Type");
        assert!(matches!(
            kind,
            ReferenceKind::Request { source: ReferenceSource::Request, part: ReferencePart::Headers, .. }
        ));
    }

    #[test]
    fn test_dotted_custom_is_not_request_reference() {
        let kind = classify_reference("config.timeout");
        assert_eq!(kind, ReferenceKind::Custom { name: "config.timeout".to_string() });
    }

    #[test]
    fn test_empty_braces_ignored() {
        assert!(ReferenceScanner::scan_line("{{}} and {{  }}", 1).is_empty());
    }

    #[test]
    fn test_non_greedy_match() {
        let refs = ReferenceScanner::scan_line("{{a}}-{{b}}", 1);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].offset, 6);
    }
}

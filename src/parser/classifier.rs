use crate::parser::types::{ClassifiedSegment, LineContext, MessageType, Segment, SegmentType};

/// 片段分类器
pub struct SegmentClassifier;

impl SegmentClassifier {
    /// 对所有片段分类
    pub fn classify_all(segments: Vec<Segment>) -> Vec<ClassifiedSegment> {
        segments.into_iter().map(Self::classify).collect()
    }

    /// 对单个片段分类
    pub fn classify(segment: Segment) -> ClassifiedSegment {
        let anchor_index = segment
            .lines
            .iter()
            .position(|line| !is_non_content(&line.text));

        let Some(index) = anchor_index else {
            return ClassifiedSegment {
                segment,
                message_type: MessageType::Request,
                segment_type: SegmentType::Http,
                first_non_empty_line: None,
                anchor_index: None,
            };
        };

        let anchor = segment.lines[index].clone();
        let message_type = if is_response_line(&anchor.text) {
            MessageType::Response
        } else {
            MessageType::Request
        };

        let segment_type = if is_curl_command(&anchor.text) {
            SegmentType::Curl
        } else if has_graphql_marker(&segment.lines[index + 1..]) {
            SegmentType::Graphql
        } else {
            SegmentType::Http
        };

        ClassifiedSegment {
            segment,
            message_type,
            segment_type,
            first_non_empty_line: Some(anchor),
            anchor_index: Some(index),
        }
    }
}

/// 空行、注释行（`#`、`//`）和指令行（`@`）不是内容行
pub fn is_non_content(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with('@')
}

/// 响应行以 `HTTP/` 开头（不区分大小写）
pub fn is_response_line(text: &str) -> bool {
    text.trim_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http/"))
}

/// curl 命令：以单词 `curl` 开头
pub fn is_curl_command(text: &str) -> bool {
    let trimmed = text.trim();
    match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("curl") => trimmed[4..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace()),
        _ => false,
    }
}

/// 在锚点之后、第一个空行之前查找 `X-Request-Type: GraphQL`
fn has_graphql_marker(lines: &[LineContext]) -> bool {
    lines
        .iter()
        .take_while(|line| !line.is_blank())
        .filter_map(|line| line.text.split_once(':'))
        .any(|(name, value)| {
            name.trim().eq_ignore_ascii_case("x-request-type")
                && value.trim().eq_ignore_ascii_case("graphql")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::scan_lines;
    use crate::parser::segmenter::segment_lines;

    fn classify_text(source: &str) -> ClassifiedSegment {
        let segments = segment_lines(&scan_lines(source));
        SegmentClassifier::classify(segments.into_iter().next().unwrap())
    }

    #[test]
    fn test_plain_request() {
        let classified = classify_text("# comment\n@host = x\nGET http://x\nAccept: */*");
        assert_eq!(classified.message_type, MessageType::Request);
        assert_eq!(classified.segment_type, SegmentType::Http);
        assert_eq!(classified.anchor_index, Some(2));
        assert_eq!(
            classified.first_non_empty_line.unwrap().text,
            "GET http://x"
        );
    }

    #[test]
    fn test_response() {
        let classified = classify_text("\n  http/1.1 200 OK\nContent-Type: text/plain");
        assert_eq!(classified.message_type, MessageType::Response);
        assert_eq!(classified.segment_type, SegmentType::Http);
    }

    #[test]
    fn test_curl() {
        let classified = classify_text("// @name c\nCURL -X POST http://x");
        assert_eq!(classified.segment_type, SegmentType::Curl);
        assert_eq!(classified.message_type, MessageType::Request);
    }

    #[test]
    fn test_curl_requires_word_boundary() {
        let classified = classify_text("curlew.example.com/birds");
        assert_eq!(classified.segment_type, SegmentType::Http);
    }

    #[test]
    fn test_graphql_marker() {
        let classified =
            classify_text("POST http://x/graphql\nx-request-type: graphql\n\nquery { a }");
        assert_eq!(classified.segment_type, SegmentType::Graphql);
    }

    #[test]
    fn test_graphql_marker_after_blank_line_ignored() {
        let classified = classify_text("POST http://x\n\nX-Request-Type: GraphQL");
        assert_eq!(classified.segment_type, SegmentType::Http);
    }

    #[test]
    fn test_comment_only_segment() {
        let classified = classify_text("# only comments\n// and more\n# @name x");
        assert_eq!(classified.message_type, MessageType::Request);
        assert_eq!(classified.segment_type, SegmentType::Http);
        assert!(classified.first_non_empty_line.is_none());
        assert!(classified.anchor_index.is_none());
    }
}

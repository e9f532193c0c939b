use crate::parser::types::{LineContext, Segment};

/// 判断是否为分隔行：去除首尾空白后由 3 个及以上的 `#` 组成
pub fn is_delimiter(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '#')
}

/// 第一个分隔行的行号
pub fn first_delimiter_line(lines: &[LineContext]) -> Option<usize> {
    lines
        .iter()
        .find(|line| is_delimiter(&line.text))
        .map(|line| line.line_number)
}

/// 按分隔行切分片段
///
/// 分隔行本身不属于任何片段；只含空白行的片段会被丢弃，
/// 剩余片段按文档顺序从 0 开始编号。
pub fn segment_lines(lines: &[LineContext]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Vec<LineContext> = Vec::new();

    for line in lines {
        if is_delimiter(&line.text) {
            push_segment(&mut segments, std::mem::take(&mut current));
        } else {
            current.push(line.clone());
        }
    }
    push_segment(&mut segments, current);

    segments
}

fn push_segment(segments: &mut Vec<Segment>, lines: Vec<LineContext>) {
    if lines.iter().all(|line| line.is_blank()) {
        return;
    }

    // 非空片段至少有一行
    let start_line = lines.first().map_or(0, |l| l.line_number);
    let end_line = lines.last().map_or(0, |l| l.line_number);

    segments.push(Segment {
        segment_id: segments.len(),
        start_line,
        end_line,
        lines,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::scan_lines;

    fn texts(segment: &Segment) -> Vec<&str> {
        segment.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_is_delimiter() {
        assert!(is_delimiter("###"));
        assert!(is_delimiter("  #####  "));
        assert!(!is_delimiter("##"));
        assert!(!is_delimiter("### Get users"));
        assert!(!is_delimiter("# @name x"));
    }

    #[test]
    fn test_two_segments() {
        let segments = segment_lines(&scan_lines("a\n###\nb"));
        assert_eq!(segments.len(), 2);
        assert_eq!(texts(&segments[0]), vec!["a"]);
        assert_eq!(texts(&segments[1]), vec!["b"]);
        assert_eq!(segments[1].segment_id, 1);
        assert_eq!(segments[1].start_line, 3);
    }

    #[test]
    fn test_consecutive_delimiters() {
        let segments = segment_lines(&scan_lines("###\n###\na"));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment_id, 0);
        assert_eq!(texts(&segments[0]), vec!["a"]);
    }

    #[test]
    fn test_blank_segments_do_not_reserve_ids() {
        let segments = segment_lines(&scan_lines("GET /a\n###\n   \n\n###\nGET /b\n"));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].segment_id, 1);
        assert_eq!(segments[1].lines[0].text, "GET /b");
        assert_eq!(segments[1].end_line, 7);
    }

    #[test]
    fn test_no_delimiter_lines_in_segments() {
        let source = "GET /a\n  ###  \n#####\nGET /b\n####\n";
        for segment in segment_lines(&scan_lines(source)) {
            assert!(segment.lines.iter().all(|l| !is_delimiter(&l.text)));
        }
    }

    #[test]
    fn test_first_delimiter_line() {
        assert_eq!(first_delimiter_line(&scan_lines("@a = 1\n\n###\nGET /")), Some(3));
        assert_eq!(first_delimiter_line(&scan_lines("GET /")), None);
    }
}

use crate::parser::types::{LineContext, LineEnding};

/// 将原始文本切分为带偏移信息的行
///
/// 支持 `\n`、`\r\n` 与单独的 `\r`。空输入得到一个长度为 0 的行；
/// 以换行符结尾的输入会多出一个空的末行。
pub fn scan_lines(source: &str) -> Vec<LineContext> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let ending = match bytes[i] {
            b'\n' => Some((LineEnding::Lf, 1)),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => Some((LineEnding::CrLf, 2)),
            b'\r' => Some((LineEnding::Cr, 1)),
            _ => None,
        };

        if let Some((line_ending, width)) = ending {
            lines.push(make_line(source, lines.len() + 1, start, i, Some(line_ending)));
            i += width;
            start = i;
        } else {
            i += 1;
        }
    }

    lines.push(make_line(source, lines.len() + 1, start, bytes.len(), None));
    lines
}

fn make_line(
    source: &str,
    line_number: usize,
    start: usize,
    end: usize,
    line_ending: Option<LineEnding>,
) -> LineContext {
    LineContext {
        line_number,
        start_offset: start,
        end_offset: end,
        text: source[start..end].to_string(),
        line_ending,
    }
}

/// 用原始换行符重新拼接各行
pub fn reconstruct(lines: &[LineContext]) -> String {
    let mut output = String::new();
    for line in lines {
        output.push_str(&line.text);
        if let Some(ending) = line.line_ending {
            output.push_str(ending.as_str());
        }
    }
    output
}

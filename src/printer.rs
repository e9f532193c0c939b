use crate::ast::HttpRequestAst;
use crate::error::Result;
use crate::parser::{Diagnostic, ParseOutput, Severity};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 把解析结果渲染为 JSON，`ast_only` 时只输出 AST
pub fn render_json(output: &ParseOutput, ast_only: bool, pretty: bool) -> Result<String> {
    let json = match (ast_only, pretty) {
        (true, true) => serde_json::to_string_pretty(&output.ast)?,
        (true, false) => serde_json::to_string(&output.ast)?,
        (false, true) => serde_json::to_string_pretty(output)?,
        (false, false) => serde_json::to_string(output)?,
    };
    Ok(json)
}

/// 请求汇总表：序号、名称、方法、URL、请求体、预期响应
pub fn request_table(ast: &HttpRequestAst) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Name", "Method", "URL", "Body", "Expect"]);

    for (index, request) in ast.requests.iter().enumerate() {
        let body = match &request.body {
            Some(body) if body.is_ok() => Cell::new(body.kind().unwrap_or("-")),
            Some(_) => Cell::new("error").fg(Color::Red),
            None => Cell::new("-").add_attribute(Attribute::Dim),
        };

        let expect = match &request.expected_response {
            Some(response) => {
                let color = if response.status_code < 400 {
                    Color::Green
                } else {
                    Color::Red
                };
                Cell::new(response.status_code).fg(color)
            }
            None => Cell::new("-").add_attribute(Attribute::Dim),
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(request.name().unwrap_or("-")),
            Cell::new(request.method_or_default()),
            Cell::new(&request.url).add_attribute(Attribute::Dim),
            body,
            expect,
        ]);
    }

    table
}

/// 单条诊断的彩色文本
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "Error".red().bold(),
        Severity::Warning => "Warning".yellow(),
    };

    match diagnostic.line_number {
        Some(line) => format!("{} (line {}): {}", label, line, diagnostic.message),
        None => format!("{}: {}", label, diagnostic.message),
    }
}

/// 打印请求汇总表和诊断信息
pub fn print_summary(ast: &HttpRequestAst, diagnostics: &[Diagnostic]) {
    println!("{}", request_table(ast));

    if !ast.variables.global.is_empty() {
        println!(
            "{}: {} file-scoped, {} total",
            "Variables".bold(),
            ast.variables.file_scoped.len(),
            ast.variables.global.len()
        );
    }

    for diagnostic in diagnostics {
        println!("{}", format_diagnostic(diagnostic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_content;

    #[test]
    fn test_request_table_rows() {
        let output = parse_content("# @name list\nGET /users\n###\nHTTP/1.1 200 OK\n###\nPOST /users");
        let table = request_table(&output.ast);
        assert_eq!(table.row_count(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("list"));
        assert!(rendered.contains("/users"));
        assert!(rendered.contains("200"));
    }

    #[test]
    fn test_render_json() {
        let output = parse_content("GET /x");

        let compact = render_json(&output, true, false).unwrap();
        assert!(!compact.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(value["requests"][0]["url"], "/x");

        let pretty = render_json(&output, false, true).unwrap();
        assert!(pretty.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(value["ast"]["requests"][0]["method"], "GET");
    }

    #[test]
    fn test_format_diagnostic() {
        colored::control::set_override(false);
        let diagnostic = Diagnostic::error("Invalid HTTP method 'FETCH' at line 2", Some(2));
        assert_eq!(
            format_diagnostic(&diagnostic),
            "Error (line 2): Invalid HTTP method 'FETCH' at line 2"
        );

        let diagnostic = Diagnostic::warning("orphan", None);
        assert_eq!(format_diagnostic(&diagnostic), "Warning: orphan");
    }
}

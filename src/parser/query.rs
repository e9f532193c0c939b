use crate::ast::QueryParam;

/// 查询参数解析结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParseResult {
    pub params: Vec<QueryParam>,
    /// 消耗的续行数量
    pub consumed_lines_count: usize,
}

/// 查询参数解析器
pub struct QueryParser;

impl QueryParser {
    /// 解析请求行之后以 `?` 或 `&` 开头的续行，遇到第一个不匹配的行停止
    pub fn parse(lines: &[&str]) -> QueryParseResult {
        let mut result = QueryParseResult::default();

        for line in lines {
            let trimmed = line.trim_start();
            let Some(rest) = trimmed
                .strip_prefix('?')
                .or_else(|| trimmed.strip_prefix('&'))
            else {
                break;
            };

            result.params.push(Self::parse_pair(rest));
            result.consumed_lines_count += 1;
        }

        result
    }

    /// 解析 URL 中内联的查询串（`?` 之后、`#` 之前）
    pub fn parse_inline(url: &str) -> Vec<QueryParam> {
        let Some((_, query)) = url.split_once('?') else {
            return Vec::new();
        };
        let query = query.split_once('#').map_or(query, |(q, _)| q);

        query
            .split('&')
            .filter(|pair| !pair.trim().is_empty())
            .map(Self::parse_pair)
            .collect()
    }

    fn parse_pair(pair: &str) -> QueryParam {
        match pair.split_once('=') {
            Some((key, value)) => QueryParam::new(key.trim(), value.trim()),
            None => QueryParam::new(pair.trim(), ""),
        }
    }
}

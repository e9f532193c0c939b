use crate::ast::types::{AstNode, DocumentVariables, HttpRequestAst, Request};
use crate::parser::segment::ParseContext;

/// AST 组装器
pub struct AstAssembler;

impl AstAssembler {
    /// 把片段节点组装为完整的 AST
    ///
    /// 响应会挂到最近一个请求上，先到先得：请求已有响应时忽略后续响应，
    /// 之前没有请求的响应同样被忽略。紧邻的前一个请求因结构错误被丢弃时，
    /// 响应不会越过它挂到更早的请求上。严格模式下这些情况都会记录警告。
    pub fn assemble(nodes: Vec<AstNode>, ctx: &mut ParseContext) -> HttpRequestAst {
        let mut requests: Vec<Request> = Vec::new();

        for node in nodes {
            match node {
                AstNode::Request(mut request) => {
                    request.block_variables = ctx.registry.block(request.segment_id).to_vec();
                    requests.push(request);
                }
                AstNode::Response(response) => {
                    let segment_id = response.segment_id;
                    let line = response.raw_text_range.start_line;
                    let dropped = Self::dropped_between(&requests, segment_id, ctx);
                    if let Some(dropped) = dropped {
                        let message = format!(
                            "Preceding request in segment {} was dropped; ignoring response",
                            dropped
                        );
                        ctx.strict_warning(message, Some(line), segment_id);
                        continue;
                    }
                    match requests.last_mut() {
                        Some(request) if request.expected_response.is_none() => {
                            tracing::debug!(
                                "Linked response in segment {} to request in segment {}",
                                segment_id,
                                request.segment_id
                            );
                            request.expected_response = Some(response);
                        }
                        Some(request) => {
                            let message = format!(
                                "Request in segment {} already has an expected response; ignoring duplicate",
                                request.segment_id
                            );
                            ctx.strict_warning(message, Some(line), segment_id);
                        }
                        None => {
                            ctx.strict_warning(
                                "Response has no preceding request; ignoring",
                                Some(line),
                                segment_id,
                            );
                        }
                    }
                }
            }
        }

        HttpRequestAst {
            requests,
            variables: DocumentVariables {
                file_scoped: ctx.registry.file_scoped(),
                global: ctx.registry.global().to_vec(),
            },
        }
    }

    /// 查找最近一个已产出的请求与当前响应之间被丢弃的请求片段
    fn dropped_between(
        requests: &[Request],
        segment_id: usize,
        ctx: &ParseContext,
    ) -> Option<usize> {
        let after = requests.last().map(|r| r.segment_id);
        ctx.dropped_requests
            .iter()
            .rev()
            .copied()
            .find(|&d| d < segment_id && after.is_none_or(|a| d > a))
    }
}

//! 초기 답변 생성기
//!
//! 고정된 지시 프롬프트와 함께 질문을 모델에 보내고,
//! 검색 도구가 주어지면 모델이 직접 호출할 수 있도록 바인딩합니다.

use std::sync::Arc;

use anyhow::Result;

use super::state::{GeneratedAnswer, ParsedQuery};
use crate::llm::{ChatMessage, ChatModel, CompletionRequest, Tool};

/// 시스템 메시지
const SYSTEM_PROMPT: &str = "Выполни запрос пользователя, используя доступные инструменты.";

/// 사용자 프롬프트 (ИТМО 전문가 역할)
fn answer_prompt(query: &str) -> String {
    format!(
        "Ты эксперт по Университету ИТМО.\n\
         Ответь на вопрос: {query}\n\
         Правила:\n\
         1. Будь максимально точным.\n\
         2. Используй инструмент поиска.\n\
         3. Ответ должен быть кратким и фактологически точным."
    )
}

/// 초기 답변 요청 구성
pub fn build_request(query: &str, search_tool: Option<Arc<dyn Tool>>) -> CompletionRequest {
    let request = CompletionRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(answer_prompt(query)),
    ]);

    match search_tool {
        Some(tool) => request.with_tool(tool),
        None => request,
    }
}

/// 2단계: 초기 답변 생성
pub async fn generate_initial_answer(
    model: &dyn ChatModel,
    search_tool: Option<Arc<dyn Tool>>,
    parsed: ParsedQuery,
) -> Result<GeneratedAnswer> {
    let request = build_request(&parsed.question().query, search_tool);

    let text = model.complete(request).await?;

    tracing::debug!(
        "Request {}: {} answered ({} chars)",
        parsed.question().id,
        model.name(),
        text.chars().count()
    );

    Ok(GeneratedAnswer::new(parsed, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_prompt_contains_question() {
        let request = build_request("Когда основан ИТМО?", None);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.messages[1].content.contains("Ответь на вопрос: Когда основан ИТМО?"));
        assert!(request.temperature.is_none());
        assert!(request.tools.is_empty());
    }
}

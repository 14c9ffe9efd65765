//! 최종 답변 결정기
//!
//! - reasoning: 앞 단계 출력마다 `라벨: 텍스트` 조각을 공백으로 연결
//! - sources: 검색 결과 URL (순서 유지)
//! - answer: 객관식일 때만 temperature 0으로 모델에 번호 선택을 요청

use anyhow::Result;
use url::Url;

use super::state::{FinalAnswer, SearchedAnswer};
use crate::llm::{ChatMessage, ChatModel, CompletionRequest};

/// 선택지 결정 프롬프트
fn resolution_prompt(query: &str, llm_answer: &str, options_text: &str) -> String {
    format!(
        "Сформируй окончательный ответ на основе:\n\n\
         Исходный вопрос: {query}\n\
         Ответ LLM: {llm_answer}\n\
         Варианты: {options_text}\n\n\
         Правила:\n\
         1. Для вопроса с вариантами верни номер ответа (цифрой), соответствующий правильному варианту из списка.\n\
         2. Если ни один вариант не подходит, то верни ответ только null.\n\
         3. Учитывай только соответствие правильного ответа порядку в списке вариантов.\n\
         4. Ответ только цифрой или null."
    )
}

/// 결정 요청 구성 (결정적 응답을 위해 temperature 0)
pub fn build_resolution_request(searched: &SearchedAnswer, options: &[String]) -> CompletionRequest {
    let prompt = resolution_prompt(
        &searched.question().query,
        searched.llm_answer().unwrap_or_default(),
        &options.join("\n"),
    );

    CompletionRequest::new(vec![ChatMessage::user(prompt)]).with_temperature(0.0)
}

/// 모델 응답 → 선택지 번호
///
/// ASCII 숫자로만 이루어진 응답만 인정합니다. 공백, 부호, 소수점,
/// `null` 등은 모두 None입니다.
pub fn parse_option_index(response: &str) -> Option<u32> {
    if response.is_empty() || !response.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    response.parse().ok()
}

/// reasoning 조립
pub fn build_reasoning(searched: &SearchedAnswer, model_label: &str, search_label: &str) -> String {
    let mut fragments = Vec::new();

    if let Some(answer) = searched.llm_answer() {
        fragments.push(format!("{}: {}", model_label, answer));
    }

    if let Some(summary) = searched.search_summary() {
        fragments.push(format!("{}: {}", search_label, summary));
    }

    fragments.join(" ")
}

/// 검색 결과 URL 목록
pub fn collect_sources(searched: &SearchedAnswer) -> Vec<Url> {
    searched
        .search_results()
        .iter()
        .map(|r| r.url.clone())
        .collect()
}

/// 4단계: 최종 답변 결정
pub async fn decide_answer(
    model: &dyn ChatModel,
    search_label: &str,
    searched: SearchedAnswer,
) -> Result<FinalAnswer> {
    let reasoning = build_reasoning(&searched, model.name(), search_label);
    let sources = collect_sources(&searched);

    let answer = match searched.options() {
        Some(options) => {
            let request = build_resolution_request(&searched, options);
            let response = model.complete(request).await?;
            let answer = parse_option_index(&response);

            if answer.is_none() {
                tracing::info!(
                    "Request {}: no option resolved from response {:?}",
                    searched.question().id,
                    response
                );
            }
            answer
        }
        None => None,
    };

    Ok(FinalAnswer {
        id: searched.question().id,
        answer,
        reasoning,
        sources,
    })
}

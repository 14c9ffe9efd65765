//! 파이프라인 단계별 상태
//!
//! 각 단계는 이전 단계의 값을 소유권으로 받아 다음 단계의 값을 만듭니다.
//! 필드는 생성한 단계에서만 채워지고 이후에는 읽기 접근자만 노출됩니다.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::search::SearchResult;

/// 입력 질문 (파이프라인 시작점)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 호출자가 지정한 요청 ID
    pub id: i64,
    /// 원본 질문 텍스트
    pub query: String,
}

impl Question {
    pub fn new(id: i64, query: impl Into<String>) -> Self {
        Self {
            id,
            query: query.into(),
        }
    }
}

/// 1단계 결과: 객관식 선택지 파싱 완료
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    question: Question,
    options: Option<Vec<String>>,
}

impl ParsedQuery {
    pub(crate) fn new(question: Question, options: Option<Vec<String>>) -> Self {
        Self { question, options }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    /// 선택지 번호 목록 (객관식이 아니면 None)
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

/// 2단계 결과: LLM 초기 답변 생성 완료
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    parsed: ParsedQuery,
    llm_answer: Option<String>,
}

impl GeneratedAnswer {
    /// 빈 응답은 답변 없음으로 취급
    pub(crate) fn new(parsed: ParsedQuery, llm_answer: String) -> Self {
        let llm_answer = Some(llm_answer).filter(|a| !a.is_empty());
        Self { parsed, llm_answer }
    }

    pub fn parsed(&self) -> &ParsedQuery {
        &self.parsed
    }

    pub fn llm_answer(&self) -> Option<&str> {
        self.llm_answer.as_deref()
    }
}

/// 3단계 결과: 외부 검색 완료
#[derive(Debug, Clone, PartialEq)]
pub struct SearchedAnswer {
    generated: GeneratedAnswer,
    search_summary: Option<String>,
    search_results: Vec<SearchResult>,
}

impl SearchedAnswer {
    pub(crate) fn new(
        generated: GeneratedAnswer,
        search_summary: Option<String>,
        search_results: Vec<SearchResult>,
    ) -> Self {
        Self {
            generated,
            search_summary,
            search_results,
        }
    }

    pub fn generated(&self) -> &GeneratedAnswer {
        &self.generated
    }

    pub fn question(&self) -> &Question {
        self.generated.parsed.question()
    }

    pub fn options(&self) -> Option<&[String]> {
        self.generated.parsed.options()
    }

    pub fn llm_answer(&self) -> Option<&str> {
        self.generated.llm_answer()
    }

    /// 검색 서비스가 요약한 답변
    pub fn search_summary(&self) -> Option<&str> {
        self.search_summary.as_deref()
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }
}

/// 최종 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub id: i64,
    /// 선택된 선택지 번호 (객관식이 아니거나 결정 불가면 None)
    pub answer: Option<u32>,
    pub reasoning: String,
    pub sources: Vec<Url>,
}

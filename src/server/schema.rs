//! HTTP 요청/응답 스키마

use serde::{Deserialize, Serialize};
use url::Url;

use crate::agent::{FinalAnswer, Question};

/// `POST /api/request` 요청 본문
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub id: i64,
    pub query: String,
}

impl From<PredictionRequest> for Question {
    fn from(req: PredictionRequest) -> Self {
        Question::new(req.id, req.query)
    }
}

/// `POST /api/request` 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: i64,
    pub answer: Option<u32>,
    pub reasoning: String,
    pub sources: Vec<Url>,
}

impl From<FinalAnswer> for PredictionResponse {
    fn from(answer: FinalAnswer) -> Self {
        Self {
            id: answer.id,
            answer: answer.answer,
            reasoning: answer.reasoning,
            sources: answer.sources,
        }
    }
}

/// 에러 응답 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

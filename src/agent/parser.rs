//! 질문 파서 - 객관식 선택지 감지

use std::sync::LazyLock;

use regex::Regex;

use super::state::{ParsedQuery, Question};

/// `숫자. 텍스트` 형태의 선택지 줄
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\..+$").expect("Invalid option regex"));

/// 객관식으로 판단하는 최소 선택지 수
const MIN_OPTIONS: usize = 2;

/// 선택지 번호 추출
///
/// 두 개 이상 감지되어야 객관식으로 판단합니다.
pub fn detect_options(query: &str) -> Option<Vec<String>> {
    let options: Vec<String> = query
        .lines()
        .filter_map(|line| OPTION_LINE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();

    (options.len() >= MIN_OPTIONS).then_some(options)
}

/// 1단계: 질문 파싱
pub fn parse_query(question: Question) -> ParsedQuery {
    let options = detect_options(&question.query);

    match &options {
        Some(opts) => tracing::debug!("Request {}: {} options detected", question.id, opts.len()),
        None => tracing::debug!("Request {}: free-text question", question.id),
    }

    ParsedQuery::new(question, options)
}

//! 외부 검색 단계

use anyhow::Result;

use super::state::{GeneratedAnswer, SearchedAnswer};
use crate::search::{SearchOptions, WebSearch, MAX_SEARCH_RESULTS};

/// 3단계: 도메인 제한 웹 검색
///
/// 서비스가 더 많이 돌려줘도 최대 3건만 유지합니다.
pub async fn search_external(
    search: &dyn WebSearch,
    options: &SearchOptions,
    generated: GeneratedAnswer,
) -> Result<SearchedAnswer> {
    let query = &generated.parsed().question().query;
    let response = search.search(query, options).await?;

    let mut results = response.results;
    results.truncate(MAX_SEARCH_RESULTS.min(options.max_results));

    tracing::debug!(
        "Request {}: {} returned {} results",
        generated.parsed().question().id,
        search.name(),
        results.len()
    );

    Ok(SearchedAnswer::new(generated, response.answer, results))
}

//! Matcher/Ranker - 토큰 기반 문제 검색
//!
//! 쿼리를 토큰으로 나눈 뒤:
//! 1. 모든 토큰이 label에 부분 문자열로 포함된 엔트리만 남기고 (AND)
//! 2. label 시작에 앵커된 패턴 매치 수로 가중치를 매긴 다음
//! 3. 가중치 10 이상인 후보가 있으면 그것만 내림차순(안정) 정렬해 반환,
//!    없으면 통과한 후보 전부를 원래 순서대로 반환합니다.

use regex::Regex;

use super::entry::KnowledgeEntry;

/// 앵커 패턴 하나가 매치될 때마다 더하는 가중치
pub const ANCHOR_WEIGHT: u32 = 10;

/// label 토큰 수가 쿼리 토큰 수와 같을 때 더하는 가중치
pub const TOKEN_COUNT_BONUS: u32 = 10;

/// 이 값 이상이면 강한 후보
pub const STRONG_THRESHOLD: u32 = 10;

// ============================================================================
// Types
// ============================================================================

/// 가중치가 매겨진 후보 (쿼리마다 생성, 페이지 계산 후 폐기)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub entry: KnowledgeEntry,
    pub weight: u32,
}

// ============================================================================
// Tokenization
// ============================================================================

/// 쿼리 정규화: 소문자화, 쉼표 제거, 공백 분할
///
/// 빈 토큰은 만들지 않습니다. 결과가 비면 호출 측에서
/// "문제를 말하지 않음"으로 처리합니다.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .replace(',', "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 토큰마다 두 개의 앵커 패턴: `^t(es|s)?\b`, `^t`
///
/// 단어 경계는 ASCII 기준 (`(?-u:\b)`): 비ASCII 문자는 단어 문자로 보지 않습니다.
fn anchor_patterns(tokens: &[String]) -> Vec<Regex> {
    let mut patterns = Vec::with_capacity(tokens.len() * 2);

    for token in tokens {
        let escaped = regex::escape(token);
        for pattern in [format!(r"^{}(es|s)?(?-u:\b)", escaped), format!("^{}", escaped)] {
            match Regex::new(&pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => tracing::warn!("Skipping anchor pattern {:?}: {}", pattern, e),
            }
        }
    }

    patterns
}

// ============================================================================
// Search
// ============================================================================

/// 가중치 포함 검색
///
/// 반환 순서가 곧 랭킹입니다. 강한 후보가 하나도 없으면 가중치 0인
/// 후보도 포함됩니다.
pub fn search_scored(entries: &[KnowledgeEntry], query: &str) -> Vec<ScoredCandidate> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let patterns = anchor_patterns(&tokens);

    let survivors: Vec<ScoredCandidate> = entries
        .iter()
        .filter(|entry| tokens.iter().all(|t| entry.label.contains(t.as_str())))
        .map(|entry| {
            let anchored = patterns.iter().filter(|re| re.is_match(&entry.label)).count() as u32;
            let mut weight = anchored * ANCHOR_WEIGHT;

            if entry.label.split_whitespace().count() == tokens.len() {
                weight += TOKEN_COUNT_BONUS;
            }

            ScoredCandidate {
                entry: entry.clone(),
                weight,
            }
        })
        .collect();

    let mut strong: Vec<ScoredCandidate> = survivors
        .iter()
        .filter(|c| c.weight >= STRONG_THRESHOLD)
        .cloned()
        .collect();

    tracing::debug!(
        "search {:?}: tokens={:?}, survivors={}, strong={}",
        query,
        tokens,
        survivors.len(),
        strong.len()
    );

    if strong.is_empty() {
        return survivors;
    }

    // sort_by는 안정 정렬: 동점이면 지식베이스 순서 유지
    strong.sort_by(|a, b| b.weight.cmp(&a.weight));
    strong
}

/// 검색 (최적 매치 우선, 가중치 제거)
pub fn search(entries: &[KnowledgeEntry], query: &str) -> Vec<KnowledgeEntry> {
    search_scored(entries, query)
        .into_iter()
        .map(|c| c.entry)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kb(labels: &[&str]) -> Vec<KnowledgeEntry> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| KnowledgeEntry::new(*l, format!("text{}", i)))
            .collect()
    }

    fn labels(results: &[KnowledgeEntry]) -> Vec<&str> {
        results.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Moldy Bread, stale"), vec!["moldy", "bread", "stale"]);
        assert_eq!(tokenize("  a\t b  "), vec!["a", "b"]);
        assert_eq!(tokenize("a,b"), vec!["ab"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" , ").is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let entries = kb(&["eggs", "bread"]);
        assert!(search(&entries, "").is_empty());
        assert!(search(&entries, "   ").is_empty());
    }

    #[test]
    fn test_exact_label_ranks_first() {
        let entries = kb(&["expired eggs", "expiration dates"]);
        let scored = search_scored(&entries, "expiration dates");

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].entry.label, "expiration dates");
        // 앵커 2개 + 토큰 수 보너스
        assert_eq!(scored[0].weight, 30);
    }

    #[test]
    fn test_shared_prefix_ties_keep_order() {
        let entries = kb(&["expiration dates", "expired eggs"]);
        let scored = search_scored(&entries, "expir");

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].entry.label, "expiration dates");
        assert_eq!(scored[1].entry.label, "expired eggs");
        assert_eq!(scored[0].weight, 10);
        assert_eq!(scored[1].weight, 10);
    }

    #[test]
    fn test_and_semantics() {
        let entries = kb(&["stale bread", "moldy stale bread", "moldy cheese"]);
        let results = search(&entries, "moldy bread, stale");
        assert_eq!(labels(&results), vec!["moldy stale bread"]);
    }

    #[test]
    fn test_unknown_token_excludes_everything() {
        let entries = kb(&["stale bread", "moldy cheese"]);
        assert!(search(&entries, "bread zucchini").is_empty());
    }

    #[test]
    fn test_strong_candidates_sorted_and_weak_dropped() {
        let entries = kb(&["expired eggs", "eggs expired", "eggs"]);
        let scored = search_scored(&entries, "eggs");

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].entry.label, "eggs");
        assert_eq!(scored[0].weight, 30);
        assert_eq!(scored[1].entry.label, "eggs expired");
        assert_eq!(scored[1].weight, 20);
    }

    #[test]
    fn test_weak_fallback_keeps_original_order() {
        let entries = kb(&["rotten eggs today", "expired eggs now", "bread"]);
        let scored = search_scored(&entries, "eggs");

        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|c| c.weight == 0));
        assert_eq!(scored[0].entry.label, "rotten eggs today");
        assert_eq!(scored[1].entry.label, "expired eggs now");
    }

    #[test]
    fn test_plural_anchor() {
        let entries = kb(&["eggs rotten"]);
        let scored = search_scored(&entries, "egg");
        // ^egg(es|s)?\b 와 ^egg 모두 매치, 토큰 수는 다름
        assert_eq!(scored[0].weight, 20);

        let entries = kb(&["eggshell uses"]);
        let scored = search_scored(&entries, "egg");
        // 단어 경계가 없으므로 복수형 패턴은 실패
        assert_eq!(scored[0].weight, 10);
    }

    #[test]
    fn test_plural_anchor_uses_ascii_word_boundary() {
        // 'é'는 ASCII 단어 문자가 아니므로 "caf" 뒤에 경계가 있음
        let entries = kb(&["caféé x"]);
        let scored = search_scored(&entries, "caf");
        assert_eq!(scored[0].weight, 20);
    }

    #[test]
    fn test_token_count_bonus_alone_is_strong() {
        let entries = kb(&["eggs", "rotten eggs"]);
        let scored = search_scored(&entries, "ggs");

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].entry.label, "eggs");
        assert_eq!(scored[0].weight, TOKEN_COUNT_BONUS);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let entries = kb(&["feeling part of the team"]);
        let results = search(&entries, "Feeling Part of the TEAM");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let entries = kb(&["c++ leftovers", "cheese"]);
        let results = search(&entries, "c++");
        assert_eq!(labels(&results), vec!["c++ leftovers"]);

        assert!(search(&entries, "(").is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let entries = kb(&["interruptions", "interruptions from kids", "kids at home"]);
        let first = search(&entries, "interruptions");
        let second = search(&entries, "interruptions");
        assert_eq!(first, second);
    }
}

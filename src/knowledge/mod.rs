//! Knowledge 모듈 - 문제 검색 엔진
//!
//! - Entry: 불변 지식베이스와 지식 소스 (JSON `[label, text]` 목록)
//! - Matcher: 토큰 AND 필터 + 앵커 패턴 가중치 랭킹
//! - Session: 세션 상태와 두 턴 페이지네이션

mod entry;
mod matcher;
mod session;

// Re-exports
pub use entry::{
    EmbeddedSource, JsonFileSource, KnowledgeBase, KnowledgeEntry, KnowledgeSource, LoadError,
};
pub use matcher::{
    search, search_scored, tokenize, ScoredCandidate,
    ANCHOR_WEIGHT, STRONG_THRESHOLD, TOKEN_COUNT_BONUS,
};
pub use session::{
    present_first_page, present_follow_up, FirstPage, FollowUp, SessionState,
    MAX_PROBLEMS, MAX_RESPONSES,
};

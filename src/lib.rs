//! problem-coach - 음성 코치 스킬용 문제 검색 엔진
//!
//! 사용자가 말한 문제(자유 텍스트)를 정적 지식베이스에서 찾아
//! 가장 잘 맞는 추천을 돌려주고, 나머지는 세션에 보관했다가
//! "more information" 턴에서 안내합니다.
//!
//! 두 스킬(Waste Less Food, Work-from-Home Coach)은 같은 엔진을 쓰고
//! 프로파일(어휘 + 지식 소스)만 다릅니다.

pub mod cli;
pub mod knowledge;
pub mod skill;

// Re-exports
pub use knowledge::{
    present_first_page, present_follow_up, search, tokenize, FirstPage, FollowUp, KnowledgeBase,
    KnowledgeEntry, KnowledgeSource, LoadError, ScoredCandidate, SessionState,
};
pub use skill::{IncomingTurn, Intent, Skill, SkillError, SkillProfile, SkillRequest, SkillResponse};

//! Skill 모듈 - 코치 스킬 한 턴 처리
//!
//! - Profile: 스킬별 어휘 + 지식 소스 (검색 로직은 공유)
//! - Intent: 인텐트 이름 → 핸들러 디스패치
//! - Request: 요청 엔벨로프 해석
//! - Response: 음성/카드 응답과 응답 엔벨로프
//!
//! ## 사용법
//! ```rust,ignore
//! let skill = Skill::new(SkillProfile::waste_less_food())?;
//! let mut session = SessionState::new();
//! let response = skill.handle(&skill.recommendation_request("stale bread"), &mut session);
//! ```

mod intent;
mod profile;
mod request;
mod response;

use serde_json::Value;

use crate::knowledge::{KnowledgeBase, SessionState};

// Re-exports
pub use intent::{Handler, Intent, IntentTable, MORE_INFORMATION_INTENT};
pub use profile::{SkillError, SkillProfile, BUILTIN_PROFILES};
pub use request::{IncomingTurn, SkillRequest};
pub use response::{Card, SkillResponse};

// ============================================================================
// Skill
// ============================================================================

/// 프로파일로 구성된 코치 스킬
pub struct Skill {
    profile: SkillProfile,
    knowledge: KnowledgeBase,
    intents: IntentTable,
}

impl Skill {
    /// 프로파일의 지식 소스를 로드해 생성 (로드 실패는 치명적)
    pub fn new(profile: SkillProfile) -> Result<Self, SkillError> {
        let knowledge = profile.knowledge_source()?.load()?;
        Ok(Self::with_knowledge(profile, knowledge))
    }

    /// 이미 로드된 지식베이스로 생성
    pub fn with_knowledge(profile: SkillProfile, knowledge: KnowledgeBase) -> Self {
        Self {
            profile,
            knowledge,
            intents: IntentTable::new(),
        }
    }

    pub fn profile(&self) -> &SkillProfile {
        &self.profile
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// 추천 요청 생성 헬퍼 (프로파일의 인텐트/슬롯 이름 사용)
    pub fn recommendation_request(&self, query: impl Into<String>) -> SkillRequest {
        SkillRequest::intent(self.profile.recommendation_intent.as_str())
            .with_slot(self.profile.slot_name.as_str(), query)
    }

    /// 후속 요청 생성 헬퍼
    pub fn more_information_request(&self) -> SkillRequest {
        SkillRequest::intent(MORE_INFORMATION_INTENT)
    }

    /// 한 턴 처리
    ///
    /// `SessionEnded`는 응답이 없으므로 `None`입니다.
    pub fn handle(&self, request: &SkillRequest, session: &mut SessionState) -> Option<SkillResponse> {
        match request {
            SkillRequest::Launch => {
                tracing::debug!("onLaunch profile={}", self.profile.id);
                Some(
                    SkillResponse::ask(self.profile.launch_text.as_str())
                        .with_reprompt(self.profile.launch_reprompt.as_str()),
                )
            }
            SkillRequest::Intent { name, slots } => {
                tracing::debug!("Intent {} slots={:?}", name, slots);
                let handler = Intent::from_name(name, &self.profile)
                    .and_then(|intent| self.intents.get(intent));

                match handler {
                    Some(handler) => Some(handler(self, slots, session)),
                    None => {
                        tracing::warn!("Unknown intent: {}", name);
                        Some(SkillResponse::tell("Unknown intent"))
                    }
                }
            }
            SkillRequest::SessionEnded => {
                tracing::debug!("onSessionEnded profile={}", self.profile.id);
                None
            }
        }
    }

    /// 요청 엔벨로프 한 턴 처리 (JSON in → JSON out)
    ///
    /// `SessionEndedRequest`는 응답 엔벨로프가 없으므로 `None`입니다.
    pub fn handle_envelope(&self, envelope: &Value) -> Result<Option<Value>, SkillError> {
        let mut turn = SkillRequest::from_envelope(envelope, &self.profile)?;

        if turn.new_session {
            tracing::debug!("onSessionStarted sessionId={:?}", turn.session_id);
        }

        match self.handle(&turn.request, &mut turn.session) {
            Some(response) => response
                .to_envelope(&turn.session)
                .map(Some)
                .map_err(SkillError::ResponseEnvelope),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Skill Request - 요청 엔벨로프 → 한 턴의 요청
//!
//! 음성 플랫폼의 요청 JSON에서 필요한 것만 꺼냅니다:
//! `session.new`, `session.application.applicationId`, `session.attributes`,
//! `request.type`, `request.intent.name`, `request.intent.slots`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::profile::{SkillError, SkillProfile};
use crate::knowledge::SessionState;

// ============================================================================
// Types
// ============================================================================

/// 트랜스포트에서 넘어온 한 턴의 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillRequest {
    Launch,
    Intent {
        name: String,
        /// 값이 채워진 슬롯만
        slots: HashMap<String, String>,
    },
    SessionEnded,
}

impl SkillRequest {
    pub fn intent(name: impl Into<String>) -> Self {
        SkillRequest::Intent {
            name: name.into(),
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        if let SkillRequest::Intent { ref mut slots, .. } = self {
            slots.insert(slot.into(), value.into());
        }
        self
    }

    /// 요청 엔벨로프 해석
    ///
    /// 프로파일에 `application_id`가 있으면 엔벨로프의 ID와 같아야 합니다.
    /// `session.attributes`가 없으면 빈 속성 백으로 시작합니다.
    pub fn from_envelope(envelope: &Value, profile: &SkillProfile) -> Result<IncomingTurn, SkillError> {
        let wire: WireEnvelope = serde_json::from_value(envelope.clone())
            .map_err(|e| SkillError::MalformedEnvelope(e.to_string()))?;

        let session = wire.session.unwrap_or_default();
        let received_id = session.application.map(|app| app.application_id);

        if let Some(ref expected) = profile.application_id {
            if received_id.as_deref() != Some(expected.as_str()) {
                tracing::warn!("Rejected applicationId={:?}", received_id);
                return Err(SkillError::InvalidApplicationId(received_id));
            }
        }

        let attributes = SessionState::from_attributes(session.attributes.unwrap_or(Value::Null))
            .map_err(|e| SkillError::MalformedEnvelope(format!("session.attributes: {}", e)))?;

        let request = match wire.request.kind.as_str() {
            "LaunchRequest" => SkillRequest::Launch,
            "IntentRequest" => {
                let intent = wire.request.intent.ok_or_else(|| {
                    SkillError::MalformedEnvelope("IntentRequest without intent".to_string())
                })?;
                let slots = intent
                    .slots
                    .into_iter()
                    .filter_map(|(key, slot)| slot.value.map(|value| (key, value)))
                    .collect();
                SkillRequest::Intent {
                    name: intent.name,
                    slots,
                }
            }
            "SessionEndedRequest" => SkillRequest::SessionEnded,
            other => {
                return Err(SkillError::MalformedEnvelope(format!(
                    "unsupported request type '{}'",
                    other
                )))
            }
        };

        Ok(IncomingTurn {
            request,
            session: attributes,
            new_session: session.new,
            session_id: session.session_id,
        })
    }
}

/// 해석된 요청 엔벨로프
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingTurn {
    pub request: SkillRequest,
    /// 트랜스포트가 돌려준 세션 속성
    pub session: SessionState,
    /// `session.new`
    pub new_session: bool,
    pub session_id: Option<String>,
}

// ============================================================================
// Envelope (wire format)
// ============================================================================

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    session: Option<WireSession>,
    request: WireRequest,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSession {
    #[serde(default)]
    new: bool,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    application: Option<WireApplication>,
    #[serde(default)]
    attributes: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireApplication {
    application_id: String,
}

#[derive(Deserialize)]
struct WireRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    intent: Option<WireIntent>,
}

#[derive(Deserialize)]
struct WireIntent {
    name: String,
    #[serde(default)]
    slots: HashMap<String, WireSlot>,
}

#[derive(Deserialize)]
struct WireSlot {
    #[serde(default)]
    value: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

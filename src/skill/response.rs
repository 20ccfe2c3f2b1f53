//! Skill Response - 음성/카드 응답과 응답 엔벨로프
//!
//! 엔벨로프 형식은 음성 플랫폼의 응답 JSON을 따릅니다:
//! `version`, `response.outputSpeech`, `response.reprompt`, `response.card`,
//! 세션이 열려 있을 때만 `sessionAttributes`.

use serde::Serialize;
use serde_json::Value;

use crate::knowledge::SessionState;

// ============================================================================
// Types
// ============================================================================

/// 간단 카드 (제목 + 본문)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub content: String,
}

/// 한 턴의 응답
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillResponse {
    pub speech_text: String,
    pub reprompt_text: Option<String>,
    pub card: Option<Card>,
    pub should_end_session: bool,
    /// true면 SSML, false면 PlainText
    pub ssml: bool,
}

impl Default for SkillResponse {
    fn default() -> Self {
        Self {
            speech_text: String::new(),
            reprompt_text: None,
            card: None,
            should_end_session: true,
            ssml: true,
        }
    }
}

impl SkillResponse {
    /// 세션을 닫는 응답
    pub fn tell(speech: impl Into<String>) -> Self {
        Self {
            speech_text: speech.into(),
            ..Default::default()
        }
    }

    /// 세션을 열어두는 응답
    pub fn ask(speech: impl Into<String>) -> Self {
        Self {
            speech_text: speech.into(),
            should_end_session: false,
            ..Default::default()
        }
    }

    pub fn with_reprompt(mut self, reprompt: impl Into<String>) -> Self {
        self.reprompt_text = Some(reprompt.into());
        self
    }

    pub fn with_card(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.card = Some(Card {
            title: title.into(),
            content: content.into(),
        });
        self
    }

    /// 응답 엔벨로프(JSON) 생성
    pub fn to_envelope(&self, session: &SessionState) -> serde_json::Result<Value> {
        let session_attributes = if self.should_end_session {
            None
        } else {
            Some(session.to_attributes()?)
        };

        let envelope = Envelope {
            version: "1.0",
            response: ResponseBody {
                output_speech: OutputSpeech::new(&self.speech_text, self.ssml),
                reprompt: self.reprompt_text.as_deref().map(|text| Reprompt {
                    output_speech: OutputSpeech::new(text, self.ssml),
                }),
                card: self.card.as_ref().map(|card| CardBody {
                    kind: "Simple",
                    title: &card.title,
                    content: &card.content,
                }),
                should_end_session: self.should_end_session,
            },
            session_attributes,
        };

        let value = serde_json::to_value(envelope)?;
        tracing::debug!("Final response:\n{}", serde_json::to_string_pretty(&value)?);
        Ok(value)
    }
}

// ============================================================================
// Envelope (wire format)
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    version: &'static str,
    response: ResponseBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_attributes: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<'a> {
    output_speech: OutputSpeech,
    #[serde(skip_serializing_if = "Option::is_none")]
    reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<CardBody<'a>>,
    should_end_session: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Reprompt {
    output_speech: OutputSpeech,
}

#[derive(Serialize)]
struct CardBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    PlainText { text: String },
}

impl OutputSpeech {
    fn new(text: &str, ssml: bool) -> Self {
        if ssml {
            OutputSpeech::Ssml {
                ssml: format!("<speak>{}</speak>", escape_ssml(text)),
            }
        } else {
            OutputSpeech::PlainText {
                text: text.to_string(),
            }
        }
    }
}

/// SSML 예약 문자 이스케이프
fn escape_ssml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{present_first_page, KnowledgeEntry};
    use serde_json::json;

    #[test]
    fn test_envelope_ssml_with_card_and_reprompt() {
        let response = SkillResponse::ask("Hello")
            .with_reprompt("Say more")
            .with_card("Title", "Body");

        let envelope = response.to_envelope(&SessionState::new()).unwrap();

        assert_eq!(
            envelope,
            json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": { "type": "SSML", "ssml": "<speak>Hello</speak>" },
                    "reprompt": {
                        "outputSpeech": { "type": "SSML", "ssml": "<speak>Say more</speak>" }
                    },
                    "card": { "type": "Simple", "title": "Title", "content": "Body" },
                    "shouldEndSession": false
                },
                "sessionAttributes": {}
            })
        );
    }

    #[test]
    fn test_envelope_plain_text_ends_session() {
        let mut response = SkillResponse::tell("Good Bye. ");
        response.ssml = false;

        let envelope = response.to_envelope(&SessionState::new()).unwrap();

        assert_eq!(
            envelope["response"]["outputSpeech"],
            json!({ "type": "PlainText", "text": "Good Bye. " })
        );
        assert_eq!(envelope["response"]["shouldEndSession"], json!(true));
        assert!(envelope.get("sessionAttributes").is_none());
        assert!(envelope["response"].get("reprompt").is_none());
        assert!(envelope["response"].get("card").is_none());
    }

    #[test]
    fn test_envelope_carries_pending_state() {
        let results = vec![
            KnowledgeEntry::new("stale bread", "a"),
            KnowledgeEntry::new("moldy bread", "b"),
        ];
        let mut session = SessionState::new();
        present_first_page("bread", &results, &mut session);

        let envelope = SkillResponse::ask("x").to_envelope(&session).unwrap();
        assert_eq!(envelope["sessionAttributes"]["Problem"], json!("bread"));
        assert_eq!(envelope["sessionAttributes"]["resultLength"], json!(2));
    }

    #[test]
    fn test_escape_ssml() {
        assert_eq!(escape_ssml("salt & pepper <b>"), "salt &amp; pepper &lt;b&gt;");
    }
}

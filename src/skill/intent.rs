//! Intent 디스패치 - 인텐트 이름 → 핸들러
//!
//! 디스패치 테이블은 `Skill` 생성 시 한 번 만들어지고 이후 읽기 전용입니다.

use std::collections::HashMap;

use crate::knowledge::{present_first_page, present_follow_up, tokenize, FollowUp, SessionState};

use super::profile::SkillProfile;
use super::response::SkillResponse;
use super::Skill;

/// 후속 턴 인텐트 이름
pub const MORE_INFORMATION_INTENT: &str = "GetNextEventIntent";

// ============================================================================
// Intent
// ============================================================================

/// 스킬이 처리하는 인텐트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// 문제에 대한 추천 요청 (슬롯: 문제)
    GetRecommendation,
    /// "more information" 후속 요청
    MoreInformation,
    Help,
    Stop,
    Cancel,
}

impl Intent {
    /// 플랫폼 인텐트 이름 → Intent
    ///
    /// 추천 인텐트 이름은 프로파일마다 다릅니다.
    pub fn from_name(name: &str, profile: &SkillProfile) -> Option<Self> {
        match name {
            MORE_INFORMATION_INTENT => Some(Intent::MoreInformation),
            "AMAZON.HelpIntent" => Some(Intent::Help),
            "AMAZON.StopIntent" => Some(Intent::Stop),
            "AMAZON.CancelIntent" => Some(Intent::Cancel),
            _ if name == profile.recommendation_intent => Some(Intent::GetRecommendation),
            _ => None,
        }
    }
}

/// 인텐트 핸들러
pub type Handler = fn(&Skill, &HashMap<String, String>, &mut SessionState) -> SkillResponse;

/// 인텐트 → 핸들러 테이블
pub struct IntentTable {
    handlers: HashMap<Intent, Handler>,
}

impl IntentTable {
    pub fn new() -> Self {
        let mut handlers: HashMap<Intent, Handler> = HashMap::new();
        handlers.insert(Intent::GetRecommendation, handle_recommendation);
        handlers.insert(Intent::MoreInformation, handle_more_information);
        handlers.insert(Intent::Help, handle_help);
        handlers.insert(Intent::Stop, handle_stop);
        handlers.insert(Intent::Cancel, handle_stop);
        Self { handlers }
    }

    pub fn get(&self, intent: Intent) -> Option<Handler> {
        self.handlers.get(&intent).copied()
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 추천 요청: 검색 → 첫 페이지 → (필요 시) 후속 페이지 저장
fn handle_recommendation(
    skill: &Skill,
    slots: &HashMap<String, String>,
    session: &mut SessionState,
) -> SkillResponse {
    let profile = skill.profile();

    // 정규화 후 토큰이 없으면 (공백/쉼표뿐) 문제를 말하지 않은 것
    let query = match slots.get(&profile.slot_name) {
        Some(q) if !tokenize(q).is_empty() => q,
        _ => {
            return SkillResponse::ask(profile.missing_slot_text.as_str())
                .with_reprompt(profile.missing_slot_reprompt.as_str());
        }
    };

    let results = skill.knowledge().search(query);
    let page = present_first_page(query, &results, session);
    let card_title = format!("{}: {}", profile.card_title, query);

    let Some(primary) = page.primary else {
        let speech = format!(
            "Could not find any {} for {}. I can research this {noun} or you can ask me about another {noun}. ",
            profile.not_found_subject,
            query,
            noun = profile.issue_noun
        );
        return SkillResponse::ask(speech.as_str()).with_card(card_title, speech);
    };

    let another = format!(
        "Would you like help dealing with another {}? Or you can say stop or cancel to end the session.",
        profile.issue_noun
    );
    let mut speech = format!("{} {} {}", profile.recommendation_prefix, primary.text, another);
    let mut card = format!("{} {}\n{}", profile.recommendation_prefix, primary.text, another);

    if !page.overflow_announced {
        return SkillResponse::ask(speech).with_card(card_title, card);
    }

    let more = format!(
        " {} You can say more information for more information. Or say stop or cancel to end the skill. ",
        profile.more_available
    );
    speech.push_str(&more);
    card.push_str(&more);

    SkillResponse::ask(speech)
        .with_reprompt("You can say more information or stop.")
        .with_card(card_title, card)
}

/// 후속 요청: 저장된 페이지의 label 목록을 읽어주고 세션 종료
fn handle_more_information(
    skill: &Skill,
    _slots: &HashMap<String, String>,
    session: &mut SessionState,
) -> SkillResponse {
    let profile = skill.profile();

    match present_follow_up(session) {
        FollowUp::Page {
            entries,
            label,
            count,
        } => {
            let mut speech = format!(
                "There are other ways to deal with this {} {}.",
                profile.issue_noun, count
            );
            let mut card = format!("{}\n", speech);

            for entry in &entries {
                speech.push_str(&format!("{}. ", entry.label));
                card.push_str(&format!("'{}'\n", entry.label));
            }

            SkillResponse::tell(speech)
                .with_card(format!("{}: {}", profile.more_card_title, label), card)
        }
        FollowUp::WrongInvocation => SkillResponse::tell("Wrong invocation of this intent. "),
    }
}

fn handle_help(
    skill: &Skill,
    _slots: &HashMap<String, String>,
    _session: &mut SessionState,
) -> SkillResponse {
    let profile = skill.profile();
    SkillResponse::ask(profile.help_text.as_str()).with_reprompt(profile.help_reprompt.as_str())
}

fn handle_stop(
    _skill: &Skill,
    _slots: &HashMap<String, String>,
    _session: &mut SessionState,
) -> SkillResponse {
    SkillResponse::tell("Good Bye. ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let wlf = SkillProfile::waste_less_food();
        let wfh = SkillProfile::work_from_home();

        assert_eq!(
            Intent::from_name("GetWLFRecommendation", &wlf),
            Some(Intent::GetRecommendation)
        );
        assert_eq!(Intent::from_name("GetWLFRecommendation", &wfh), None);
        assert_eq!(
            Intent::from_name("GetWFHStrategy", &wfh),
            Some(Intent::GetRecommendation)
        );
        assert_eq!(
            Intent::from_name("GetNextEventIntent", &wfh),
            Some(Intent::MoreInformation)
        );
        assert_eq!(Intent::from_name("AMAZON.CancelIntent", &wlf), Some(Intent::Cancel));
        assert_eq!(Intent::from_name("Bogus", &wlf), None);
    }

    #[test]
    fn test_table_covers_every_intent() {
        let table = IntentTable::new();
        for intent in [
            Intent::GetRecommendation,
            Intent::MoreInformation,
            Intent::Help,
            Intent::Stop,
            Intent::Cancel,
        ] {
            assert!(table.get(intent).is_some(), "{:?}", intent);
        }
    }
}

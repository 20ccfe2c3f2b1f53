//! Skill Profile - 스킬별 어휘와 지식 소스
//!
//! 두 코치 스킬은 검색/페이지네이션 로직이 같고 문구만 다릅니다.
//! 프로파일은 그 문구(도메인 어휘)와 지식 소스만 담습니다.
//!
//! 내장 프로파일: `waste-less-food`, `work-from-home`
//! JSON 파일로 새 프로파일을 정의할 수도 있습니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::{EmbeddedSource, JsonFileSource, KnowledgeSource, LoadError};

/// 내장 지식 데이터
const WASTE_LESS_FOOD_DB: &str = include_str!("../../data/waste_less_food.json");
const WORK_FROM_HOME_DB: &str = include_str!("../../data/work_from_home.json");

/// 내장 프로파일 ID 목록
pub const BUILTIN_PROFILES: &[&str] = &["waste-less-food", "work-from-home"];

// ============================================================================
// Errors
// ============================================================================

/// 스킬 구성 에러
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Unknown profile '{0}' (available: waste-less-food, work-from-home)")]
    UnknownProfile(String),

    #[error("Failed to read profile {path:?}: {source}")]
    ProfileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid profile {path:?}: {source}")]
    ProfileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Profile '{0}' has no knowledge source")]
    NoKnowledgeSource(String),

    #[error(transparent)]
    Knowledge(#[from] LoadError),

    #[error("Invalid Application ID")]
    InvalidApplicationId(Option<String>),

    #[error("Malformed request envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Failed to build response envelope: {0}")]
    ResponseEnvelope(#[source] serde_json::Error),
}

// ============================================================================
// SkillProfile
// ============================================================================

/// 스킬 어휘 + 지식 소스
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillProfile {
    /// 프로파일 ID (예: "waste-less-food")
    pub id: String,
    /// 추천 요청 인텐트 이름 (예: "GetWLFRecommendation")
    pub recommendation_intent: String,
    /// 문제를 담는 슬롯 이름 ("Issue" / "Problem")
    pub slot_name: String,
    /// 문제를 부르는 명사 ("issue" / "problem")
    pub issue_noun: String,

    /// 첫 턴 카드 제목 접두어
    pub card_title: String,
    /// 후속 턴 카드 제목 접두어
    pub more_card_title: String,
    /// "Could not find any {not_found_subject} for ..."
    pub not_found_subject: String,
    /// 추천 문구 앞에 붙는 말
    pub recommendation_prefix: String,
    /// 결과가 더 있을 때 붙이는 안내
    pub more_available: String,

    pub launch_text: String,
    pub launch_reprompt: String,
    pub help_text: String,
    pub help_reprompt: String,
    /// 슬롯이 비었을 때
    pub missing_slot_text: String,
    pub missing_slot_reprompt: String,

    /// 허용할 애플리케이션 ID (없으면 검사하지 않음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// 지식 파일 경로 (없으면 내장 데이터)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_path: Option<PathBuf>,

    #[serde(skip)]
    embedded_knowledge: Option<&'static str>,
}

impl SkillProfile {
    /// 내장 프로파일 조회
    pub fn builtin(id: &str) -> Result<Self, SkillError> {
        match id {
            "waste-less-food" => Ok(Self::waste_less_food()),
            "work-from-home" => Ok(Self::work_from_home()),
            other => Err(SkillError::UnknownProfile(other.to_string())),
        }
    }

    /// JSON 파일에서 프로파일 로드
    ///
    /// 상대 경로인 `knowledge_path`는 프로파일 파일 위치 기준으로 해석합니다.
    pub fn from_json_file(path: &Path) -> Result<Self, SkillError> {
        let json = std::fs::read_to_string(path).map_err(|source| SkillError::ProfileIo {
            path: path.to_path_buf(),
            source,
        })?;

        let mut profile: Self =
            serde_json::from_str(&json).map_err(|source| SkillError::ProfileParse {
                path: path.to_path_buf(),
                source,
            })?;

        if let (Some(knowledge), Some(parent)) = (&profile.knowledge_path, path.parent()) {
            if knowledge.is_relative() {
                profile.knowledge_path = Some(parent.join(knowledge));
            }
        }

        tracing::debug!("Loaded profile '{}' from {:?}", profile.id, path);
        Ok(profile)
    }

    /// 지식 파일 경로 덮어쓰기
    pub fn with_knowledge_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.knowledge_path = Some(path.into());
        self
    }

    /// 요청 엔벨로프의 애플리케이션 ID 검사 설정
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// 지식 소스 (파일 경로 우선, 없으면 내장 데이터)
    pub fn knowledge_source(&self) -> Result<Box<dyn KnowledgeSource>, SkillError> {
        if let Some(ref path) = self.knowledge_path {
            return Ok(Box::new(JsonFileSource::new(path.clone())));
        }

        match self.embedded_knowledge {
            Some(json) => Ok(Box::new(EmbeddedSource::new(self.embedded_name(), json))),
            None => Err(SkillError::NoKnowledgeSource(self.id.clone())),
        }
    }

    fn embedded_name(&self) -> &'static str {
        match self.id.as_str() {
            "waste-less-food" => "waste_less_food.json",
            "work-from-home" => "work_from_home.json",
            _ => "inline",
        }
    }

    /// Waste Less Food 코치
    pub fn waste_less_food() -> Self {
        const EXAMPLES: &str = "how closely should I follow expiration dates, or what are some ideas to reduce food waste, or how do I know if food is spoiled, or what are some ideas to use up food?";

        Self {
            id: "waste-less-food".to_string(),
            recommendation_intent: "GetWLFRecommendation".to_string(),
            slot_name: "Issue".to_string(),
            issue_noun: "issue".to_string(),
            card_title: "Waste Less Food recommendation for".to_string(),
            more_card_title: "The Waste Less Food coach more information for".to_string(),
            not_found_subject: "Waste Less Food recommendation".to_string(),
            recommendation_prefix: "Here is a recommendation for dealing with this issue.".to_string(),
            more_available: "There are more recommendations that might help you reduce food waste.".to_string(),
            launch_text: format!(
                "Hi, I am the Waste Less Food coach. With one point three billion tons of food wasted each year, \
                 the annual cost of worldwide food waste has now reached one trillion dollars! \
                 With over ninety percent of food wasted in the United States ending up in landfills, \
                 food waste has become one of the biggest contributors to greenhouse gases. \
                 Are you concerned about the environment? If so, how about doing your part to reduce food waste? \
                 You can ask me to recommend ways to reduce your own food waste when dealing with specific issues. \
                 For example, you can say {}",
                EXAMPLES
            ),
            launch_reprompt: format!("For example, you can say {}", EXAMPLES),
            help_text: format!(
                "If you're concerned about the environment, you can ask the Waste Less Food coach to recommend \
                 ways you can reduce food waste, one of the biggest contributors to greenhouse gases. \
                 For a given issue, the Waste Less Food coach provides you with a recommendation to help you. \
                 For example, you can say {} If the skill hasn't been opened yet, you can also say in one shot, \
                 Alexa, ask Waste Less Food how closely should I follow expiration dates, or Alexa, ask Waste Less Food \
                 how do I know if food is spoiled? What issue would you like help dealing with?",
                EXAMPLES
            ),
            help_reprompt: "What issue would you like help dealing with? or You can say stop to stop the skill.".to_string(),
            missing_slot_text: "Looks like you forgot to mention what your issue is. What would you like help with? ".to_string(),
            missing_slot_reprompt: "For example, you can say, how closely should we follow expiration dates, or what are some ideas to reduce food waste, or how do I know if food is spoiled, or what are some ideas to use up food?".to_string(),
            application_id: None,
            knowledge_path: None,
            embedded_knowledge: Some(WASTE_LESS_FOOD_DB),
        }
    }

    /// Work-from-Home 코치
    pub fn work_from_home() -> Self {
        Self {
            id: "work-from-home".to_string(),
            recommendation_intent: "GetWFHStrategy".to_string(),
            slot_name: "Problem".to_string(),
            issue_noun: "problem".to_string(),
            card_title: "Work-from-Home Strategy recommendation for".to_string(),
            more_card_title: "My Work-from-Home Coach more information for".to_string(),
            not_found_subject: "Work-from-Home Strategy".to_string(),
            recommendation_prefix: "A strategy for dealing with your problem is".to_string(),
            more_available: "There are more strategies that might help.".to_string(),
            launch_text: "Hi, I am your Work-from-Home Coach. I will offer you time-tested strategies to help you \
                          successfully work from home. You can ask me how to deal with a particular problem you are facing. \
                          For example, you can say how can I deal with finishing tasks."
                .to_string(),
            launch_reprompt: "For example, you can say how can I deal with interruptions or how can I deal with finishing tasks?".to_string(),
            help_text: "You can ask My Work-from-Home Coach about dealing with different problems you face when you work from home. \
                        For a given problem, My Work-from-Home Coach provides you with a strategy to help you. \
                        For example, you can say how can I deal with feeling part of the team. \
                        If the skill hasn't been opened yet, you can also say in one shot, \
                        Alexa, ask home office coach how can I deal with feeling part of the team. \
                        What problem would you like help dealing with"
                .to_string(),
            help_reprompt: "What problem would you like help dealing with? or You can say stop to stop the skill.".to_string(),
            missing_slot_text: "Looks like you forgot to mention what your problem is. What would you like help with? ".to_string(),
            missing_slot_reprompt: "For example, you can say, how can I deal with interruptions. ".to_string(),
            application_id: None,
            knowledge_path: None,
            embedded_knowledge: Some(WORK_FROM_HOME_DB),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_load_knowledge() {
        for id in BUILTIN_PROFILES {
            let profile = SkillProfile::builtin(id).unwrap();
            let kb = profile.knowledge_source().unwrap().load().unwrap();
            assert!(!kb.is_empty(), "{}", id);
            assert!(kb.entries().iter().all(|e| e.label == e.label.to_lowercase()));
        }
    }

    #[test]
    fn test_unknown_profile() {
        let err = SkillProfile::builtin("gardening").unwrap_err();
        assert!(matches!(err, SkillError::UnknownProfile(_)));
    }

    #[test]
    fn test_knowledge_path_overrides_embedded() {
        let profile = SkillProfile::work_from_home().with_knowledge_path("/tmp/custom.json");
        let source = profile.knowledge_source().unwrap();
        assert_eq!(source.name(), "file:/tmp/custom.json");
    }

    #[test]
    fn test_profile_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("garden.json"), r#"[["weeds", "pull them"]]"#).unwrap();

        let mut value = serde_json::to_value(SkillProfile::work_from_home()).unwrap();
        value["id"] = "garden".into();
        value["knowledge_path"] = "garden.json".into();
        let profile_path = dir.path().join("profile.json");
        std::fs::write(&profile_path, value.to_string()).unwrap();

        let profile = SkillProfile::from_json_file(&profile_path).unwrap();
        assert_eq!(profile.id, "garden");

        let kb = profile.knowledge_source().unwrap().load().unwrap();
        assert_eq!(kb.entries()[0].label, "weeds");
    }

    #[test]
    fn test_application_id_from_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = serde_json::to_value(SkillProfile::waste_less_food()).unwrap();
        assert!(value.get("application_id").is_none());

        value["application_id"] = "amzn1.ask.skill.garden".into();
        let profile_path = dir.path().join("profile.json");
        std::fs::write(&profile_path, value.to_string()).unwrap();

        let profile = SkillProfile::from_json_file(&profile_path).unwrap();
        assert_eq!(profile.application_id.as_deref(), Some("amzn1.ask.skill.garden"));
    }

    #[test]
    fn test_profile_without_knowledge() {
        let dir = tempfile::tempdir().unwrap();
        let value = serde_json::to_value(SkillProfile::waste_less_food()).unwrap();
        let profile_path = dir.path().join("profile.json");
        std::fs::write(&profile_path, value.to_string()).unwrap();

        let profile = SkillProfile::from_json_file(&profile_path).unwrap();
        assert!(matches!(
            profile.knowledge_source(),
            Err(SkillError::NoKnowledgeSource(_))
        ));
    }
}

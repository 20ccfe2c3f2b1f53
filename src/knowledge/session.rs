//! Session - 대화 세션 상태와 두 턴 페이지네이션
//!
//! 첫 턴에서 최상위 결과 하나를 바로 보여주고, 나머지 한 페이지를
//! 세션 속성에 저장해 두었다가 "more information" 턴에서 꺼냅니다.
//!
//! 세션 속성 키는 트랜스포트가 쓰는 이름을 그대로 사용합니다:
//! `resultLength`, `Problem`, `results`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entry::KnowledgeEntry;

/// 첫 턴에 보여줄 결과 수
pub const MAX_RESPONSES: usize = 1;

/// 두 턴에 걸쳐 다루는 최대 결과 수 (후속 페이지 크기 = 1)
pub const MAX_PROBLEMS: usize = 2;

// ============================================================================
// SessionState
// ============================================================================

/// 세션별 상태 (세션이 독점 소유)
///
/// `pending_entries`가 설정되어 있으면 `pending_label`/`pending_count`도
/// 항상 함께 설정됩니다. 알 수 없는 키는 그대로 보존합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "Problem", default, skip_serializing_if = "Option::is_none")]
    pending_label: Option<String>,

    #[serde(rename = "resultLength", default, skip_serializing_if = "Option::is_none")]
    pending_count: Option<usize>,

    #[serde(rename = "results", default, skip_serializing_if = "Option::is_none")]
    pending_entries: Option<Vec<KnowledgeEntry>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 속성 백(JSON 객체)에서 복원
    pub fn from_attributes(attributes: Value) -> serde_json::Result<Self> {
        if attributes.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(attributes)
    }

    /// 속성 백(JSON 객체)으로 변환
    pub fn to_attributes(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// 후속 페이지 대기 중인지
    pub fn is_awaiting_follow_up(&self) -> bool {
        self.pending_entries.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn pending_label(&self) -> Option<&str> {
        self.pending_label.as_deref()
    }

    pub fn pending_count(&self) -> Option<usize> {
        self.pending_count
    }

    pub fn pending_entries(&self) -> Option<&[KnowledgeEntry]> {
        self.pending_entries.as_deref()
    }

    fn set_pending(&mut self, label: &str, count: usize, entries: Vec<KnowledgeEntry>) {
        self.pending_label = Some(label.to_string());
        self.pending_count = Some(count);
        self.pending_entries = Some(entries);
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// 첫 턴 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstPage {
    /// 최상위 결과 (없으면 "찾을 수 없음")
    pub primary: Option<KnowledgeEntry>,
    /// 후속 페이지가 세션에 저장되었는지
    pub overflow_announced: bool,
}

/// 후속 턴 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Page {
        entries: Vec<KnowledgeEntry>,
        label: String,
        count: usize,
    },
    /// 저장된 페이지 없이 후속 요청이 들어옴
    WrongInvocation,
}

/// 첫 턴: 최상위 결과를 돌려주고, 나머지가 있으면 다음 페이지를 세션에 저장
///
/// 결과가 0개 또는 1개면 세션을 건드리지 않습니다.
pub fn present_first_page(
    query_label: &str,
    results: &[KnowledgeEntry],
    session: &mut SessionState,
) -> FirstPage {
    let Some(primary) = results.first() else {
        tracing::debug!("No match found for {:?}", query_label);
        return FirstPage {
            primary: None,
            overflow_announced: false,
        };
    };

    let overflow_announced = results.len() > MAX_RESPONSES;
    if overflow_announced {
        let end = results.len().min(MAX_PROBLEMS);
        session.set_pending(query_label, results.len(), results[MAX_RESPONSES..end].to_vec());
        tracing::debug!(
            "Stored follow-up page for {:?} ({} results)",
            query_label,
            results.len()
        );
    }

    FirstPage {
        primary: Some(primary.clone()),
        overflow_announced,
    }
}

/// 후속 턴: 저장된 페이지를 꺼내고 대기 상태를 비움
///
/// 한 번 꺼낸 페이지는 다시 나오지 않습니다. 두 번째 요청은
/// `WrongInvocation`입니다.
pub fn present_follow_up(session: &mut SessionState) -> FollowUp {
    if !session.is_awaiting_follow_up() {
        return FollowUp::WrongInvocation;
    }

    let entries = session.pending_entries.take().unwrap_or_default();
    let label = session.pending_label.take().unwrap_or_default();
    let count = session.pending_count.take().unwrap_or(entries.len());

    FollowUp::Page {
        entries,
        label,
        count,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(n: usize) -> Vec<KnowledgeEntry> {
        (0..n)
            .map(|i| KnowledgeEntry::new(format!("label {}", i), format!("text {}", i)))
            .collect()
    }

    #[test]
    fn test_first_page_three_results() {
        let results = results(3);
        let mut session = SessionState::new();

        let page = present_first_page("eggs", &results, &mut session);

        assert_eq!(page.primary, Some(results[0].clone()));
        assert!(page.overflow_announced);
        assert_eq!(session.pending_entries(), Some(&results[1..2]));
        assert_eq!(session.pending_count(), Some(3));
        assert_eq!(session.pending_label(), Some("eggs"));
    }

    #[test]
    fn test_first_page_single_result() {
        let results = results(1);
        let mut session = SessionState::new();

        let page = present_first_page("eggs", &results, &mut session);

        assert_eq!(page.primary, Some(results[0].clone()));
        assert!(!page.overflow_announced);
        assert_eq!(session, SessionState::new());
    }

    #[test]
    fn test_first_page_no_results() {
        let mut session = SessionState::new();
        let page = present_first_page("zucchini", &[], &mut session);

        assert!(page.primary.is_none());
        assert!(!page.overflow_announced);
        assert_eq!(session, SessionState::new());
    }

    #[test]
    fn test_new_query_overwrites_pending() {
        let mut session = SessionState::new();
        present_first_page("first", &results(2), &mut session);
        present_first_page("second", &results(4), &mut session);

        assert_eq!(session.pending_label(), Some("second"));
        assert_eq!(session.pending_count(), Some(4));
    }

    #[test]
    fn test_follow_up_without_pending() {
        let mut session = SessionState::new();
        assert_eq!(present_follow_up(&mut session), FollowUp::WrongInvocation);
    }

    #[test]
    fn test_follow_up_consumes_pending() {
        let results = results(3);
        let mut session = SessionState::new();
        present_first_page("eggs", &results, &mut session);

        let follow_up = present_follow_up(&mut session);
        assert_eq!(
            follow_up,
            FollowUp::Page {
                entries: vec![results[1].clone()],
                label: "eggs".to_string(),
                count: 3,
            }
        );

        assert!(!session.is_awaiting_follow_up());
        assert_eq!(present_follow_up(&mut session), FollowUp::WrongInvocation);
    }

    #[test]
    fn test_attributes_use_transport_keys() {
        let mut session = SessionState::new();
        present_first_page("stale bread", &results(2), &mut session);

        let attributes = session.to_attributes().unwrap();
        assert_eq!(attributes["Problem"], json!("stale bread"));
        assert_eq!(attributes["resultLength"], json!(2));
        assert_eq!(attributes["results"], json!([["label 1", "text 1"]]));
    }

    #[test]
    fn test_attributes_roundtrip_keeps_unknown_keys() {
        let attributes = json!({
            "Problem": "eggs",
            "resultLength": 5,
            "results": [["expired eggs", "float test"]],
            "visits": 3
        });

        let session = SessionState::from_attributes(attributes.clone()).unwrap();
        assert!(session.is_awaiting_follow_up());
        assert_eq!(session.to_attributes().unwrap(), attributes);
    }

    #[test]
    fn test_empty_attributes() {
        let session = SessionState::from_attributes(Value::Null).unwrap();
        assert!(!session.is_awaiting_follow_up());

        let session = SessionState::from_attributes(json!({})).unwrap();
        assert_eq!(session.to_attributes().unwrap(), json!({}));
    }
}

//! Knowledge Base - 불변 (label, text) 엔트리 목록
//!
//! 지식 소스는 `[[label, text], ...]` 형태의 JSON 배열입니다.
//! 프로세스 시작 시 한 번 로드되며, 런타임에 변경되지 않습니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matcher::{self, ScoredCandidate};

// ============================================================================
// Types
// ============================================================================

/// 지식베이스 엔트리
///
/// `label`은 검색 키(소문자로 정규화된 상태로 저장), `text`는 사용자에게
/// 돌려줄 추천 문구입니다. 직렬화 시 `[label, text]` 2-요소 배열이 됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct KnowledgeEntry {
    pub label: String,
    pub text: String,
}

impl KnowledgeEntry {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl From<(String, String)> for KnowledgeEntry {
    fn from((label, text): (String, String)) -> Self {
        Self { label, text }
    }
}

impl From<KnowledgeEntry> for (String, String) {
    fn from(entry: KnowledgeEntry) -> Self {
        (entry.label, entry.text)
    }
}

/// 지식 소스 로드 에러 (치명적, 재시도 없음)
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read knowledge source {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed knowledge source '{source_name}': {reason}")]
    Malformed { source_name: String, reason: String },
}

// ============================================================================
// KnowledgeBase
// ============================================================================

/// 순서가 보존되는 불변 지식베이스
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// JSON 텍스트에서 파싱
    ///
    /// 최상위가 배열이 아니거나, 레코드가 문자열 2개짜리 배열이 아니면
    /// `LoadError::Malformed`를 반환합니다. 에러 메시지에 위치(line/column)가 담깁니다.
    pub fn from_json_str(source_name: &str, json: &str) -> Result<Self, LoadError> {
        let entries: Vec<KnowledgeEntry> =
            serde_json::from_str(json).map_err(|e| LoadError::Malformed {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 쿼리로 검색 (최적 매치 우선)
    pub fn search(&self, query: &str) -> Vec<KnowledgeEntry> {
        matcher::search(&self.entries, query)
    }

    /// 가중치 포함 검색 (진단용)
    pub fn search_scored(&self, query: &str) -> Vec<ScoredCandidate> {
        matcher::search_scored(&self.entries, query)
    }
}

// ============================================================================
// KnowledgeSource Trait
// ============================================================================

/// 지식 소스 트레이트
///
/// 스킬 프로파일은 어떤 소스에서 지식베이스를 가져올지만 알면 됩니다.
pub trait KnowledgeSource: Send + Sync {
    /// 지식베이스 로드
    fn load(&self) -> Result<KnowledgeBase, LoadError>;

    /// 소스 이름 (로그/상태 출력용)
    fn name(&self) -> String;
}

/// 바이너리에 포함된 JSON 지식 소스
#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    name: &'static str,
    json: &'static str,
}

impl EmbeddedSource {
    pub const fn new(name: &'static str, json: &'static str) -> Self {
        Self { name, json }
    }
}

impl KnowledgeSource for EmbeddedSource {
    fn load(&self) -> Result<KnowledgeBase, LoadError> {
        let kb = KnowledgeBase::from_json_str(self.name, self.json)?;
        tracing::info!("Loaded {} entries from embedded source '{}'", kb.len(), self.name);
        Ok(kb)
    }

    fn name(&self) -> String {
        format!("embedded:{}", self.name)
    }
}

/// 디스크의 JSON 파일 지식 소스
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeSource for JsonFileSource {
    fn load(&self) -> Result<KnowledgeBase, LoadError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let kb = KnowledgeBase::from_json_str(&self.path.display().to_string(), &json)?;
        tracing::info!("Loaded {} entries from {:?}", kb.len(), self.path);
        Ok(kb)
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

// ============================================================================
// Tests
// ============================================================================

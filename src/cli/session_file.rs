//! 세션 파일 - CLI에서 대화 세션을 턴 사이에 유지
//!
//! 음성 플랫폼이 `sessionAttributes`를 다음 요청에 돌려주는 것처럼,
//! CLI는 세션이 열려 있는 동안 속성 백을 JSON 파일에 보관합니다.
//! 세션이 끝나는 응답이면 파일을 지웁니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::knowledge::SessionState;

/// 데이터 디렉토리 경로
///
/// 로컬 데이터 디렉토리(Linux: `~/.local/share`) 아래 `.problem-coach/`,
/// 없으면 홈 디렉토리, 그것도 없으면 현재 디렉토리 기준입니다.
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".problem-coach")
}

/// 기본 세션 파일 경로
pub fn default_session_path() -> PathBuf {
    get_data_dir().join("session.json")
}

/// 디스크에 보관되는 세션
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub session_id: Uuid,
    /// 세션을 연 프로파일 ID (다른 프로파일이면 새 세션)
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: SessionState,
}

impl SessionFile {
    pub fn new(profile: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            profile: profile.to_string(),
            started_at: now,
            updated_at: now,
            attributes: SessionState::new(),
        }
    }

    /// 기존 세션 로드, 없거나 프로파일이 다르면 새 세션
    ///
    /// # Returns
    /// (세션, 새 세션 여부)
    pub fn load_or_new(path: &Path, profile: &str) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::new(profile), true));
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {:?}", path))?;
        let session: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid session file: {:?}", path))?;

        if session.profile != profile {
            tracing::debug!(
                "Session {} belongs to profile '{}', starting new session",
                session.session_id,
                session.profile
            );
            return Ok((Self::new(profile), true));
        }

        Ok((session, false))
    }

    /// 세션 저장 (부모 디렉토리 생성)
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create session directory")?;
            }
        }

        self.updated_at = Utc::now();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize session")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write session file: {:?}", path))?;

        tracing::debug!("Saved session {} to {:?}", self.session_id, path);
        Ok(())
    }

    /// 세션 파일 삭제 (없으면 무시)
    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove session file: {:?}", path))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

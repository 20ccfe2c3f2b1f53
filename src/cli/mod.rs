//! CLI 모듈
//!
//! problem-coach CLI 명령어 정의 및 구현
//!
//! 한 번의 실행이 대화의 한 턴입니다. 세션이 열려 있는 동안
//! 세션 속성은 세션 파일에 유지됩니다.

mod session_file;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use crate::skill::{Skill, SkillProfile, SkillRequest, SkillResponse};

pub use session_file::{default_session_path, get_data_dir, SessionFile};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "problem-coach")]
#[command(version, about = "음성 코치 스킬 문제 검색 엔진", long_about = None)]
pub struct Cli {
    /// 내장 프로파일 (waste-less-food, work-from-home)
    #[arg(short, long, global = true, env = "COACH_PROFILE", default_value = "waste-less-food")]
    pub profile: String,

    /// 프로파일 JSON 파일 (지정 시 --profile 무시)
    #[arg(long, global = true)]
    pub profile_file: Option<PathBuf>,

    /// 지식 JSON 파일 ([[label, text], ...])
    #[arg(short, long, global = true, env = "COACH_KNOWLEDGE_PATH")]
    pub knowledge: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 문제에 대한 추천 요청 (첫 턴)
    Ask {
        /// 문제 (예: "stale bread")
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// 세션 파일 경로
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// 응답 엔벨로프를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 추가 정보 요청 (후속 턴)
    More {
        /// 세션 파일 경로
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// 응답 엔벨로프를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 가중치 포함 검색 결과 (세션 없음)
    Search {
        /// 검색 쿼리
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// 결과 개수 제한
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// 지식베이스 label 목록
    List {
        /// 결과 개수 제한
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// 시작 안내 문구
    Launch,

    /// 도움말 문구
    Guide,

    /// 요청 엔벨로프(JSON) 처리 후 응답 엔벨로프 출력
    Handle {
        /// 요청 JSON 파일 (없으면 표준 입력)
        input: Option<PathBuf>,
    },

    /// 상태 확인
    Status {
        /// 세션 파일 경로
        #[arg(short, long)]
        session: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub fn run(cli: Cli) -> Result<()> {
    let skill = load_skill(&cli)?;

    match cli.command {
        Commands::Ask {
            query,
            session,
            json,
        } => {
            let request = skill.recommendation_request(query.join(" "));
            cmd_turn(&skill, request, session, json)
        }
        Commands::More { session, json } => {
            let request = skill.more_information_request();
            cmd_turn(&skill, request, session, json)
        }
        Commands::Search { query, limit } => cmd_search(&skill, &query.join(" "), limit),
        Commands::List { limit } => cmd_list(&skill, limit),
        Commands::Launch => cmd_turn(&skill, SkillRequest::Launch, None, false),
        Commands::Guide => {
            let request = SkillRequest::intent("AMAZON.HelpIntent");
            cmd_turn(&skill, request, None, false)
        }
        Commands::Handle { input } => cmd_handle(&skill, input),
        Commands::Status { session } => cmd_status(&skill, session),
    }
}

/// 프로파일 결정 + 지식베이스 로드 (실패 시 종료)
fn load_skill(cli: &Cli) -> Result<Skill> {
    let profile = match cli.profile_file {
        Some(ref path) => SkillProfile::from_json_file(path).context("프로파일 로드 실패")?,
        None => SkillProfile::builtin(&cli.profile)?,
    };

    let profile = match cli.knowledge {
        Some(ref path) => profile.with_knowledge_path(path),
        None => profile,
    };

    Skill::new(profile).context("지식베이스 로드 실패")
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 대화 한 턴 실행 (ask / more / launch / guide)
///
/// 세션이 열린 채 끝나면 세션 파일에 저장하고, 닫히면 삭제합니다.
fn cmd_turn(
    skill: &Skill,
    request: SkillRequest,
    session_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let session_path = session_path.unwrap_or_else(default_session_path);

    // Launch는 항상 새 세션 (이전 대기 상태 폐기)
    let (mut session, is_new) = if matches!(request, SkillRequest::Launch) {
        (SessionFile::new(&skill.profile().id), true)
    } else {
        SessionFile::load_or_new(&session_path, &skill.profile().id)?
    };

    if is_new {
        tracing::debug!("onSessionStarted sessionId={}", session.session_id);
    }

    let response = skill
        .handle(&request, &mut session.attributes)
        .ok_or_else(|| anyhow!("요청에 대한 응답이 없습니다"))?;

    if json {
        let envelope = response
            .to_envelope(&session.attributes)
            .context("응답 엔벨로프 생성 실패")?;
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print_response(&response);
    }

    if response.should_end_session {
        SessionFile::remove(&session_path)?;
    } else {
        session.save(&session_path)?;
    }

    Ok(())
}

/// 엔벨로프 명령어 (handle)
///
/// 세션 속성은 요청 엔벨로프가 가져오므로 세션 파일을 쓰지 않습니다.
fn cmd_handle(skill: &Skill, input: Option<PathBuf>) -> Result<()> {
    let raw = match input {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("요청 파일 읽기 실패: {:?}", path))?,
        None => std::io::read_to_string(std::io::stdin()).context("표준 입력 읽기 실패")?,
    };

    if let Some(envelope) = handle_envelope_text(skill, &raw)? {
        println!("{}", envelope);
    }

    Ok(())
}

/// 요청 JSON 텍스트 → 응답 JSON 텍스트 (세션 종료 요청이면 None)
fn handle_envelope_text(skill: &Skill, raw: &str) -> Result<Option<String>> {
    let request: serde_json::Value =
        serde_json::from_str(raw).context("요청 엔벨로프가 JSON이 아닙니다")?;

    match skill.handle_envelope(&request)? {
        Some(response) => Ok(Some(serde_json::to_string_pretty(&response)?)),
        None => Ok(None),
    }
}

/// 검색 명령어 (search)
///
/// 랭킹 순서와 가중치를 그대로 보여줍니다.
fn cmd_search(skill: &Skill, query: &str, limit: usize) -> Result<()> {
    println!("[*] 검색 중: \"{}\"", query);

    let results = skill.knowledge().search_scored(query);

    if results.is_empty() {
        println!("\n[!] 검색 결과가 없습니다.");
        return Ok(());
    }

    println!("\n[OK] 검색 결과 ({} 건):\n", results.len());

    for (i, candidate) in results.iter().take(limit).enumerate() {
        println!(
            "{}. [가중치: {:>3}] {}",
            i + 1,
            candidate.weight,
            candidate.entry.label
        );
        println!("   내용: {}", truncate_text(&candidate.entry.text, 200));
        println!();
    }

    Ok(())
}

/// 목록 명령어 (list)
fn cmd_list(skill: &Skill, limit: usize) -> Result<()> {
    let entries = skill.knowledge().entries();

    if entries.is_empty() {
        println!("[!] 지식베이스가 비어 있습니다.");
        return Ok(());
    }

    println!("[OK] 지식베이스 ({} 건):\n", entries.len());

    for (i, entry) in entries.iter().take(limit).enumerate() {
        println!("  #{:<4} {}", i + 1, entry.label);
    }

    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status(skill: &Skill, session_path: Option<PathBuf>) -> Result<()> {
    println!("problem-coach v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let profile = skill.profile();
    println!("[*] 프로파일: {}", profile.id);

    match profile.knowledge_source() {
        Ok(source) => println!("[*] 지식 소스: {}", source.name()),
        Err(e) => println!("[!] 지식 소스: {}", e),
    }
    println!("[OK] 지식 엔트리: {} 건", skill.knowledge().len());

    println!("[*] 데이터 디렉토리: {}", get_data_dir().display());

    let session_path = session_path.unwrap_or_else(default_session_path);
    match SessionFile::load_or_new(&session_path, &profile.id) {
        Ok((_, true)) => println!("[*] 세션: 없음"),
        Ok((session, false)) => {
            println!("[OK] 세션: {}", session.session_id);
            println!(
                "     시작: {}",
                session.started_at.format("%Y-%m-%d %H:%M")
            );
            match session.attributes.pending_label() {
                Some(label) if session.attributes.is_awaiting_follow_up() => {
                    println!("     추가 정보 대기 중: {}", label)
                }
                _ => println!("     추가 정보 대기 없음"),
            }
        }
        Err(e) => println!("[!] 세션 파일 읽기 실패: {}", e),
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 응답 출력 (음성 + 카드)
fn print_response(response: &SkillResponse) {
    println!("{}", response.speech_text.trim_end());

    if let Some(ref card) = response.card {
        println!();
        println!("[카드] {}", card.title);
        for line in card.content.lines() {
            println!("   {}", line);
        }
    }

    if !response.should_end_session {
        println!();
        match response.reprompt_text {
            Some(ref reprompt) => println!("[*] {}", reprompt),
            None => println!("[*] 세션이 열려 있습니다"),
        }
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! CLI 모듈
//!
//! itmo-qa CLI 명령어 정의 및 구현

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::agent::{ItmoAgent, Question};
use crate::config::{self, AppConfig};
use crate::logging;
use crate::server;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "itmo-qa")]
#[command(version, about = "ИТМО 질의응답 에이전트 (GigaChat + Tavily)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTP API 서버 실행
    Serve {
        /// 바인드 호스트 (기본: HOST 또는 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// 바인드 포트 (기본: PORT 또는 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// 질문 한 건 처리
    Ask {
        /// 질문 텍스트 ("-"이면 stdin에서 읽음)
        query: String,

        /// 요청 ID
        #[arg(long, default_value = "1")]
        id: i64,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 설정 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => cmd_serve(host, port).await,
        Commands::Ask { query, id, json } => {
            logging::init_console();
            cmd_ask(&query, id, json).await
        }
        Commands::Status => {
            logging::init_console();
            cmd_status()
        }
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 서버 명령어 (serve)
async fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = AppConfig::from_env().context("설정 로드 실패")?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let _guard = logging::init_with_file(&config.server.log_dir)?;

    let addr = config.server.bind_addr()?;
    let agent = ItmoAgent::from_config(&config).context("에이전트 초기화 실패")?;

    server::serve(Arc::new(agent), addr).await
}

/// 질문 명령어 (ask)
async fn cmd_ask(query: &str, id: i64, json: bool) -> Result<()> {
    let query = if query == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("stdin 읽기 실패")?;
        buf
    } else {
        query.to_string()
    };

    if query.trim().is_empty() {
        bail!("질문이 비어 있습니다");
    }

    let config = AppConfig::from_env().context("설정 로드 실패")?;
    let agent = ItmoAgent::from_config(&config).context("에이전트 초기화 실패")?;

    let answer = agent
        .invoke(Question::new(id, query))
        .await
        .context("질문 처리 실패")?;

    if json {
        let response = server::PredictionResponse::from(answer);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("[OK] 요청 #{}", answer.id);
    match answer.answer {
        Some(n) => println!("   답: {}", n),
        None => println!("   답: -"),
    }
    if !answer.reasoning.is_empty() {
        println!("   근거: {}", truncate_text(&answer.reasoning, 300));
    }
    for (i, source) in answer.sources.iter().enumerate() {
        println!("   출처 {}: {}", i + 1, source);
    }

    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status() -> Result<()> {
    config::load_dotenv();

    println!("itmo-qa v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if config::has_gigachat_credentials() {
        println!("[OK] GigaChat 키: 설정됨");
    } else {
        println!("[!] GigaChat 키: 미설정");
        println!("    설정: export GIGACHAT_CREDENTIALS=your-key");
    }

    if config::has_tavily_api_key() {
        println!("[OK] Tavily 키: 설정됨");
    } else {
        println!("[!] Tavily 키: 미설정");
        println!("    설정: export TAVILY_API_KEY=your-key");
    }

    match AppConfig::from_env() {
        Ok(config) => {
            println!("[*] GigaChat 모델: {}", config.gigachat.model);
            println!("[*] 검색 도메인: {}", config.search_domain);
            println!("[*] 호출 타임아웃: {}s", config.call_timeout.as_secs());
            println!("[*] 서버 주소: {}:{}", config.server.host, config.server.port);
            println!("[*] 로그 파일: {}", config.server.log_dir.join(logging::LOG_FILE_NAME).display());
        }
        Err(e) => {
            tracing::debug!("설정 로드 실패: {:#}", e);
            let server = config::server_config_from_env()?;
            println!("[*] 서버 주소: {}:{}", server.host, server.port);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_truncate_cyrillic() {
        assert_eq!(truncate_text("Университет ИТМО", 11), "Университет...");
    }

    #[test]
    fn test_parse_ask_command() {
        let cli = Cli::try_parse_from(["itmo-qa", "ask", "Когда основан ИТМО?", "--id", "7", "--json"]).unwrap();
        match cli.command {
            Commands::Ask { query, id, json } => {
                assert_eq!(query, "Когда основан ИТМО?");
                assert_eq!(id, 7);
                assert!(json);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["itmo-qa", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }
}

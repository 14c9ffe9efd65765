//! 설정 모듈 - 환경변수 기반 구성
//!
//! `.env` 파일이 있으면 먼저 로드한 뒤(`dotenvy`) 프로세스 환경변수를 읽습니다.
//!
//! 필수:
//! - `GIGACHAT_CREDENTIALS` (또는 `GIGACHAT_CLIENT_ID` + `GIGACHAT_CLIENT_SECRET`)
//! - `TAVILY_API_KEY`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

// ============================================================================
// Defaults
// ============================================================================

/// GigaChat OAuth 엔드포인트
pub const DEFAULT_GIGACHAT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
/// GigaChat REST API 베이스 URL
pub const DEFAULT_GIGACHAT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
/// 개인용 API 스코프
pub const DEFAULT_GIGACHAT_SCOPE: &str = "GIGACHAT_API_PERS";
pub const DEFAULT_GIGACHAT_MODEL: &str = "GigaChat";

/// Tavily 검색 API 베이스 URL
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
/// 검색 대상 도메인
pub const DEFAULT_SEARCH_DOMAIN: &str = "itmo.ru";

/// 외부 호출당 타임아웃 (초)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_DIR: &str = "logs";

// ============================================================================
// Config Types
// ============================================================================

/// GigaChat 연결 설정
#[derive(Clone)]
pub struct GigaChatConfig {
    /// Base64 인코딩된 authorization key (`client_id:client_secret`)
    pub credentials: String,
    pub scope: String,
    pub model: String,
    pub auth_url: String,
    pub base_url: String,
    /// false면 인증서 검증 생략 (Sber 인증서가 기본 루트에 없음)
    pub verify_ssl_certs: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for GigaChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigaChatConfig")
            .field("credentials", &"<redacted>")
            .field("scope", &self.scope)
            .field("model", &self.model)
            .field("auth_url", &self.auth_url)
            .field("base_url", &self.base_url)
            .field("verify_ssl_certs", &self.verify_ssl_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Tavily 검색 설정
#[derive(Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// 서버 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
}

impl ServerConfig {
    /// 바인드 주소
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address: {}:{}", self.host, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// 전체 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gigachat: GigaChatConfig,
    pub tavily: TavilyConfig,
    /// 검색을 제한할 단일 도메인
    pub search_domain: String,
    /// 외부 호출당 타임아웃
    pub call_timeout: Duration,
    pub server: ServerConfig,
}

impl AppConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        let call_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);

        let gigachat = GigaChatConfig {
            credentials: get_gigachat_credentials()?,
            scope: env_or("GIGACHAT_SCOPE", DEFAULT_GIGACHAT_SCOPE),
            model: env_or("GIGACHAT_MODEL", DEFAULT_GIGACHAT_MODEL),
            auth_url: env_or("GIGACHAT_AUTH_URL", DEFAULT_GIGACHAT_AUTH_URL),
            base_url: env_or("GIGACHAT_BASE_URL", DEFAULT_GIGACHAT_BASE_URL),
            verify_ssl_certs: parse_bool_env("GIGACHAT_VERIFY_SSL_CERTS", false)?,
            timeout: call_timeout,
        };

        let tavily = TavilyConfig {
            api_key: get_tavily_api_key()?,
            base_url: env_or("TAVILY_BASE_URL", DEFAULT_TAVILY_BASE_URL),
            timeout: call_timeout,
        };

        Ok(Self {
            gigachat,
            tavily,
            search_domain: env_or("SEARCH_DOMAIN", DEFAULT_SEARCH_DOMAIN),
            call_timeout,
            server: server_config_from_env()?,
        })
    }
}

/// 서버 설정만 로드 (API 키 불필요)
pub fn server_config_from_env() -> Result<ServerConfig> {
    load_dotenv();

    Ok(ServerConfig {
        host: env_or("HOST", DEFAULT_HOST),
        port: parse_env("PORT", DEFAULT_PORT)?,
        log_dir: PathBuf::from(env_or("LOG_DIR", DEFAULT_LOG_DIR)),
    })
}

// ============================================================================
// API Key Management
// ============================================================================

/// GigaChat authorization key 로드
///
/// 우선순위:
/// 1. `GIGACHAT_CREDENTIALS` (이미 Base64 인코딩된 키)
/// 2. `GIGACHAT_CLIENT_ID` + `GIGACHAT_CLIENT_SECRET` (여기서 인코딩)
pub fn get_gigachat_credentials() -> Result<String> {
    if let Some(credentials) = env_var("GIGACHAT_CREDENTIALS") {
        tracing::debug!("Using GigaChat key from GIGACHAT_CREDENTIALS");
        return Ok(credentials);
    }

    if let (Some(id), Some(secret)) = (env_var("GIGACHAT_CLIENT_ID"), env_var("GIGACHAT_CLIENT_SECRET")) {
        tracing::debug!("Using GigaChat key from GIGACHAT_CLIENT_ID/GIGACHAT_CLIENT_SECRET");
        return Ok(encode_credentials(&id, &secret));
    }

    anyhow::bail!(
        "GigaChat credentials not found. Set GIGACHAT_CREDENTIALS \
         (or GIGACHAT_CLIENT_ID and GIGACHAT_CLIENT_SECRET).\n\
         Get your key at: https://developers.sber.ru/studio"
    )
}

/// Tavily API 키 로드
pub fn get_tavily_api_key() -> Result<String> {
    env_var("TAVILY_API_KEY").ok_or_else(|| {
        anyhow::anyhow!(
            "TAVILY_API_KEY not set.\n\
             Get your API key at: https://app.tavily.com"
        )
    })
}

/// GigaChat 키 존재 여부
pub fn has_gigachat_credentials() -> bool {
    get_gigachat_credentials().is_ok()
}

/// Tavily 키 존재 여부
pub fn has_tavily_api_key() -> bool {
    env_var("TAVILY_API_KEY").is_some()
}

/// `client_id:client_secret` → Base64
pub fn encode_credentials(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{}:{}", client_id, client_secret))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// `.env` 파일 로드 (없으면 무시)
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
}

/// 비어있지 않은 환경변수 값
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", name, raw, e)),
        None => Ok(default),
    }
}

/// `true`/`false`/`1`/`0` (대소문자 무시)
fn parse_bool_env(name: &str, default: bool) -> Result<bool> {
    match env_var(name).map(|v| v.to_ascii_lowercase()) {
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => anyhow::bail!("Invalid value for {}: {} (expected true/false)", name, v),
        None => Ok(default),
    }
}

// ============================================================================
// Tests
// ============================================================================

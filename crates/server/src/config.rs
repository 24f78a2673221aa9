use std::env;
use std::path::PathBuf;
use std::time::Duration;

use worksheet::LayoutConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub lichess: LichessConfig,
    pub sources: SourceConfig,
    pub page_size: PageSize,
    pub highlight_setup_move: bool,
}

#[derive(Clone, Debug)]
pub struct LichessConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub user_agent: String,
    pub activity_timeout: Duration,
    pub daily_timeout: Duration,
    pub probe_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_max_scanned: usize,
    pub activity_batch_per_puzzle: usize,
    pub probe_attempts_per_puzzle: usize,
    pub curated_repeat_to_fill: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSize {
    Letter,
    A4,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            lichess: LichessConfig::default(),
            sources: SourceConfig::default(),
            page_size: PageSize::Letter,
            highlight_setup_move: false,
        }
    }
}

impl Default for LichessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lichess.org".to_string(),
            api_token: None,
            user_agent: "PuzzleWorksheet/1.0".to_string(),
            activity_timeout: Duration::from_secs(30),
            daily_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_millis(5000),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            snapshot_max_scanned: 100_000,
            activity_batch_per_puzzle: 10,
            probe_attempts_per_puzzle: 50,
            curated_repeat_to_fill: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let lichess = LichessConfig {
            base_url: env::var("LICHESS_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://lichess.org".to_string()),
            api_token: env::var("LICHESS_API_TOKEN").ok().filter(|v| !v.is_empty()),
            user_agent: env::var("LICHESS_USER_AGENT")
                .unwrap_or_else(|_| "PuzzleWorksheet/1.0".to_string()),
            activity_timeout: Duration::from_secs(parsed("ACTIVITY_TIMEOUT_SECS", 30)),
            daily_timeout: Duration::from_secs(parsed("DAILY_TIMEOUT_SECS", 10)),
            probe_timeout: Duration::from_millis(parsed("PROBE_TIMEOUT_MS", 5000)),
        };

        let sources = SourceConfig {
            snapshot_path: env::var("PUZZLE_SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            snapshot_max_scanned: parsed("SNAPSHOT_MAX_SCANNED", 100_000),
            activity_batch_per_puzzle: parsed("ACTIVITY_BATCH_PER_PUZZLE", 10),
            probe_attempts_per_puzzle: parsed("PROBE_ATTEMPTS_PER_PUZZLE", 50),
            curated_repeat_to_fill: flag("CURATED_REPEAT_TO_FILL"),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 5000),
            lichess,
            sources,
            page_size: match env::var("WORKSHEET_PAGE_SIZE").as_deref() {
                Ok(v) if v.eq_ignore_ascii_case("a4") => PageSize::A4,
                _ => PageSize::Letter,
            },
            highlight_setup_move: flag("WORKSHEET_HIGHLIGHT_SETUP_MOVE"),
        }
    }

    pub fn layout(&self) -> LayoutConfig {
        let base = match self.page_size {
            PageSize::Letter => LayoutConfig::letter(),
            PageSize::A4 => LayoutConfig::a4(),
        };
        LayoutConfig {
            highlight_setup_move: self.highlight_setup_move,
            ..base
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::analysis::weapons::WeaponThresholds;

pub const DEFAULT_STATS_BASE_URL: &str = "https://api.pubg.com/shards";
pub const DEFAULT_PLATFORM: &str = "steam";

/// Credentials and model names for the text-generation providers.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bearer credential for the stats API.
    pub pubg_api_key: Option<String>,
    /// Base URL of the stats API, without the shard segment.
    pub stats_base_url: String,
    /// Shard used when a request does not name one.
    pub default_platform: String,
    /// Maximum number of recent matches taken from a player's history.
    pub match_history_limit: usize,
    pub llm: LlmConfig,
    pub weapon_thresholds: WeaponThresholds,
    /// Directory of static assets served under `/static`.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            pubg_api_key: None,
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            default_platform: DEFAULT_PLATFORM.to_string(),
            match_history_limit: 20,
            llm: LlmConfig {
                gemini_api_key: None,
                gemini_model: "gemini-1.5-flash".to_string(),
                openai_api_key: None,
                openai_model: "gpt-3.5-turbo".to_string(),
            },
            weapon_thresholds: WeaponThresholds::default(),
            static_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a `.env` file, environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `PUBG_API_KEY` - stats API bearer token
    /// - `PUBG_API_BASE_URL` - stats API base URL (default: `https://api.pubg.com/shards`)
    /// - `DEFAULT_PLATFORM` - shard used when none is given (default: `steam`)
    /// - `MATCH_HISTORY_LIMIT` - recent matches considered per player (default: 20)
    /// - `GEMINI_API_KEY` / `GEMINI_MODEL`
    /// - `OPENAI_API_KEY` / `OPENAI_MODEL`
    /// - `WEAPON_MIN_USES`, `WEAPON_STRONG_SCORE`, `WEAPON_WEAK_SCORE`
    /// - `STATIC_DIR` - directory served under `/static`
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let args: Vec<String> = std::env::args().collect();
        let defaults = Config::default();

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env_parse("PORT"))
            .unwrap_or(defaults.port);

        let llm = LlmConfig {
            gemini_api_key: env_non_empty("GEMINI_API_KEY"),
            gemini_model: env_non_empty("GEMINI_MODEL").unwrap_or(defaults.llm.gemini_model),
            openai_api_key: env_non_empty("OPENAI_API_KEY"),
            openai_model: env_non_empty("OPENAI_MODEL").unwrap_or(defaults.llm.openai_model),
        };

        let base = defaults.weapon_thresholds;
        let weapon_thresholds = WeaponThresholds {
            min_uses: env_parse("WEAPON_MIN_USES").unwrap_or(base.min_uses),
            strong_score: env_parse("WEAPON_STRONG_SCORE").unwrap_or(base.strong_score),
            weak_score: env_parse("WEAPON_WEAK_SCORE").unwrap_or(base.weak_score),
        };

        Config {
            port,
            pubg_api_key: env_non_empty("PUBG_API_KEY"),
            stats_base_url: env_non_empty("PUBG_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.stats_base_url),
            default_platform: env_non_empty("DEFAULT_PLATFORM")
                .unwrap_or(defaults.default_platform),
            match_history_limit: env_parse("MATCH_HISTORY_LIMIT")
                .unwrap_or(defaults.match_history_limit),
            llm,
            weapon_thresholds,
            static_dir: env_non_empty("STATIC_DIR").map(PathBuf::from),
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_non_empty(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_value() {
        let args: Vec<String> = ["bin", "--port", "9090"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            Config::parse_cli_value(&args, "--port"),
            Some("9090".to_string())
        );
        assert_eq!(Config::parse_cli_value(&args, "--host"), None);
    }

    #[test]
    fn test_parse_cli_value_flag_without_value() {
        let args: Vec<String> = ["bin", "--port"].iter().map(|s| s.to_string()).collect();
        assert_eq!(Config::parse_cli_value(&args, "--port"), None);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_platform, "steam");
        assert_eq!(config.match_history_limit, 20);
        assert!(config.llm.gemini_api_key.is_none());
        assert!(config.llm.openai_api_key.is_none());
        assert_eq!(config.weapon_thresholds.min_uses, 10);
    }
}

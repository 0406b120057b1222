//! Server configuration: TOML file with environment fallback.
//!
//! Every streaming knob (frame ceiling, tool-field ceiling, turn ceiling,
//! write chunk, high-water mark, turn timeout, history budget) is
//! overridable; the defaults are safe.

use chatwire_protocol::StreamLimits;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall bound on one agent turn, in seconds.
    pub turn_timeout_secs: u64,
    /// Token budget for trimmed conversation history.
    pub history_max_tokens: usize,
    pub limits: StreamLimits,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    agent: AgentSection,
    #[serde(default)]
    stream: StreamSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AgentSection {
    #[serde(default = "default_turn_timeout_secs")]
    turn_timeout_secs: u64,
    #[serde(default = "default_history_max_tokens")]
    history_max_tokens: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            turn_timeout_secs: default_turn_timeout_secs(),
            history_max_tokens: default_history_max_tokens(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct StreamSection {
    frame_ceiling: Option<usize>,
    tool_field_ceiling: Option<usize>,
    turn_ceiling: Option<usize>,
    write_chunk: Option<usize>,
    high_water_mark: Option<usize>,
}

impl StreamSection {
    fn into_limits(self) -> StreamLimits {
        let defaults = StreamLimits::default();
        StreamLimits {
            frame_ceiling: self.frame_ceiling.unwrap_or(defaults.frame_ceiling),
            tool_field_ceiling: self
                .tool_field_ceiling
                .unwrap_or(defaults.tool_field_ceiling),
            turn_ceiling: self.turn_ceiling.unwrap_or(defaults.turn_ceiling),
            write_chunk: self.write_chunk.unwrap_or(defaults.write_chunk),
            high_water_mark: self.high_water_mark.unwrap_or(defaults.high_water_mark),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_turn_timeout_secs() -> u64 {
    60
}

fn default_history_max_tokens() -> usize {
    1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            turn_timeout_secs: default_turn_timeout_secs(),
            history_max_tokens: default_history_max_tokens(),
            limits: StreamLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self {
                host: file_config.server.host,
                port: file_config.server.port,
                turn_timeout_secs: file_config.agent.turn_timeout_secs,
                history_max_tokens: file_config.agent.history_max_tokens,
                limits: file_config.stream.into_limits(),
            });
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let defaults = StreamLimits::default();
        Self {
            host: env::var("CHATWIRE_SERVER_HOST").unwrap_or_else(|_| default_host()),
            port: env_parse("CHATWIRE_SERVER_PORT").unwrap_or_else(default_port),
            turn_timeout_secs: env_parse("CHATWIRE_TURN_TIMEOUT_SECS")
                .unwrap_or_else(default_turn_timeout_secs),
            history_max_tokens: env_parse("CHATWIRE_HISTORY_MAX_TOKENS")
                .unwrap_or_else(default_history_max_tokens),
            limits: StreamLimits {
                frame_ceiling: env_parse("CHATWIRE_FRAME_CEILING")
                    .unwrap_or(defaults.frame_ceiling),
                tool_field_ceiling: env_parse("CHATWIRE_TOOL_FIELD_CEILING")
                    .unwrap_or(defaults.tool_field_ceiling),
                turn_ceiling: env_parse("CHATWIRE_TURN_CEILING").unwrap_or(defaults.turn_ceiling),
                write_chunk: env_parse("CHATWIRE_WRITE_CHUNK").unwrap_or(defaults.write_chunk),
                high_water_mark: env_parse("CHATWIRE_HIGH_WATER_MARK")
                    .unwrap_or(defaults.high_water_mark),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("CHATWIRE_SERVER_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("chatwire.toml").exists() {
        Some("chatwire.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sections_default_when_absent() {
        let parsed: FileConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.agent.turn_timeout_secs, 60);
        assert_eq!(parsed.stream.into_limits(), StreamLimits::default());
    }

    #[test]
    fn stream_section_overrides_individual_limits() {
        let parsed: FileConfig = toml::from_str(
            "[stream]\nframe_ceiling = 8192\nwrite_chunk = 2048\n",
        )
        .unwrap();
        let limits = parsed.stream.into_limits();
        assert_eq!(limits.frame_ceiling, 8192);
        assert_eq!(limits.write_chunk, 2048);
        assert_eq!(limits.tool_field_ceiling, 32_768);
    }
}

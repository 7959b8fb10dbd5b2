use crate::error::TrackerError;
use serde::Deserialize;
use std::io::ErrorKind;

pub const DEFAULT_CONFIG_PATH: &str = "lp_tracker_config.json";

const ENV_API_KEY: &str = "LP_TRACKER_API_KEY";
const ENV_USER: &str = "LP_TRACKER_USER";
const ENV_PLATFORM: &str = "LP_TRACKER_PLATFORM";
const ENV_ROOT: &str = "LP_TRACKER_ROOT";

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Start a new session (capture a fresh baseline) instead of resuming.
    pub new: bool,
    pub api_key: String,
    pub user: String,
    /// Upper-cased platform identifier, e.g. PC, PS4, X1.
    pub platform: String,
    /// Path prefix for the persisted slot files.
    pub root: String,
    pub poll_interval_minutes: u64,
}

/// Optional values read from the JSON config file. A missing file is just an
/// empty config.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub new: Option<bool>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub api_mins: Option<u64>,
}

/// Raw command-line flags.
#[derive(Debug, Default)]
pub struct CliArgs {
    pub new: bool,
    pub api_key: Option<String>,
    pub user: Option<String>,
    pub platform: Option<String>,
    pub root: Option<String>,
    pub api_mins: Option<u64>,
    pub config_path: Option<String>,
    pub help: bool,
}

impl CliArgs {
    pub fn parse(args: &[String]) -> Result<CliArgs, TrackerError> {
        let mut cli = CliArgs::default();
        let mut i = 0;
        while i < args.len() {
            let take_value = |i: usize| -> Result<String, TrackerError> {
                args.get(i + 1)
                    .cloned()
                    .ok_or_else(|| TrackerError::Config(format!("{} requires a value", args[i])))
            };
            match args[i].as_str() {
                "--new" => cli.new = true,
                "--help" | "-h" => cli.help = true,
                "--api-key" | "--api_key" => {
                    cli.api_key = Some(take_value(i)?);
                    i += 1;
                }
                "--user" => {
                    cli.user = Some(take_value(i)?);
                    i += 1;
                }
                "--platform" => {
                    cli.platform = Some(take_value(i)?);
                    i += 1;
                }
                "--root" => {
                    cli.root = Some(take_value(i)?);
                    i += 1;
                }
                "--api-mins" | "--api_mins" => {
                    let raw = take_value(i)?;
                    let mins = raw.parse::<u64>().map_err(|_| {
                        TrackerError::Config(format!("--api-mins must be a positive integer, got {:?}", raw))
                    })?;
                    cli.api_mins = Some(mins);
                    i += 1;
                }
                "--config" => {
                    cli.config_path = Some(take_value(i)?);
                    i += 1;
                }
                other => {
                    return Err(TrackerError::Config(format!("unknown argument {:?}", other)));
                }
            }
            i += 1;
        }
        Ok(cli)
    }
}

pub fn load_file_config(path: &str) -> Result<FileConfig, TrackerError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(TrackerError::Io(e)),
    };
    serde_json::from_str(&contents)
        .map_err(|e| TrackerError::Config(format!("failed to parse {}: {}", path, e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Per-field precedence: CLI flag > config file > environment variable.
/// Required fields that resolve to nothing are a ConfigurationError.
pub fn resolve(cli: CliArgs, file: FileConfig) -> Result<Config, TrackerError> {
    resolve_with_env(cli, file, |name| std::env::var(name).ok())
}

fn resolve_with_env(
    cli: CliArgs,
    file: FileConfig,
    env_var: impl Fn(&str) -> Option<String>,
) -> Result<Config, TrackerError> {
    let env = |name: &str| non_empty(env_var(name));

    let api_key = non_empty(cli.api_key)
        .or_else(|| non_empty(file.api_key))
        .or_else(|| env(ENV_API_KEY))
        .ok_or_else(|| TrackerError::Config("Failed to get API key".into()))?;
    let user = non_empty(cli.user)
        .or_else(|| non_empty(file.user))
        .or_else(|| env(ENV_USER))
        .ok_or_else(|| TrackerError::Config("no user to check against".into()))?;
    let platform = non_empty(cli.platform)
        .or_else(|| non_empty(file.platform))
        .or_else(|| env(ENV_PLATFORM))
        .ok_or_else(|| TrackerError::Config("no platform to check against".into()))?
        .to_uppercase();
    let root = non_empty(cli.root)
        .or_else(|| non_empty(file.root))
        .or_else(|| env(ENV_ROOT))
        .unwrap_or_default();
    let poll_interval_minutes = cli.api_mins.or(file.api_mins).unwrap_or(1);
    if poll_interval_minutes == 0 {
        return Err(TrackerError::Config("poll interval must be at least 1 minute".into()));
    }

    Ok(Config {
        new: cli.new || file.new.unwrap_or(false),
        api_key,
        user,
        platform,
        root,
        poll_interval_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn full_file_config() -> FileConfig {
        FileConfig {
            new: Some(false),
            api_key: Some("file-key".into()),
            user: Some("file-user".into()),
            platform: Some("ps4".into()),
            root: Some("file-root/".into()),
            api_mins: Some(5),
        }
    }

    #[test]
    fn test_cli_parse_flags_and_values() {
        let cli = CliArgs::parse(&args(&[
            "--new", "--user", "player1", "--platform", "pc", "--api-mins", "2",
        ]))
        .unwrap();
        assert!(cli.new);
        assert_eq!(cli.user.as_deref(), Some("player1"));
        assert_eq!(cli.platform.as_deref(), Some("pc"));
        assert_eq!(cli.api_mins, Some(2));
    }

    #[test]
    fn test_cli_rejects_unknown_and_dangling_flags() {
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(&args(&["--user"])).is_err());
        assert!(CliArgs::parse(&args(&["--api-mins", "soon"])).is_err());
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn full_env(name: &str) -> Option<String> {
        match name {
            ENV_API_KEY => Some("env-key".into()),
            ENV_USER => Some("env-user".into()),
            ENV_PLATFORM => Some("switch".into()),
            ENV_ROOT => Some("env-root/".into()),
            _ => None,
        }
    }

    #[test]
    fn test_cli_beats_file() {
        let cli = CliArgs {
            user: Some("cli-user".into()),
            api_key: Some("cli-key".into()),
            ..CliArgs::default()
        };
        let cfg = resolve_with_env(cli, full_file_config(), no_env).unwrap();
        assert_eq!(cfg.user, "cli-user");
        assert_eq!(cfg.api_key, "cli-key");
        // Fields the CLI left alone come from the file
        assert_eq!(cfg.root, "file-root/");
        assert_eq!(cfg.poll_interval_minutes, 5);
    }

    #[test]
    fn test_file_beats_env() {
        let cfg = resolve_with_env(CliArgs::default(), full_file_config(), full_env).unwrap();
        assert_eq!(cfg.api_key, "file-key");
        assert_eq!(cfg.user, "file-user");
        assert_eq!(cfg.platform, "PS4");
        assert_eq!(cfg.root, "file-root/");
    }

    #[test]
    fn test_env_fills_fields_cli_and_file_leave_empty() {
        let cfg =
            resolve_with_env(CliArgs::default(), FileConfig::default(), full_env).unwrap();
        assert_eq!(cfg.api_key, "env-key");
        assert_eq!(cfg.user, "env-user");
        assert_eq!(cfg.platform, "SWITCH");
        assert_eq!(cfg.root, "env-root/");
    }

    #[test]
    fn test_platform_is_upper_cased() {
        let cfg = resolve_with_env(CliArgs::default(), full_file_config(), no_env).unwrap();
        assert_eq!(cfg.platform, "PS4");
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let mut file = full_file_config();
        file.api_key = None;
        let err = resolve_with_env(CliArgs::default(), file, no_env).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_empty_api_key_is_fatal() {
        let mut file = full_file_config();
        file.api_key = Some("   ".into());
        let err = resolve_with_env(CliArgs::default(), file, no_env).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut file = full_file_config();
        file.api_mins = Some(0);
        let err = resolve_with_env(CliArgs::default(), file, no_env).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_missing_config_file_is_empty_config() {
        let file = load_file_config("definitely_not_here.json").unwrap();
        assert!(file.api_key.is_none());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(
            &path,
            r#"{ "api_key": "k", "user": "u", "platform": "x1", "api_mins": 3 }"#,
        )
        .unwrap();
        let file = load_file_config(path.to_str().unwrap()).unwrap();
        assert_eq!(file.api_key.as_deref(), Some("k"));
        assert_eq!(file.api_mins, Some(3));
        assert!(file.root.is_none());
    }
}

/// External configuration loader.
///
/// Reads `config.toml` from the first candidate directory that has one:
/// the executable's directory, the CWD, `~/.local/share/lavadash`,
/// `/usr/share/lavadash`. Missing files and missing keys fall back to defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::sim::parser::ActorRegistry;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    /// Extra plan symbols: symbol → actor name.
    pub legend: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_speed: f64,  // tiles per second
    pub finish_delay: f64,  // seconds between outcome and level switch
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    legend: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: f64,
    #[serde(default = "default_finish_delay")]
    finish_delay: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 40 }
fn default_player_speed() -> f64 { 6.0 }
fn default_finish_delay() -> f64 { 1.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            finish_delay: default_finish_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            finish_delay: default_finish_delay(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from the first `config.toml` found.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Relative `levels_dir` stays relative.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                player_speed: toml_cfg.speed.player_speed,
                finish_delay: toml_cfg.speed.finish_delay,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                restart: toml_cfg.gamepad.restart,
                pause: toml_cfg.gamepad.pause,
            },
            levels_dir,
            legend: toml_cfg.legend,
        }
    }

    /// Standard registry with the `[legend]` table merged over it.
    /// A bad legend is reported and ignored as a whole.
    pub fn registry(&self) -> ActorRegistry {
        let mut registry = ActorRegistry::standard();
        let legend = self.legend.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        if let Err(e) = registry.extend_from_legend(legend) {
            log::warn!("ignoring [legend] in config.toml: {e}");
            return ActorRegistry::standard();
        }
        registry
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
pub(crate) fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/lavadash");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/lavadash");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{} parse error, using defaults: {e}", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ActorType;
    use crate::sim::parser::LevelParser;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed, SpeedConfig::default());
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
        assert!(cfg.legend.is_empty());
        assert_eq!(cfg.gamepad.cancel, vec!["Select".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str("[speed]\nplayer_speed = 3.5\n").unwrap();
        assert_eq!(cfg.speed.player_speed, 3.5);
        assert_eq!(cfg.speed.tick_rate_ms, 40);
        assert_eq!(cfg.speed.finish_delay, 1.0);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = GameConfig::from_toml_str("[speed]\ntick_rate_ms = 0\n").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[speed\nplayer_speed = ").is_err());
    }

    #[test]
    fn legend_extends_registry() {
        let cfg = GameConfig::from_toml_str("[legend]\n\"$\" = \"coin\"\n").unwrap();
        let actors = LevelParser::new(cfg.registry()).create_actors(&["$@"]);
        assert_eq!(actors.len(), 2);
        assert_eq!(actors[0].actor_type(), ActorType::Coin);
        assert_eq!(actors[1].actor_type(), ActorType::Player);
    }

    #[test]
    fn bad_legend_falls_back_to_standard() {
        let cfg = GameConfig::from_toml_str("[legend]\n\"$\" = \"dragon\"\n").unwrap();
        let registry = cfg.registry();
        assert!(registry.get('$').is_none());
        assert_eq!(registry.symbols(), ActorRegistry::standard().symbols());
    }
}

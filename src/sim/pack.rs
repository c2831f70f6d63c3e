/// Level plan loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory: `.txt` and `.json` files, in file-name order
///   2. Built-in embedded levels
///
/// ## Text format (`.txt`):
///   ```text
///   ## Pack metadata (ignored)
///   # Level Name
///   <plan rows>
///   ---
///   # Next Level
///   <plan rows>
///   ```
///   Levels are separated by a line containing only `---`. A file with no
///   separator is a single level.
///
/// ## JSON format (`.json`):
///   An array of plans, each an array of row strings. Levels are named after
///   the file stem and their position.
///
/// ## Plan legend (standard registry):
///   'x' = Wall                 '!' = Lava
///   '@' = Player spawn         'o' = Coin
///   '=' = Horizontal fireball  '|' = Vertical fireball
///   'v' = Fire rain            ' ' = Empty

use std::path::Path;

use crate::error::LoadError;

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Levels from `dir` if it holds any, otherwise the embedded set.
pub fn load_levels(dir: &Path) -> Vec<LevelDef> {
    if dir.is_dir() {
        let levels: Vec<LevelDef> = load_from_directory(dir)
            .into_iter()
            .flat_map(|(_, defs)| defs)
            .collect();
        if !levels.is_empty() {
            log::info!("loaded {} levels from {}", levels.len(), dir.display());
            return levels;
        }
        log::warn!("no usable levels in {}, using built-in levels", dir.display());
    }
    embedded_levels()
}

/// Read one level file (`.json`, or text for anything else).
pub fn read_level_file(path: &Path) -> Result<Vec<LevelDef>, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

    let is_json = path.extension().map_or(false, |e| e == "json");
    let levels = if is_json {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        parse_json_levels(&content, &stem)
            .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?
    } else {
        parse_pack_levels(&content)
    };

    if levels.is_empty() {
        return Err(LoadError::Empty { path: path.to_path_buf() });
    }
    Ok(levels)
}

// ══════════════════════════════════════════════════════════════
// Text parsing
// ══════════════════════════════════════════════════════════════

/// Parse every `---`-separated level in `content`.
pub fn parse_pack_levels(content: &str) -> Vec<LevelDef> {
    let mut levels = vec![];
    let mut current_section = String::new();

    for line in content.lines() {
        if line.trim() == "---" {
            if let Some(def) = parse_level_file(&current_section) {
                levels.push(def);
            }
            current_section.clear();
            continue;
        }
        current_section.push_str(line);
        current_section.push('\n');
    }

    if let Some(def) = parse_level_file(&current_section) {
        levels.push(def);
    }

    levels
}

/// Parse a single level from text content.
fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        if line.starts_with("##") {
            continue; // pack metadata
        }
        if line.starts_with('#') && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    // Only zero-length lines; rows of spaces are open air.
    while rows.last().map_or(false, |r| r.is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    Some(LevelDef { name, rows })
}

/// `# Level Name` has at least one letter after the hash.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// JSON parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_json_levels(content: &str, base_name: &str) -> Result<Vec<LevelDef>, serde_json::Error> {
    let plans: Vec<Vec<String>> = serde_json::from_str(content)?;
    Ok(plans
        .into_iter()
        .enumerate()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(i, rows)| LevelDef { name: format!("{} {}", base_name, i + 1), rows })
        .collect())
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, Vec<LevelDef>)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("could not list {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let wanted = path.extension().map_or(false, |e| e == "txt" || e == "json");
        if !wanted {
            continue;
        }
        match read_level_file(&path) {
            Ok(defs) => {
                let filename = path.file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                results.push((filename, defs));
            }
            Err(e) => log::warn!("skipping level file: {e}"),
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Level 1 - First Steps", &[
            "         ",
            "         ",
            "    =    ",
            "       o ",
            "     !xxx",
            " @       ",
            "xxx!     ",
            "         ",
        ]),
        make_embedded("Level 2 - Fire Rain", &[
            "      v  ",
            "    v    ",
            "  v      ",
            "        o",
            "        x",
            "@   x    ",
            "x        ",
            "         ",
        ]),
        make_embedded("Level 3 - Crossfire", &[
            "  v   v   v  ",
            "             ",
            " o    |    o ",
            "xxx       xxx",
            "      =      ",
            "             ",
            "  @   o      ",
            "!!!!!!!!!!!!!",
        ]),
        make_embedded("Level 4 - The Corridor", &[
            "xxxxxxxxxxxxxxxxxx",
            "x   |      |     x",
            "x                x",
            "x @  xx  o  xx o x",
            "x    !!     !!   x",
            "x =            = x",
            "x      o         x",
            "xxxxxxxxxxxxxxxxxx",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

/// Session: a run through an ordered list of level plans.
///
/// ## Flow
///
/// ```text
///   Playing ──LevelFinished(Won)──▶ next plan, or Complete after the last
///      │  ▲
///      │  └──LevelFinished(Lost)── same plan rebuilt, deaths += 1
///      ▼
///   Paused (toggle)
/// ```
///
/// The session owns the live `Level` and rebuilds it from the plan rows on
/// every (re)start, so a restart always sees a fresh actor list.

use crate::config::SpeedConfig;
use crate::domain::entity::ActorType;
use super::event::GameEvent;
use super::level::{Level, Status};
use super::pack::{self, LevelDef};
use super::parser::LevelParser;
use super::step::{self, FrameInput};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Paused,
    Complete,
}

#[derive(Debug)]
pub struct Session {
    levels: Vec<LevelDef>,
    parser: LevelParser,
    current: usize,
    level: Level,
    pub phase: Phase,

    // ── Tracking ──
    pub deaths: u32,
    pub attempts: u32,
    pub tick: u64,

    // ── Tuning ──
    player_speed: f64,
    finish_delay: f64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl Session {
    /// Start at the first plan. An empty list falls back to the built-in levels.
    pub fn new(levels: Vec<LevelDef>, parser: LevelParser, speed: &SpeedConfig) -> Self {
        let levels = if levels.is_empty() {
            log::warn!("session started without levels, using built-in levels");
            pack::embedded_levels()
        } else {
            levels
        };
        let level = parser.parse(&levels[0].rows).with_finish_delay(speed.finish_delay);

        let mut session = Session {
            levels,
            parser,
            current: 0,
            level,
            phase: Phase::Playing,
            deaths: 0,
            attempts: 1,
            tick: 0,
            player_speed: speed.player_speed,
            finish_delay: speed.finish_delay,
            message: String::new(),
            message_timer: 0,
        };
        session.announce_level();
        session
    }

    /// Build plan `index` and start playing it. Out-of-range indices are ignored.
    pub fn load_level(&mut self, index: usize) {
        let Some(def) = self.levels.get(index) else {
            log::warn!("no level {} (have {})", index, self.levels.len());
            return;
        };
        self.level = self.parser.parse(&def.rows).with_finish_delay(self.finish_delay);
        self.current = index;
        self.phase = Phase::Playing;
        self.attempts = 1;
        log::info!("level {}: {}", index + 1, def.name);
        self.announce_level();
    }

    /// Back to the first plan with fresh counters.
    pub fn restart_game(&mut self) {
        self.deaths = 0;
        self.tick = 0;
        self.load_level(0);
    }

    /// Rebuild the current plan from scratch.
    pub fn restart_level(&mut self) {
        let def = &self.levels[self.current];
        self.level = self.parser.parse(&def.rows).with_finish_delay(self.finish_delay);
        self.phase = Phase::Playing;
        self.attempts += 1;
    }

    fn announce_level(&mut self) {
        let msg = format!("Level {}: {}", self.current + 1, self.level_name());
        self.set_message(&msg, 50);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Accessors ──

impl Session {
    pub fn level(&self) -> &Level { &self.level }
    pub fn current_index(&self) -> usize { self.current }
    pub fn total_levels(&self) -> usize { self.levels.len() }

    pub fn level_name(&self) -> &str {
        &self.levels[self.current].name
    }

    pub fn coins_left(&self) -> usize {
        self.level.count_actors(ActorType::Coin)
    }
}

// ── Control ──

impl Session {
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            Phase::Complete => Phase::Complete,
        };
    }

    /// Advance the live level by `dt` seconds and react to its finish.
    /// Returns the level's events; nothing happens unless playing.
    pub fn step(&mut self, input: FrameInput, dt: f64) -> Vec<GameEvent> {
        if self.message_timer > 0 {
            self.message_timer -= 1;
        }
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        self.tick += 1;

        let events = step::step(&mut self.level, input, dt, self.player_speed);
        for event in &events {
            match event {
                GameEvent::LevelWon => self.set_message("All coins collected!", 25),
                GameEvent::LevelLost => self.set_message("Burned!", 25),
                _ => {}
            }
        }

        let finished = events.iter().find_map(|e| match e {
            GameEvent::LevelFinished { status } => Some(*status),
            _ => None,
        });
        match finished {
            Some(Status::Won) => self.advance(),
            Some(Status::Lost) => {
                self.deaths += 1;
                log::info!("lost level {} (deaths: {})", self.current + 1, self.deaths);
                self.restart_level();
            }
            None => {}
        }
        events
    }

    fn advance(&mut self) {
        let next = self.current + 1;
        if next < self.levels.len() {
            self.load_level(next);
        } else {
            log::info!("all {} levels complete, {} deaths", self.levels.len(), self.deaths);
            self.phase = Phase::Complete;
            self.set_message("You win!", u32::MAX);
        }
    }
}

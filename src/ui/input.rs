/// Keyboard state tracker.
///
/// Movement is continuous: a direction is applied every tick while its key is
/// held, and when several are held the most recently pressed one wins.
/// Pause, restart and quit are edge-triggered.
///
/// Release events are honored only when keyboard enhancement is confirmed;
/// otherwise keys expire after `HOLD_TIMEOUT` without a Press/Repeat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use lavadash::sim::step::MoveDir;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP_KEYS: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

pub const PAUSE_KEYS: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
pub const RESTART_KEYS: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const QUIT_KEYS: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of the first Press of the current hold, and of the last
    /// Press/Repeat, per key.
    held: HashMap<KeyCode, (Instant, Instant)>,
    fresh_presses: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain pending terminal events. Call once per tick, before stepping.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.held.remove(&key.code);
                }
                KeyEventKind::Release => {}
                _ => {
                    let now = Instant::now();
                    match self.held.get_mut(&key.code) {
                        Some((_, last)) if last.elapsed() < HOLD_TIMEOUT => *last = now,
                        _ => {
                            self.held.insert(key.code, (now, now));
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
        }

        self.held.retain(|_, (_, last)| last.elapsed() < HOLD_TIMEOUT);
    }

    /// Held direction, most recent press first.
    pub fn movement(&self) -> Option<MoveDir> {
        [
            (MoveDir::Left, LEFT_KEYS),
            (MoveDir::Right, RIGHT_KEYS),
            (MoveDir::Up, UP_KEYS),
            (MoveDir::Down, DOWN_KEYS),
        ]
        .into_iter()
        .filter_map(|(dir, keys)| self.pressed_at(keys).map(|t| (t, dir)))
        .max_by_key(|(t, _)| *t)
        .map(|(_, dir)| dir)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    fn pressed_at(&self, codes: &[KeyCode]) -> Option<Instant> {
        codes
            .iter()
            .filter_map(|c| self.held.get(c))
            .filter(|(_, last)| last.elapsed() < HOLD_TIMEOUT)
            .map(|(first, _)| *first)
            .max()
    }
}

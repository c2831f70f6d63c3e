/// Gamepad input via gilrs.
///
/// D-pad and left stick move the player. Confirm, cancel, restart and pause
/// are mapped from the `[gamepad]` config section; unknown button names are
/// skipped, and an empty list keeps the default.
///
/// Without the `gamepad` feature this compiles to a stub that never reports input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use lavadash::config::GamepadConfig;
use lavadash::sim::step::MoveDir;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    restart: Vec<Btn>,
    pause: Vec<Btn>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_or(names: &[String], default: Vec<Btn>) -> Vec<Btn> {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if btns.is_empty() { default } else { btns }
        }
        ActionMap {
            confirm: parse_or(&cfg.confirm, vec![Btn::A]),
            cancel: parse_or(&cfg.cancel, vec![Btn::Select]),
            restart: parse_or(&cfg.restart, vec![Btn::Y]),
            pause: parse_or(&cfg.pause, vec![Btn::Start]),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    just_pressed: [bool; BTN_COUNT],

    /// D-pad, indexed by `dir_index`.
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,
}

fn dir_index(dir: MoveDir) -> usize {
    match dir {
        MoveDir::Left => 0,
        MoveDir::Right => 1,
        MoveDir::Up => 2,
        MoveDir::Down => 3,
    }
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                if g.gamepads().next().is_some() {
                    log::info!("gamepad connected");
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            just_pressed: [false; BTN_COUNT],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
        }
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_y = value,
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, down: bool) {
        let dir = match btn {
            Button::DPadLeft => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            Button::DPadUp => Some(MoveDir::Up),
            Button::DPadDown => Some(MoveDir::Down),
            _ => None,
        };
        if let Some(dir) = dir {
            self.dpad[dir_index(dir)] = down;
            return;
        }
        if !down {
            return;
        }
        if let Some(b) = Btn::from_gilrs(btn) {
            self.just_pressed[b as usize] = true;
        }
    }

    // ── Queries ──

    /// Held direction: D-pad first, then the stick.
    pub fn movement(&self) -> Option<MoveDir> {
        let dirs = [MoveDir::Left, MoveDir::Right, MoveDir::Up, MoveDir::Down];
        if let Some(dir) = dirs.into_iter().find(|&d| self.dpad[dir_index(d)]) {
            return Some(dir);
        }
        let (x, y) = (self.stick_x, self.stick_y);
        if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
            return None;
        }
        // gilrs reports stick up as positive Y
        Some(if x.abs() >= y.abs() {
            if x < 0.0 { MoveDir::Left } else { MoveDir::Right }
        } else if y > 0.0 {
            MoveDir::Up
        } else {
            MoveDir::Down
        })
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn confirm_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.confirm) }
    pub fn cancel_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.cancel) }
    pub fn restart_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.restart) }
    pub fn pause_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.pause) }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

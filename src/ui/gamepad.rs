/// Gamepad support (gilrs), reduced to what a side-scroller needs:
/// horizontal movement plus four one-shot actions.
///
/// Default bindings (override in config.toml `[gamepad]`):
///   D-pad / left stick X   run left / right
///   A, B                   jump
///   Start                  pause, or restart once the run is over
///   X                      restart
///   Select                 quit

use std::str::FromStr;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

/// Stick deflection below this counts as centered.
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons that can be bound to an action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
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

impl FromStr for Btn {
    type Err = ();

    /// Accepts Xbox-style letters and gilrs' compass names, any case.
    fn from_str(s: &str) -> Result<Self, ()> {
        let btn = match s.trim().to_ascii_lowercase().as_str() {
            "a" | "south" => Btn::A,
            "b" | "east" => Btn::B,
            "x" | "west" => Btn::X,
            "y" | "north" => Btn::Y,
            "l1" | "lb" | "lefttrigger" => Btn::L1,
            "r1" | "rb" | "righttrigger" => Btn::R1,
            "start" | "menu" => Btn::Start,
            "select" | "back" => Btn::Select,
            _ => return Err(()),
        };
        Ok(btn)
    }
}

#[cfg(feature = "gamepad")]
impl Btn {
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        })
    }
}

/// One-shot actions a button can be bound to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadAction {
    Jump,
    Pause,
    Restart,
    Quit,
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug)]
struct ActionMap {
    jump: Vec<Btn>,
    pause: Vec<Btn>,
    restart: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A, Btn::B],
            pause:   vec![Btn::Start],
            restart: vec![Btn::Start, Btn::X],
            quit:    vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no valid button
    /// keeps its default binding.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| s.parse().ok()).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            jump: parse_list(&cfg.jump, d.jump),
            pause: parse_list(&cfg.pause, d.pause),
            restart: parse_list(&cfg.restart, d.restart),
            quit: parse_list(&cfg.quit, d.quit),
        }
    }

    fn buttons(&self, action: PadAction) -> &[Btn] {
        match action {
            PadAction::Jump => &self.jump,
            PadAction::Pause => &self.pause,
            PadAction::Restart => &self.restart,
            PadAction::Quit => &self.quit,
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: (bool, bool), // (left, right)
    stick_x: f32,
    action_map: ActionMap,

    pub connected: bool,
}

#[cfg(feature = "gamepad")]
fn open_backend() -> (Option<Gilrs>, bool) {
    match Gilrs::new() {
        Ok(g) => {
            let found = g.gamepads().next().is_some();
            if found { log::info!("gamepad connected"); }
            (Some(g), found)
        }
        Err(e) => {
            log::warn!("gamepad backend unavailable: {e}");
            (None, false)
        }
    }
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = open_backend();
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: (false, false),
            stick_x: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Call once per loop iteration; presses only count until the next call.
    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        while let Some(ev) = self.gilrs.as_mut().and_then(Gilrs::next_event) {
            self.apply(ev.event);
        }
    }

    #[cfg(feature = "gamepad")]
    fn apply(&mut self, event: EventType) {
        match event {
            EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
            EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
            EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                self.connected = true;
                self.stick_x = value;
            }
            EventType::Connected => {
                self.connected = true;
                log::info!("gamepad connected");
            }
            EventType::Disconnected => {
                self.connected = false;
                self.release_all();
                log::info!("gamepad disconnected");
            }
            _ => {}
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, button: Button, held: bool) {
        self.connected = true;
        match button {
            Button::DPadLeft => self.dpad.0 = held,
            Button::DPadRight => self.dpad.1 = held,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.buttons[btn as usize].set(held);
                }
            }
        }
    }

    /// Edge-triggered: true only on the update where a bound button went down.
    pub fn pressed(&self, action: PadAction) -> bool {
        self.action_map.buttons(action)
            .iter()
            .any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn left_held(&self) -> bool {
        self.dpad.0 || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.dpad.1 || self.stick_x > STICK_DEADZONE
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = (false, false);
        self.stick_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!("a".parse::<Btn>(), Ok(Btn::A));
        assert_eq!(" Start ".parse::<Btn>(), Ok(Btn::Start));
        assert_eq!("back".parse::<Btn>(), Ok(Btn::Select));
        assert_eq!("Turbo".parse::<Btn>(), Err(()));
    }

    #[test]
    fn config_overrides_and_falls_back() {
        let cfg = GamepadConfig {
            jump: names(&["Y"]),
            pause: names(&["nonsense"]),
            restart: names(&[]),
            quit: names(&["Select", "L1"]),
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.buttons(PadAction::Jump), &[Btn::Y]);
        assert_eq!(map.buttons(PadAction::Pause), &[Btn::Start]);
        assert_eq!(map.buttons(PadAction::Restart), &[Btn::Start, Btn::X]);
        assert_eq!(map.buttons(PadAction::Quit), &[Btn::Select, Btn::L1]);
    }

    #[test]
    fn press_is_edge_triggered() {
        let mut s = BtnState::default();
        s.set(true);
        assert!(s.just_pressed && s.held);
        s.just_pressed = false;
        s.set(true);
        assert!(!s.just_pressed, "repeat press while held");
        s.set(false);
        assert!(!s.held);
    }

    #[test]
    fn stick_respects_deadzone_and_release() {
        let mut gp = GamepadState::new();
        gp.stick_x = -0.2;
        assert!(!gp.left_held());
        gp.stick_x = -0.8;
        assert!(gp.left_held() && !gp.right_held());
        gp.buttons[Btn::A as usize].set(true);
        assert!(gp.pressed(PadAction::Jump));
        gp.release_all();
        assert!(!gp.left_held());
        assert!(!gp.pressed(PadAction::Jump));
    }
}

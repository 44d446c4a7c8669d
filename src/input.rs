//! Touch input and the virtual gamepad driven by it.
//!
//! The platform layer writes into a [`TouchInput`] whenever a touch (or a
//! mouse press standing in for one) happens. The frame driver copies a
//! [`TouchState`] out of it once per frame and hands that snapshot to
//! [`MasterRender::render`](crate::render::MasterRender::render), so input
//! arriving while a frame is rendered only shows up in the next frame.

/// Screen x in pixels to normalized device x: left edge `-1`, right edge `1`.
pub fn normalized_x(x: f32, width: f32) -> f32 {
    2.0 * x / width - 1.0
}

/// Screen y in pixels to normalized device y: top edge `1`, bottom edge `-1`.
pub fn normalized_y(y: f32, height: f32) -> f32 {
    1.0 - 2.0 * y / height
}

/// The most recent touch in normalized device coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchState {
    pub pressed: bool,
    pub x: f32,
    pub y: f32,
}

/// Writer side of the touch handoff, fed with screen pixel coordinates.
#[derive(Clone, Debug)]
pub struct TouchInput {
    width: f32,
    height: f32,
    state: TouchState,
}

impl TouchInput {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            state: TouchState::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
    }

    pub fn touch_down(&mut self, x: f32, y: f32) {
        self.touch_moved(x, y);
        self.state.pressed = true;
    }

    pub fn touch_moved(&mut self, x: f32, y: f32) {
        self.state.x = normalized_x(x, self.width);
        self.state.y = normalized_y(y, self.height);
    }

    pub fn touch_up(&mut self) {
        self.state.pressed = false;
    }

    pub fn snapshot(&self) -> TouchState {
        self.state
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePadKey {
    Up,
    Down,
    Left,
    Right,
    X,
    Circle,
    Triangle,
    Square,
}

impl GamePadKey {
    pub const ALL: [GamePadKey; 8] = [
        GamePadKey::Up,
        GamePadKey::Down,
        GamePadKey::Left,
        GamePadKey::Right,
        GamePadKey::X,
        GamePadKey::Circle,
        GamePadKey::Triangle,
        GamePadKey::Square,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Pressed state of every gamepad key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GamePad {
    keys: [bool; GamePadKey::ALL.len()],
}

impl GamePad {
    pub fn set(&mut self, key: GamePadKey, pressed: bool) {
        self.keys[key.index()] = pressed;
    }

    pub fn is_down(&self, key: GamePadKey) -> bool {
        self.keys[key.index()]
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = GamePadKey> + '_ {
        GamePadKey::ALL.into_iter().filter(|key| self.is_down(*key))
    }
}

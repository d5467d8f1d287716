use crate::render::mesh::TriangleSet;
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keys the demo reacts to, polled once per redraw
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    /// `C` is held down
    pub alternate: bool,
    pub quit: bool,
}

impl KeyState {
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::KeyC => self.alternate = pressed,
            KeyCode::KeyN | KeyCode::Escape if pressed => self.quit = true,
            _ => {}
        }
    }

    pub fn handle_physical(&mut self, key: PhysicalKey, state: ElementState) {
        if let PhysicalKey::Code(code) = key {
            self.handle_key(code, state == ElementState::Pressed);
        }
    }

    /// Key releases are not delivered to an unfocused window
    pub fn focus_lost(&mut self) {
        self.alternate = false;
    }

    pub fn triangle_set(&self) -> TriangleSet {
        if self.alternate {
            TriangleSet::Alternate
        } else {
            TriangleSet::Primary
        }
    }
}

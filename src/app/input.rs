//! Platform-independent pointer input.
//!
//! Windowing backends inject events; controllers read the accumulated state
//! once per frame and [`Input::end_frame`] clears the deltas.

use glam::Vec2;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Default)]
pub struct Input {
    /// Cursor position in physical pixels.
    pub cursor_position: Vec2,
    /// Cursor movement since the last frame.
    pub cursor_delta: Vec2,
    /// Scroll since the last frame, in lines.
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,

    buttons: SmallVec<[MouseButton; 4]>,
    has_cursor: bool,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        // The first sample has nothing to diff against.
        if self.has_cursor {
            self.cursor_delta += position - self.cursor_position;
        }
        self.cursor_position = position;
        self.has_cursor = true;
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if !self.buttons.contains(&button) {
                    self.buttons.push(button);
                }
            }
            ButtonState::Released => self.buttons.retain(|b| *b != button),
        }
    }

    pub fn inject_scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_delta += Vec2::new(dx, dy);
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    /// Drops all pressed buttons, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.buttons.clear();
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_sample_has_no_delta() {
        let mut input = Input::new();
        input.inject_mouse_position(100.0, 50.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);

        input.inject_mouse_position(110.0, 45.0);
        assert_eq!(input.cursor_delta, Vec2::new(10.0, -5.0));

        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
    }

    #[test]
    fn buttons_track_press_and_release() {
        let mut input = Input::new();
        input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
        input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
        assert!(input.is_button_pressed(MouseButton::Left));

        input.inject_mouse_button(MouseButton::Left, ButtonState::Released);
        assert!(!input.is_button_pressed(MouseButton::Left));
    }
}

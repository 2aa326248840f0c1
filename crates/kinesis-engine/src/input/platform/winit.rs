use std::time::Instant;

use ::winit::dpi::PhysicalPosition;
use ::winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

use crate::coords::Vec2;
use crate::input::{PointerEvent, PointerPhase};

/// Turns winit touch and mouse events into engine `PointerEvent`s.
///
/// Touches are kept in arrival order so the first two fingers down stay the
/// tracked pair. A left-button mouse drag acts as a single pointer while no
/// finger is down.
#[derive(Debug, Default)]
pub struct PointerTracker {
    touches: Vec<(u64, Vec2)>,
    cursor: Vec2,
    mouse_down: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` for events that are not pointer input.
    pub fn translate(&mut self, event: &WindowEvent, now: Instant) -> Option<PointerEvent> {
        match event {
            WindowEvent::Touch(Touch { phase, location, id, .. }) => {
                self.touch(*phase, *id, to_vec2(*location), now)
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(to_vec2(*position), now),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.mouse_button(*state == ElementState::Pressed, now),
            WindowEvent::CursorLeft { .. } if self.mouse_down && self.touches.is_empty() => {
                self.mouse_down = false;
                Some(PointerEvent::new(PointerPhase::Cancel, 0, vec![self.cursor], now))
            }
            _ => None,
        }
    }

    pub fn touch(&mut self, phase: TouchPhase, id: u64, pos: Vec2, now: Instant) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started => {
                // A finger overrides a mouse drag in progress.
                self.mouse_down = false;
                self.touches.push((id, pos));
                Some(self.event(PointerPhase::Down, self.touches.len() - 1, now))
            }
            TouchPhase::Moved => {
                let index = self.find(id)?;
                self.touches[index].1 = pos;
                Some(self.event(PointerPhase::Move, index, now))
            }
            TouchPhase::Ended => {
                let index = self.find(id)?;
                self.touches[index].1 = pos;
                let event = self.event(PointerPhase::Up, index, now);
                self.touches.remove(index);
                Some(event)
            }
            TouchPhase::Cancelled => {
                self.find(id)?;
                let event = self.event(PointerPhase::Cancel, 0, now);
                self.touches.clear();
                Some(event)
            }
        }
    }

    pub fn cursor_moved(&mut self, pos: Vec2, now: Instant) -> Option<PointerEvent> {
        self.cursor = pos;
        (self.mouse_down && self.touches.is_empty())
            .then(|| PointerEvent::new(PointerPhase::Move, 0, vec![pos], now))
    }

    pub fn mouse_button(&mut self, pressed: bool, now: Instant) -> Option<PointerEvent> {
        if !self.touches.is_empty() || pressed == self.mouse_down {
            return None;
        }
        self.mouse_down = pressed;
        let phase = if pressed { PointerPhase::Down } else { PointerPhase::Up };
        Some(PointerEvent::new(phase, 0, vec![self.cursor], now))
    }

    /// Forgets every pointer. Used when the window goes away mid-gesture.
    pub fn clear(&mut self) {
        self.touches.clear();
        self.mouse_down = false;
    }

    fn find(&self, id: u64) -> Option<usize> {
        self.touches.iter().position(|(t, _)| *t == id)
    }

    fn event(&self, phase: PointerPhase, index: usize, now: Instant) -> PointerEvent {
        let positions = self.touches.iter().map(|(_, p)| *p).collect();
        PointerEvent::new(phase, index, positions, now)
    }
}

fn to_vec2(pos: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(pos.x as f32, pos.y as f32)
}

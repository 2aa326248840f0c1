use std::fmt;
use std::time::Instant;

use crate::coords::Vec2;

/// Phase of the pointer named by [`PointerEvent::index`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform aborted the whole gesture.
    Cancel,
}

/// One pointer sample.
///
/// `positions` lists every active pointer in physical pixels (origin top-left,
/// y down), including the pointer that changed phase. Order is stable for the
/// lifetime of a pointer: the earliest pointer still down comes first.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub index: usize,
    pub positions: Vec<Vec2>,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, index: usize, positions: Vec<Vec2>, time: Instant) -> Self {
        Self {
            phase,
            index,
            positions,
            time,
        }
    }

    /// Structural checks that do not depend on gesture state.
    pub fn validate(&self) -> Result<(), InputDecodeError> {
        if self.phase == PointerPhase::Cancel {
            return Ok(());
        }
        if self.positions.is_empty() {
            return Err(InputDecodeError::NoPointers);
        }
        if self.index >= self.positions.len() {
            return Err(InputDecodeError::IndexOutOfRange {
                index: self.index,
                len: self.positions.len(),
            });
        }
        if let Some(index) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(InputDecodeError::NonFinite { index });
        }
        Ok(())
    }
}

/// Malformed pointer event.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputDecodeError {
    NoPointers,
    IndexOutOfRange { index: usize, len: usize },
    NonFinite { index: usize },
    /// A move arrived while no gesture was being tracked.
    MoveWithoutDown,
}

impl fmt::Display for InputDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputDecodeError::NoPointers => write!(f, "pointer event without positions"),
            InputDecodeError::IndexOutOfRange { index, len } => {
                write!(f, "pointer index {index} out of range ({len} active)")
            }
            InputDecodeError::NonFinite { index } => {
                write!(f, "pointer {index} has a non-finite position")
            }
            InputDecodeError::MoveWithoutDown => write!(f, "move without a preceding down"),
        }
    }
}

impl std::error::Error for InputDecodeError {}

/// Answer returned to the host for an input event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Handled {
    Yes,
    No,
}

impl Handled {
    #[inline]
    pub fn is_handled(self) -> bool {
        self == Handled::Yes
    }
}

//! Raw window events and their translation into controller commands.

use mandelview_core::SelectionRect;

use crate::controller::Command;

/// Events delivered by the windowing layer, in screen pixels.
///
/// `modified` is the shift state; for keys it selects the decrementing
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerPressed { x: i32, y: i32 },
    PointerDragged { x: i32, y: i32, modified: bool },
    PointerReleased { x: i32, y: i32, modified: bool },
    Key { ch: char, modified: bool },
    Escape,
}

/// Tracks a press/drag/release gesture and emits a command when it ends.
#[derive(Debug, Default)]
pub struct GestureTracker {
    start: Option<(i32, i32)>,
    current: Option<SelectionRect>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event. Returns the command it completes, if any.
    pub fn handle(&mut self, event: InputEvent) -> Option<Command> {
        match event {
            InputEvent::PointerPressed { x, y } => {
                self.start = Some((x, y));
                self.current = None;
                None
            }
            InputEvent::PointerDragged { x, y, modified } => {
                if !modified {
                    if let Some(start) = self.start {
                        self.current = Some(SelectionRect::from_corners(start, (x, y)));
                    }
                }
                None
            }
            InputEvent::PointerReleased { x, y, modified } => {
                let start = self.start.take();
                self.current = None;
                if modified {
                    return Some(Command::PanTo { x, y });
                }
                // A release without a press selects the point itself.
                let start = start.unwrap_or((x, y));
                Some(Command::Select(SelectionRect::from_corners(start, (x, y))))
            }
            InputEvent::Key { ch, modified } => key_command(ch, modified),
            InputEvent::Escape => Some(Command::Reset),
        }
    }

    /// The rectangle to draw while a selection drag is in progress, as
    /// `(left, top, width, height)`.
    pub fn overlay(&self) -> Option<(i32, i32, u32, u32)> {
        self.current.as_ref().map(SelectionRect::overlay)
    }
}

/// Key bindings. Upper case letters count as modified; only `p`, `c` and `t`
/// have a modified variant.
fn key_command(ch: char, modified: bool) -> Option<Command> {
    let modified = modified || ch.is_ascii_uppercase();
    let command = match (ch.to_ascii_lowercase(), modified) {
        ('i', false) => Command::ZoomIn,
        ('o', false) => Command::ZoomOut,
        ('p', false) => Command::NextPalette,
        ('p', true) => Command::PreviousPalette,
        ('c', false) => Command::MoreSteps,
        ('c', true) => Command::FewerSteps,
        ('t', false) => Command::MoreWorkers,
        ('t', true) => Command::FewerWorkers,
        _ => return None,
    };
    Some(command)
}

/// A pointer, wheel or viewport event delivered by the host to the viewer.
///
/// Coordinates are in host pixels; only their differences matter to the
/// camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed at `(x, y)`.
    PointerDown { x: f32, y: f32 },
    /// Pointer moved to `(x, y)`.
    PointerMove { x: f32, y: f32 },
    /// Primary button released, wherever the pointer is.
    PointerUp,
    /// Wheel scrolled; positive `delta_y` zooms out.
    Wheel { delta_y: f32 },
    /// Drawable area changed size.
    Resize { width: u32, height: u32 },
}

use crate::paint::Color;
use crate::render::DrawMesh;

/// Drawing-buffer size versus displayed size, in physical pixels.
///
/// The runtime keeps `client_*` in sync with the window. `width`/`height`
/// only change when something (usually `CanvasResizer`) copies them over.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub client_width: u32,
    pub client_height: u32,
}

impl Canvas {
    /// A canvas whose buffer already matches its displayed size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            client_width: width,
            client_height: height,
        }
    }

    /// Whether the drawing buffer lags behind the displayed size.
    pub fn needs_resize(&self) -> bool {
        self.width != self.client_width || self.height != self.client_height
    }

    /// Buffer aspect ratio, `1.0` while the buffer has no height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Rectangle of the drawing buffer that clip space maps onto.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which buffers a clear resets.
///
/// Stored as booleans instead of bitflags to keep it explicit.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask { color: true, depth: false };
    pub const DEPTH: ClearMask = ClearMask { color: false, depth: true };
    pub const COLOR_DEPTH: ClearMask = ClearMask { color: true, depth: true };

    pub fn union(self, other: ClearMask) -> ClearMask {
        ClearMask {
            color: self.color || other.color,
            depth: self.depth || other.depth,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.color && !self.depth
    }
}

impl std::ops::BitOr for ClearMask {
    type Output = ClearMask;

    fn bitor(self, rhs: ClearMask) -> ClearMask {
        self.union(rhs)
    }
}

/// A backend call queued by a behavior.
#[derive(Debug, Clone)]
pub enum GraphicsCmd {
    Viewport(Viewport),
    ClearColor(Color),
    Clear(ClearMask),
    Draw(DrawMesh),
}

/// Graphics context handed to behaviors through the dispatcher.
///
/// Calls are recorded in issue order and executed by the runtime after the
/// dispatch pass. Nothing here touches the GPU.
#[derive(Debug, Default)]
pub struct GraphicsCtx {
    commands: Vec<GraphicsCmd>,
}

impl GraphicsCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.commands.push(GraphicsCmd::Viewport(Viewport { x, y, width, height }));
    }

    pub fn clear_color(&mut self, color: Color) {
        self.commands.push(GraphicsCmd::ClearColor(color));
    }

    pub fn clear(&mut self, mask: ClearMask) {
        self.commands.push(GraphicsCmd::Clear(mask));
    }

    pub fn draw(&mut self, draw: DrawMesh) {
        self.commands.push(GraphicsCmd::Draw(draw));
    }

    /// Commands queued since the last drain, in issue order.
    pub fn pending(&self) -> &[GraphicsCmd] {
        &self.commands
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&mut self) -> std::vec::Drain<'_, GraphicsCmd> {
        self.commands.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_resize_detection() {
        let mut c = Canvas::new(800, 600);
        assert!(!c.needs_resize());
        c.client_width = 1024;
        assert!(c.needs_resize());
    }

    #[test]
    fn aspect_ratio_of_empty_canvas_is_one() {
        assert_eq!(Canvas::default().aspect_ratio(), 1.0);
        assert_eq!(Canvas::new(200, 100).aspect_ratio(), 2.0);
    }

    #[test]
    fn clear_mask_union() {
        assert_eq!(ClearMask::COLOR | ClearMask::DEPTH, ClearMask::COLOR_DEPTH);
        assert!(ClearMask::default().is_empty());
    }

    #[test]
    fn commands_drain_in_issue_order() {
        let mut gfx = GraphicsCtx::new();
        gfx.clear_color(Color::black());
        gfx.viewport(0, 0, 10, 20);
        gfx.clear(ClearMask::COLOR);
        assert_eq!(gfx.pending().len(), 3);

        let cmds: Vec<_> = gfx.drain().collect();
        assert!(matches!(cmds[0], GraphicsCmd::ClearColor(_)));
        assert!(matches!(
            cmds[1],
            GraphicsCmd::Viewport(Viewport { width: 10, height: 20, .. })
        ));
        assert!(matches!(cmds[2], GraphicsCmd::Clear(ClearMask::COLOR)));
        assert!(gfx.pending().is_empty());
    }
}

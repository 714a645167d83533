use crate::core::{ClearMask, GraphicsCmd, Viewport};
use crate::paint::Color;

use super::mesh::DrawMesh;

/// Backend state that persists between frames, like a GL context's.
#[derive(Debug, Clone)]
pub struct BackendState {
    pub clear_color: Color,
    /// `None` until a viewport is issued; the whole target is used meanwhile.
    pub viewport: Option<Viewport>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            clear_color: Color::transparent(),
            viewport: None,
        }
    }
}

/// Everything one frame asks the GPU to do, resolved into a single pass.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub clear: ClearMask,
    /// Clear color in effect when the color clear was issued.
    pub clear_color: Color,
    pub viewport: Option<Viewport>,
    pub draws: Vec<DrawMesh>,
}

impl FramePlan {
    /// Nothing to clear and nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.clear.is_empty() && self.draws.is_empty()
    }
}

impl BackendState {
    /// Applies `commands` in order and returns the resulting frame.
    ///
    /// A color clear discards draws queued before it in the same frame. The
    /// last viewport issued applies to the whole frame.
    pub fn apply(&mut self, commands: impl IntoIterator<Item = GraphicsCmd>) -> FramePlan {
        let mut plan = FramePlan {
            clear: ClearMask::default(),
            clear_color: self.clear_color,
            viewport: self.viewport,
            draws: Vec::new(),
        };

        for cmd in commands {
            match cmd {
                GraphicsCmd::Viewport(v) => {
                    self.viewport = Some(v);
                    plan.viewport = Some(v);
                }
                GraphicsCmd::ClearColor(c) => self.clear_color = c,
                GraphicsCmd::Clear(mask) => {
                    if mask.color {
                        plan.draws.clear();
                        plan.clear_color = self.clear_color;
                    }
                    plan.clear = plan.clear | mask;
                }
                GraphicsCmd::Draw(d) => plan.draws.push(d),
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::render::MeshData;
    use umbra_math::Matrix;

    fn draw() -> GraphicsCmd {
        GraphicsCmd::Draw(DrawMesh::new(Rc::new(MeshData::cube()), Matrix::identity(4)))
    }

    #[test]
    fn empty_frame() {
        let mut state = BackendState::default();
        let plan = state.apply(Vec::new());
        assert!(plan.is_empty());
        assert!(plan.viewport.is_none());
    }

    #[test]
    fn clear_uses_color_set_before_it() {
        let mut state = BackendState::default();
        let plan = state.apply([
            GraphicsCmd::ClearColor(Color::black()),
            GraphicsCmd::Clear(ClearMask::COLOR),
            GraphicsCmd::ClearColor(Color::white()),
        ]);
        assert_eq!(plan.clear_color, Color::black());
        assert_eq!(state.clear_color, Color::white());
        assert_eq!(plan.clear, ClearMask::COLOR);
    }

    #[test]
    fn color_clear_discards_earlier_draws() {
        let mut state = BackendState::default();
        let plan = state.apply([draw(), GraphicsCmd::Clear(ClearMask::COLOR), draw()]);
        assert_eq!(plan.draws.len(), 1);

        let plan = state.apply([draw(), GraphicsCmd::Clear(ClearMask::DEPTH), draw()]);
        assert_eq!(plan.draws.len(), 2);
    }

    #[test]
    fn state_carries_across_frames() {
        let mut state = BackendState::default();
        let vp = Viewport { x: 0, y: 0, width: 64, height: 32 };
        state.apply([
            GraphicsCmd::ClearColor(Color::from_hex(0x808080)),
            GraphicsCmd::Viewport(vp),
        ]);

        let plan = state.apply([GraphicsCmd::Clear(ClearMask::COLOR_DEPTH)]);
        assert_eq!(plan.viewport, Some(vp));
        assert_eq!(plan.clear_color, Color::from_hex(0x808080));
        assert_eq!(plan.clear, ClearMask::COLOR_DEPTH);
    }
}

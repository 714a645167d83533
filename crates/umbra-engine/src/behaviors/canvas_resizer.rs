use crate::core::Umbra;
use crate::scene::{Behavior, Event, SceneNode};

/// Keeps the drawing buffer the same size as the displayed canvas.
///
/// On `Update`, if the canvas was resized, copies the displayed size into the
/// buffer size and issues a full-canvas viewport. Runs before most other
/// behaviors so they see the new size in the same frame.
pub struct CanvasResizer;

impl CanvasResizer {
    pub const DEFAULT_PRIORITY: i32 = -2;

    pub fn attach(node: &SceneNode) -> Behavior {
        Self::attach_with_priority(node, Self::DEFAULT_PRIORITY)
    }

    pub fn attach_with_priority(node: &SceneNode, priority: i32) -> Behavior {
        let behavior = Behavior::with_kind::<CanvasResizer>(node, priority);
        behavior.on(Event::Update, |umbra| {
            resize(umbra);
            Ok(())
        });
        behavior
    }
}

fn resize(umbra: &mut Umbra) {
    let canvas = &mut umbra.canvas;
    if !canvas.needs_resize() {
        return;
    }

    canvas.width = canvas.client_width;
    canvas.height = canvas.client_height;
    let (w, h) = (canvas.width, canvas.height);
    umbra.gfx.viewport(0, 0, w, h);
    log::debug!("canvas resized to {w}x{h}");
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::core::{GraphicsCmd, UmbraConfig, Viewport};

    #[test]
    fn syncs_buffer_and_issues_viewport() {
        let root = SceneNode::new();
        CanvasResizer::attach(&root);

        let mut umbra = Umbra::new(UmbraConfig::default()).unwrap();
        umbra.set_scene(root);
        umbra.canvas.client_width = 640;
        umbra.canvas.client_height = 480;
        umbra.frame_at(Instant::now());

        assert_eq!((umbra.canvas.width, umbra.canvas.height), (640, 480));
        let cmds: Vec<_> = umbra.gfx.drain().collect();
        assert_eq!(cmds.len(), 1);
        assert!(matches!(
            cmds[0],
            GraphicsCmd::Viewport(Viewport { x: 0, y: 0, width: 640, height: 480 })
        ));
    }

    #[test]
    fn quiet_when_size_is_unchanged() {
        let root = SceneNode::new();
        CanvasResizer::attach(&root);

        let mut umbra = Umbra::new(UmbraConfig::default()).unwrap();
        umbra.set_scene(root);
        umbra.canvas.client_width = 100;
        umbra.canvas.client_height = 100;
        umbra.frame_at(Instant::now());
        umbra.gfx.drain();

        umbra.frame_at(Instant::now());
        assert!(umbra.gfx.pending().is_empty());
    }

    #[test]
    fn findable_by_kind() {
        let root = SceneNode::new();
        let b = CanvasResizer::attach(&root);
        assert!(root.behavior::<CanvasResizer>().unwrap().ptr_eq(&b));
        assert_eq!(b.priority(), -2);
    }
}

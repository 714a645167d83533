use crate::core::ClearMask;
use crate::paint::Color;
use crate::scene::{Behavior, Event, SceneNode};

/// Clears the frame to a solid color.
///
/// Sets the clear color on `Load` and clears color and depth on every
/// `Update`, ahead of anything that draws.
pub struct Background;

impl Background {
    pub const DEFAULT_PRIORITY: i32 = -1;

    pub fn attach(node: &SceneNode, color: Color) -> Behavior {
        Self::attach_with_priority(node, color, Self::DEFAULT_PRIORITY)
    }

    pub fn attach_with_priority(node: &SceneNode, color: Color, priority: i32) -> Behavior {
        let behavior = Behavior::with_kind::<Background>(node, priority);
        behavior
            .on(Event::Load, move |umbra| {
                umbra.gfx.clear_color(color);
                Ok(())
            })
            .on(Event::Update, |umbra| {
                umbra.gfx.clear(ClearMask::COLOR_DEPTH);
                Ok(())
            });
        behavior
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::behaviors::CanvasResizer;
    use crate::core::{GraphicsCmd, Umbra, UmbraConfig};

    #[test]
    fn load_sets_color_update_clears() {
        let root = SceneNode::new();
        Background::attach(&root, Color::from_hex(0x102030));

        let mut umbra = Umbra::new(UmbraConfig::default()).unwrap();
        umbra.set_scene(root);
        let loaded: Vec<_> = umbra.gfx.drain().collect();
        assert!(matches!(loaded.as_slice(), [GraphicsCmd::ClearColor(c)] if *c == Color::from_hex(0x102030)));

        umbra.frame_at(Instant::now());
        let frame: Vec<_> = umbra.gfx.drain().collect();
        assert!(matches!(frame.as_slice(), [GraphicsCmd::Clear(ClearMask::COLOR_DEPTH)]));
    }

    #[test]
    fn resizer_runs_before_background() {
        let root = SceneNode::new();
        // Attached in the "wrong" order on purpose.
        Background::attach(&root, Color::black());
        CanvasResizer::attach(&root);

        let mut umbra = Umbra::new(UmbraConfig::default()).unwrap();
        umbra.set_scene(root);
        umbra.gfx.drain();
        umbra.canvas.client_width = 32;
        umbra.canvas.client_height = 32;
        umbra.frame_at(Instant::now());

        let frame: Vec<_> = umbra.gfx.drain().collect();
        assert!(matches!(frame[0], GraphicsCmd::Viewport(_)));
        assert!(matches!(frame[1], GraphicsCmd::Clear(_)));
    }

    #[test]
    fn findable_by_kind() {
        let root = SceneNode::new();
        Background::attach(&root, Color::white());
        assert!(root.behavior::<Background>().is_some());
        assert!(root.behavior::<CanvasResizer>().is_none());
    }
}

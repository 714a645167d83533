use std::cell::Cell;
use std::rc::Rc;

use umbra_engine::behaviors::{Background, CanvasResizer};
use umbra_engine::device::GpuInit;
use umbra_engine::logging::{LoggingConfig, init_logging};
use umbra_engine::math::{Camera, Matrix};
use umbra_engine::paint::Color;
use umbra_engine::render::{DrawMesh, MeshData};
use umbra_engine::scene::{Behavior, Event, SceneNode, WeakSceneNode};
use umbra_engine::window::{Runtime, RuntimeConfig};
use umbra_engine::{Umbra, UmbraConfig, VERSION};

const EYE: [f32; 3] = [0.0, 1.5, 4.0];
const DEGREES_PER_SECOND: f32 = 60.0;
const BLINK_SECONDS: u32 = 2;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("umbra-demo on umbra {VERSION}");

    let mut umbra = Umbra::new(UmbraConfig::default())?;
    umbra.set_scene(build_scene()?);

    Runtime::run(
        RuntimeConfig::with_title("umbra - spinning cube"),
        GpuInit::default(),
        umbra,
    )
}

/// root (resizer, background, blinker)
/// └── cube (spinner, draw)
///     └── moon (draw)
fn build_scene() -> anyhow::Result<SceneNode> {
    let root = SceneNode::named("root");
    CanvasResizer::attach(&root);
    Background::attach(&root, Color::from_hex(0x1d2330));

    let mesh = Rc::new(MeshData::cube());
    let angle = Rc::new(Cell::new(0.0_f32));

    let cube = SceneNode::named("cube");
    cube.set_parent(&root)?;
    spinner(&cube, angle.clone());
    draw_mesh(&cube, mesh.clone(), angle.clone(), |m, a| {
        m.rotate(a * 0.5, a, 0.0)?;
        Ok(())
    });

    let moon = SceneNode::named("moon");
    moon.set_parent(&cube)?;
    draw_mesh(&moon, mesh, angle, |m, a| {
        m.rotate(0.0, a * 2.0, 0.0)?
            .translate(1.4, 0.0, 0.0)?
            .scale(0.3, 0.3, 0.3)?;
        Ok(())
    });
    blinker(&root, moon.downgrade());

    Ok(root)
}

/// Advances `angle` at a fixed rate.
fn spinner(node: &SceneNode, angle: Rc<Cell<f32>>) -> Behavior {
    let behavior = Behavior::new(node, 0);
    behavior.on(Event::Fixed, move |umbra| {
        let step = DEGREES_PER_SECOND * umbra.fixed_period().as_secs_f32();
        angle.set((angle.get() + step) % 360.0);
        Ok(())
    });
    behavior
}

/// Toggles `target` on and off every few seconds.
fn blinker(node: &SceneNode, target: WeakSceneNode) -> Behavior {
    let behavior = Behavior::new(node, 0);
    let mut ticks = 0_u32;
    behavior.on(Event::Fixed, move |umbra| {
        ticks += 1;
        if ticks >= BLINK_SECONDS * umbra.ups() {
            ticks = 0;
            if let Some(target) = target.upgrade() {
                target.set_enabled(!target.enabled());
                log::debug!("{} enabled: {}", target.name(), target.enabled());
            }
        }
        Ok(())
    });
    behavior
}

/// Queues `mesh` every frame, transformed by `model` then the camera.
fn draw_mesh<F>(node: &SceneNode, mesh: Rc<MeshData>, angle: Rc<Cell<f32>>, model: F) -> Behavior
where
    F: Fn(&mut Matrix, f32) -> anyhow::Result<()> + 'static,
{
    let behavior = Behavior::new(node, 0);
    behavior.on(Event::Update, move |umbra: &mut Umbra| {
        let mut view = Camera::new();
        view.look_at_y_up(EYE, [0.0; 3]).invert()?;

        let mut camera = Camera::new();
        camera
            .perspective(60.0, umbra.canvas.aspect_ratio(), 0.1, 100.0)
            .multiply(&view)?;

        let mut transform = camera.into_matrix();
        model(&mut transform, angle.get())?;

        umbra.gfx.draw(DrawMesh::new(mesh.clone(), transform));
        Ok(())
    });
    behavior
}

use core::f32::consts::FRAC_PI_2;

use kinesis_engine::backend::WgpuConfig;
use kinesis_engine::coords::{Color, Transform, Vec2};
use kinesis_engine::core::EngineConfig;
use kinesis_engine::drawable::{Geometry, Material};
use kinesis_engine::logging::{init_logging, LoggingConfig};
use kinesis_engine::scene::{DrawableSpec, SceneSpec};
use kinesis_engine::window::{Runtime, RuntimeConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let scene = SceneSpec::new()
        // ── backdrop ──────────────────────────────────────────────────────
        .with(DrawableSpec::new(
            "panel",
            Geometry::quad(Vec2::new(0.0, 0.0), Vec2::new(1.6, 1.6), Color::from_u8(40, 44, 60, 255)),
            Material::flat(Color::WHITE),
        ))
        // ── static triangle ───────────────────────────────────────────────
        .with(DrawableSpec::new(
            "triangle",
            Geometry::triangle(Vec2::new(-0.4, 0.0), Color::RED),
            Material::flat(Color::WHITE),
        ))
        // ── spinner ───────────────────────────────────────────────────────
        .with(
            DrawableSpec::new(
                "spinner",
                Geometry::gradient_triangle(Vec2::zero(), [Color::RED, Color::GREEN, Color::BLUE]),
                Material::flat(Color::WHITE),
            )
            .with_local(Transform::translate(0.45, 0.0) * Transform::uniform_scale(0.5))
            .with_spin(FRAC_PI_2),
        );

    let engine = EngineConfig {
        scene,
        ..EngineConfig::default()
    };

    log::info!("starting kinesis demo: drag to pan, pinch to zoom and rotate");
    Runtime::run(
        RuntimeConfig {
            title: "kinesis demo".to_string(),
            ..RuntimeConfig::default()
        },
        WgpuConfig::default(),
        engine,
    )
}

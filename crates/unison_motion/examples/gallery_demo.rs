//! Gallery Demo
//!
//! Drives a thumbnail -> detail transition on the headless surface and prints
//! the generated rule text. The discrete options are loaded from TOML the way
//! a host application would keep them in its configuration file.
//!
//! Run with: RUST_LOG=unison_motion=debug cargo run -p unison_motion --example gallery_demo

use unison_core::{
    Anchor, CornerRadii, ElementBox, HeadlessSurface, HookFns, Length, MemoryStyleSink, NodeId,
};
use unison_motion::{
    CompletionEvent, ContinuousMotion, ContinuousOptions, DiscreteMotion, DiscreteOptions, Stage,
};

const OPTIONS: &str = r#"
name = "gallery"
z_index = 10
timing = "ease-in-out"
duration = { forward = 400, backward = 250 }
transition = { forward = { duration = 150, delay = 100 } }
"#;

fn build_stage() -> (Stage<HeadlessSurface, MemoryStyleSink>, HeadlessSurface) {
    let surface = HeadlessSurface::new();
    let thumb = surface.add_node("thumb", ElementBox::new(24.0, 24.0, 120.0, 80.0));
    let detail = surface.add_node("detail", ElementBox::new(0.0, 200.0, 480.0, 320.0));
    surface.set_radii(thumb, Length::px(8.0));
    surface.set_radii(detail, CornerRadii::uniform(Length::px(16.0)));

    let mut stage = Stage::new(surface.clone(), MemoryStyleSink::new());
    stage.add_anchor(
        Anchor::new(surface.locator("thumb"))
            .named("thumb")
            .with_hooks(HookFns::<NodeId>::new().on_forward_start(|event| {
                tracing::info!("thumb leaves ({:?})", event.current);
            })),
    );
    stage.add_anchor(
        Anchor::new(surface.locator("detail"))
            .named("detail")
            .with_hooks(HookFns::<NodeId>::new().on_forward_end(|event| {
                tracing::info!("detail settled ({:?})", event.current);
            })),
    );
    (stage, surface)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Discrete: one forward run, then back
    let (mut stage, _surface) = build_stage();
    let options: DiscreteOptions = toml::from_str(OPTIONS)?;
    let mut motion = DiscreteMotion::<NodeId>::new(options);
    motion.connect(&mut stage, "thumb", "detail")?;

    motion.forward_with(&mut stage, |event: &CompletionEvent<NodeId>| {
        tracing::info!("forward complete, detail = {:?}", event.get("detail"));
    })?;
    println!("--- forward rules ---\n{}\n", stage.sink().text());
    stage.run_until_idle();

    motion.backward(&mut stage)?;
    println!("--- backward rules ---\n{}\n", stage.sink().text());
    stage.run_until_idle();

    // Continuous: scrub with a slider
    let (mut stage, _surface) = build_stage();
    let options = ContinuousOptions::default().with_transition(30.0, 70.0);
    let mut slider = ContinuousMotion::<NodeId>::new(options)?;
    slider.connect(&mut stage, "thumb", "detail")?;
    for progress in [0.0, 25.0, 50.0, 75.0, 100.0] {
        slider.set(&mut stage, progress)?;
        println!("--- progress {} ---\n{}\n", slider.get(), stage.sink().text());
    }

    Ok(())
}

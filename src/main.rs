//! MirrorFit demo runner
//!
//! Headless driver for the try-on pipeline: opens the default camera
//! (or degrades to demo mode), composites a bounded number of frames,
//! and writes the final surface to a PNG. Useful for smoke-testing the
//! pipeline on a machine without a UI shell.
//!
//! Usage:
//!   mirrorfit [--config conf.json] [--garments DIR] [--out out.png] [--frames N] [--markers]

use std::path::PathBuf;

use anyhow::{Context, Result};

use mirrorfit::capture::WebcamSource;
use mirrorfit::overlay::{GarmentAsset, GarmentCatalog};
use mirrorfit::pose::ProportionalEstimator;
use mirrorfit::render_loop::RenderLoop;
use mirrorfit::session::TryOnSession;
use mirrorfit::SessionConfig;

/// Demo swatch colors used when no garment directory is given,
/// mirroring a five-item shop catalog.
const SWATCH_COLORS: [[u8; 4]; 5] = [
    [196, 30, 58, 255],
    [0, 90, 156, 255],
    [34, 120, 62, 255],
    [240, 195, 0, 255],
    [60, 60, 60, 255],
];

struct Args {
    config: Option<PathBuf>,
    garments: Option<PathBuf>,
    out: PathBuf,
    frames: u64,
    markers: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        garments: None,
        out: PathBuf::from("mirrorfit.png"),
        frames: 120,
        markers: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(next_value(&mut iter, &arg)?)),
            "--garments" => args.garments = Some(PathBuf::from(next_value(&mut iter, &arg)?)),
            "--out" => args.out = PathBuf::from(next_value(&mut iter, &arg)?),
            "--frames" => {
                args.frames = next_value(&mut iter, &arg)?
                    .parse()
                    .context("--frames expects a number")?
            }
            "--markers" => args.markers = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next()
        .with_context(|| format!("{flag} expects a value"))
}

fn build_catalog(dir: Option<&PathBuf>) -> Result<GarmentCatalog> {
    if let Some(dir) = dir {
        let catalog = GarmentCatalog::from_dir(dir)
            .with_context(|| format!("failed to read garment directory {dir:?}"))?;
        if !catalog.is_empty() {
            return Ok(catalog);
        }
        log::warn!("no usable garments in {dir:?}, using built-in swatches");
    }
    let garments = SWATCH_COLORS
        .iter()
        .enumerate()
        .map(|(i, color)| GarmentAsset::swatch(format!("swatch-{}", i + 1), 200, 240, *color))
        .collect();
    Ok(GarmentCatalog::new(garments))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => SessionConfig::load(path).with_context(|| format!("loading {path:?}"))?,
        None => SessionConfig::default(),
    };

    if let Err(e) = WebcamSource::probe() {
        log::warn!("camera probe failed ({e}); the session will run in demo mode");
    }

    let catalog = build_catalog(args.garments.as_ref())?;
    log::info!("catalog holds {} garments", catalog.count());

    let mut session = TryOnSession::new(
        config.constraints(),
        Box::new(WebcamSource::new(config.camera_index)),
        Box::new(ProportionalEstimator::new()),
        catalog,
    );
    session.set_draw_markers(args.markers || config.draw_markers);
    session.set_state_observer(Box::new(|state| {
        log::info!("session is now {}", state.name());
    }));

    session.start();

    let mut render_loop = RenderLoop::new(config.target_fps);
    let handle = render_loop.handle();
    let budget = args.frames;
    let mut rendered: u64 = 0;
    render_loop.run(&mut session, |_surface| {
        rendered += 1;
        if rendered >= budget {
            handle.cancel();
        }
    })?;

    if let Some(diag) = session.capture_diagnostic() {
        log::info!("ran in demo mode: {diag}");
    }
    log::info!("rendered {} frames", rendered);

    let surface = session.surface();
    if surface.is_ready() {
        let image = surface
            .to_image()
            .context("surface buffer did not form an image")?;
        image
            .save(&args.out)
            .with_context(|| format!("writing {:?}", args.out))?;
        log::info!(
            "wrote {}x{} snapshot to {:?}",
            surface.width(),
            surface.height(),
            args.out
        );
    } else {
        log::warn!("no frame was composited, skipping snapshot");
    }

    session.stop();
    Ok(())
}

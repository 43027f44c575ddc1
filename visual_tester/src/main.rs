use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use voronoi_nav::core_modules::navigation::TracingNavigator;
use voronoi_nav::core_modules::utils::image_helper;
use voronoi_nav::{LabelPlacement, LabelSink, Point, Scene, SceneConfig, Viewport};

const DEFAULT_FRAMES: u32 = 120;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Writes every label placement to the log instead of a page.
struct LoggingSink;

impl LabelSink for LoggingSink {
    fn place_labels(&mut self, placements: &[LabelPlacement]) {
        for p in placements {
            tracing::info!(
                index = p.index,
                x = p.position.x,
                y = p.position.y,
                label = p.label.as_deref().unwrap_or("-"),
                "label placed"
            );
        }
    }
}

fn env_dimension(key: &str, default: f64) -> anyhow::Result<f64> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow::anyhow!("{key}={value:?} is not a number: {e}")),
        Err(_) => Ok(default),
    }
}

/// A pointer path that sweeps the viewport and leaves it once per cycle.
fn scripted_pointer(frame: u32, frames: u32, viewport: Viewport) -> Option<Point> {
    let t = frame as f64 / frames.max(1) as f64 * std::f64::consts::TAU;
    let point = Point::new(
        viewport.width * (0.5 + 0.55 * t.sin()),
        viewport.height * (0.5 + 0.45 * (2.0 * t).cos()),
    );
    viewport.contains(point).then_some(point)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: visual_tester <output_dir> [frames]");
        return Ok(());
    }
    let output_dir = PathBuf::from(&args[1]);
    let frames = match args.get(2) {
        Some(n) => n.parse::<u32>()?,
        None => DEFAULT_FRAMES,
    };
    std::fs::create_dir_all(&output_dir)?;

    let mut viewport = Viewport::new(env_dimension("VN_WIDTH", 800.0)?, env_dimension("VN_HEIGHT", 600.0)?);

    // --- 2. Scene Initialization ---
    let config = SceneConfig::from_env()?;
    let mut scene = Scene::new(config, viewport, Box::new(TracingNavigator), Box::new(LoggingSink))?;

    // --- 3. Main Frame Loop ---
    let press_at = frames / 3;
    let release_at = press_at + 10;
    let resize_at = frames * 2 / 3;

    for frame in 0..frames {
        if frame == resize_at {
            viewport = Viewport::new(viewport.width * 0.75, viewport.height);
            scene.resize(viewport)?;
        }

        match scripted_pointer(frame, frames, viewport) {
            Some(pointer) => scene.set_pointer(Some(pointer)),
            None => {
                scene.pointer_left();
            }
        }

        if frame == press_at {
            if let Some(pointer) = scene.pointer() {
                if let Some(activation) = scene.press(pointer) {
                    tracing::info!(region = activation.region, target_uri = ?activation.target, "pressed");
                }
            }
        }
        if frame == release_at {
            scene.release();
        }

        // --- 4. Render & Write Output Frame ---
        let report = scene.frame();
        let canvas = image_helper::rasterize(&report);
        let path = output_dir.join(format!("frame_{frame:04}.png"));
        image_helper::save_canvas(&path, &canvas)?;

        // Yield so the hold timer can deliver ticks between frames.
        tokio::time::sleep(FRAME_INTERVAL).await;
    }

    println!("Rendering complete. {} frames saved to {}", frames, output_dir.display());
    Ok(())
}

/// flat3d Terminal Demo - Tumbling Cube
///
/// Usage: flat3d-terminal [--config settings.json] [model.obj]
///
/// Logging: RUST_LOG sets the level. Records go to stderr, which draws over
/// the frame, unless FLAT3D_LOG=path/to/file.log redirects them to a file.
///
/// Controls:
///   - +/- / Up/Down: Zoom in / out, 0: reset zoom
///   - F: Toggle shaded faces / wireframe
///   - L: Toggle edge overlay
///   - R: Restart the rotation
///   - Q/ESC: Quit

use anyhow::{bail, Context, Result};
use flat3d_core::{obj, EngineConfig, Mesh};
use flat3d_terminal::TerminalApp;
use std::env;

fn main() -> Result<()> {
    flat3d_terminal::init_logging().context("failed to open log file")?;

    let mut config_path = None;
    let mut model_path = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            config_path = Some(args.next().context("--config needs a file path")?);
        } else if model_path.is_none() {
            model_path = Some(arg);
        } else {
            bail!("unexpected argument `{}`", arg);
        }
    }

    let config = match &config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => EngineConfig::default(),
    };

    let mesh = match &model_path {
        Some(path) => obj::load_obj(path).with_context(|| format!("failed to load model {}", path))?,
        None => Mesh::unit_cube(),
    };

    println!("{} - {} triangles, press Q to quit...", config.app_name, mesh.len());
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, config).context("failed to start renderer")?;
    app.run()?;

    Ok(())
}

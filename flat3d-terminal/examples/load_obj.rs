/// Example: Load and render an OBJ file in the terminal
///
/// Usage: cargo run --example load_obj -- path/to/model.obj
///
/// Set FLAT3D_LOG=path/to/file.log to keep log output off the frame.

use anyhow::{Context, Result};
use flat3d_core::{obj, EngineConfig, Mesh};
use flat3d_terminal::TerminalApp;
use std::env;

fn main() -> Result<()> {
    flat3d_terminal::init_logging().context("failed to open log file")?;

    let args: Vec<String> = env::args().collect();

    let mesh = if args.len() < 2 {
        eprintln!("Usage: {} <obj-file>", args[0]);
        eprintln!("\nNo OBJ file provided, using default cube...");
        Mesh::unit_cube()
    } else {
        let obj_path = &args[1];
        println!("Loading OBJ file: {}", obj_path);
        obj::load_obj(obj_path).with_context(|| format!("failed to load {}", obj_path))?
    };

    println!("Loaded {} triangles", mesh.len());
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Larger models usually need the camera further back
    let config = EngineConfig {
        zoom: 8.0,
        ..EngineConfig::default()
    };
    let mut app = TerminalApp::new(mesh, config)?;
    app.run()?;

    Ok(())
}

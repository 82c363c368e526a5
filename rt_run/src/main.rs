use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use parse_scene::parse_scene_file;
use ray_tracer::prelude::*;

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn run(args: &Args) -> std::result::Result<(), Box<dyn Error>> {
    let description = parse_scene_file(&args.scene)?;
    let settings = args.apply_to(description.settings);

    let output = args.output_path();
    info!(
        "Rendering {} into {}",
        args.scene.display(),
        output.display()
    );

    let mut image = PpmFile::new(&output, description.width, description.height);
    Renderer::new()
        .with_camera(description.camera)
        .with_tracer(RayTracer::new(&description.scene))
        .with_settings(settings)
        .render(&mut image)?;

    if let Some(interval) = args.grid {
        print_grid(&mut image, interval, Color::white())?;
        image.finish()?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level.into());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

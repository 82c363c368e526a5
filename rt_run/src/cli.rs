use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use ray_tracer::prelude::RenderSettings;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renders a YAML scene description into a PPM image.
#[derive(Debug, Parser)]
#[command(name = "rt_run")]
#[command(about = "Recursive ray tracer with adaptive supersampling")]
pub struct Args {
    /// Scene description file
    pub scene: PathBuf,

    /// Output file; defaults to the scene file name with a .ppm extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rays per pixel along each axis
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Refine only pixels whose sample corners disagree
    #[arg(long)]
    pub adaptive: bool,

    /// Subdivision depth for adaptive sampling
    #[arg(long)]
    pub adaptive_level: Option<usize>,

    /// Recursion depth for reflections and refractions
    #[arg(long)]
    pub max_level: Option<usize>,

    /// Worker threads; all cores when unset
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Overlay white grid lines every N pixels
    #[arg(long, value_name = "N")]
    pub grid: Option<usize>,

    /// Show a progress bar while rendering
    #[arg(long)]
    pub progress: bool,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}

impl Args {
    /// Command line flags take precedence over the scene file.
    pub fn apply_to(&self, settings: RenderSettings) -> RenderSettings {
        let mut settings = settings;
        if let Some(samples) = self.samples {
            settings.samples_per_axis = samples;
        }
        if self.adaptive {
            settings.adaptive = true;
        }
        if let Some(level) = self.adaptive_level {
            settings.adaptive_max_level = level;
        }
        if let Some(level) = self.max_level {
            settings.max_level = level;
        }
        if self.threads.is_some() {
            settings.threads = self.threads;
        }
        settings.show_progress = self.progress;
        settings
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.scene.with_extension("ppm"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_scene_settings() {
        let args = Args::parse_from([
            "rt_run",
            "scenes/spheres.yaml",
            "--samples",
            "8",
            "--adaptive",
            "--threads",
            "2",
            "--progress",
        ]);
        let scene_settings = RenderSettings {
            samples_per_axis: 3,
            max_level: 5,
            ..Default::default()
        };

        let settings = args.apply_to(scene_settings);
        assert_eq!(settings.samples_per_axis, 8);
        assert!(settings.adaptive);
        assert_eq!(settings.max_level, 5);
        assert_eq!(settings.threads, Some(2));
        assert!(settings.show_progress);
    }

    #[test]
    fn scene_settings_are_kept_without_flags() {
        let args = Args::parse_from(["rt_run", "scene.yaml"]);
        let scene_settings = RenderSettings {
            samples_per_axis: 4,
            adaptive: true,
            threads: Some(3),
            ..Default::default()
        };
        assert_eq!(args.apply_to(scene_settings), scene_settings);
        assert_eq!(args.output_path(), PathBuf::from("scene.ppm"));
    }

    #[test]
    fn explicit_output_path() {
        let args = Args::parse_from(["rt_run", "scene.yaml", "-o", "out/image.ppm", "--log-level", "debug", "--grid", "50"]);
        assert_eq!(args.output_path(), PathBuf::from("out/image.ppm"));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
        assert_eq!(args.grid, Some(50));
    }
}

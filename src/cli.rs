//! Command-line flags for the `scenefade` binary.

use std::path::PathBuf;

use clap::Parser;
use scenefade::{AppConfig, MatcapSource};

#[derive(Parser, Debug, Clone)]
#[command(name = "scenefade")]
#[command(about = "Scroll to crossfade between particle scenes", long_about = None)]
pub struct Cli {
    /// Window title
    #[arg(long, default_value = "Scenefade")]
    pub title: String,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Matcap image for one scene; repeat for more scenes.
    /// Without any, three procedural matcaps (red, green, gray) are used.
    #[arg(long = "matcap", value_name = "PATH")]
    pub matcaps: Vec<PathBuf>,

    /// Spheres per scene
    #[arg(long, default_value_t = 50)]
    pub instances: usize,

    /// Distance of each sphere from the scene origin
    #[arg(long, default_value_t = 2.0)]
    pub radius: f32,

    /// Crossfade duration in seconds
    #[arg(long, default_value_t = 1.5)]
    pub duration: f32,

    /// Seed for particle placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Upper bound on the device pixel ratio
    #[arg(long, default_value_t = 2.0)]
    pub max_pixel_ratio: f64,

    /// WGSL file replacing the built-in compositor, reloaded on save
    #[arg(long, value_name = "PATH")]
    pub composite_shader: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> AppConfig {
        let mut config = AppConfig::new()
            .title(self.title)
            .size(self.width, self.height)
            .instances_per_scene(self.instances)
            .shell_radius(self.radius)
            .transition_duration(self.duration)
            .max_pixel_ratio(self.max_pixel_ratio);

        if !self.matcaps.is_empty() {
            config = config.matcaps(self.matcaps.into_iter().map(MatcapSource::file).collect());
        }
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        if let Some(path) = self.composite_shader {
            config = config.composite_shader(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("scenefade").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_app_config() {
        let config = parse(&[]).into_config();
        let default = AppConfig::default();
        assert_eq!(config.title, default.title);
        assert_eq!(config.matcaps, default.matcaps);
        assert_eq!(config.layout, default.layout);
        assert_eq!(config.transition, default.transition);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn repeated_matcaps_become_scenes() {
        let config = parse(&["--matcap", "a.png", "--matcap", "b.png"]).into_config();
        assert_eq!(
            config.matcaps,
            vec![MatcapSource::file("a.png"), MatcapSource::file("b.png")]
        );
    }

    #[test]
    fn numeric_flags_reach_the_config() {
        let config = parse(&[
            "--instances",
            "12",
            "--radius",
            "3.5",
            "--duration",
            "0.5",
            "--seed",
            "9",
        ])
        .into_config();
        assert_eq!(config.layout.instances_per_scene, 12);
        assert_eq!(config.layout.shell_radius, 3.5);
        assert_eq!(config.transition.duration, 0.5);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn zero_instances_fail_validation() {
        let config = parse(&["--instances", "0"]).into_config();
        assert!(config.validate().is_err());
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use folco_composer::{
    DesignProfile, DroppedItem, ExportConfig, Exporter, PRESETS, Preset, ProfileError,
    SymbolLibrary, VisualParameters, handle_drop, load_image,
};

#[derive(Parser, Debug)]
#[command(name = "folco", version, about = "Design custom folder icons and apply them to folders")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the design to a 470x395 PNG
    Export {
        output: PathBuf,
        #[command(flatten)]
        design: DesignArgs,
    },
    /// Set the design as the icon of folders (paths or file:// URLs)
    Apply {
        #[arg(required = true)]
        folders: Vec<String>,
        #[command(flatten)]
        design: DesignArgs,
    },
    /// List the built-in color presets
    Presets,
    /// List the built-in symbols
    Symbols,
    /// Print the JSON schema of design profiles
    #[cfg(feature = "jsonschema")]
    Schema,
}

#[derive(Args, Debug)]
struct DesignArgs {
    /// Design profile (JSON) to start from
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Built-in color preset
    #[arg(long)]
    preset: Option<String>,
    /// Folder body color (#RRGGBB or #RRGGBBAA)
    #[arg(long)]
    base: Option<String>,
    /// Folder tab color
    #[arg(long)]
    tab: Option<String>,
    /// Symbol color
    #[arg(long)]
    overlay_color: Option<String>,
    /// Image drawn over the folder
    #[arg(long, conflicts_with = "symbol")]
    image: Option<PathBuf>,
    /// Symbol drawn over the folder (see `folco symbols`)
    #[arg(long)]
    symbol: Option<String>,
    /// Overlay opacity, 0 to 1
    #[arg(long)]
    opacity: Option<f32>,
    /// Overlay scale, 0.2 to 5
    #[arg(long)]
    scale: Option<f32>,
    /// Horizontal overlay offset, -200 to 200
    #[arg(long, allow_negative_numbers = true)]
    offset_x: Option<f32>,
    /// Vertical overlay offset, -200 to 200
    #[arg(long, allow_negative_numbers = true)]
    offset_y: Option<f32>,
    /// Symbol weight, 1 (ultralight) to 9 (black)
    #[arg(long)]
    weight: Option<f32>,
    /// Imprint the image in a darker shade of the folder
    #[arg(long)]
    advanced: bool,
    /// Directory for the cached icon PNG
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

impl DesignArgs {
    /// The profile (or the launch defaults) with every flag applied on top.
    fn build(&self) -> Result<VisualParameters, ProfileError> {
        let mut params = match &self.profile {
            Some(path) => DesignProfile::load(path)?,
            None => VisualParameters::default(),
        };

        if let Some(name) = &self.preset {
            let preset = Preset::find(name).ok_or_else(|| ProfileError::UnknownPreset(name.clone()))?;
            params.apply_preset(preset);
        }
        if let Some(color) = &self.base {
            params.base_color = color.parse()?;
        }
        if let Some(color) = &self.tab {
            params.tab_color = color.parse()?;
        }
        if let Some(color) = &self.overlay_color {
            params.overlay_color = color.parse()?;
        }

        if let Some(path) = &self.image {
            params.set_image(load_image(path)?);
        }
        if let Some(name) = &self.symbol {
            if !SymbolLibrary::builtin().contains(name) {
                return Err(ProfileError::UnknownSymbol(name.clone()));
            }
            params.set_symbol(name.clone());
        }

        if let Some(opacity) = self.opacity {
            params.set_overlay_opacity(opacity);
        }
        if let Some(scale) = self.scale {
            params.set_overlay_scale(scale);
        }
        if self.offset_x.is_some() || self.offset_y.is_some() {
            params.set_overlay_offset(
                self.offset_x.unwrap_or(params.overlay_offset_x),
                self.offset_y.unwrap_or(params.overlay_offset_y),
            );
        }
        if let Some(weight) = self.weight {
            params.set_symbol_weight(weight);
        }
        if self.advanced {
            params.use_advanced_rendering = true;
        }

        Ok(params)
    }

    fn exporter(&self) -> Exporter {
        let config = match &self.cache_dir {
            Some(dir) => ExportConfig::with_cache_dir(dir),
            None => ExportConfig::default(),
        };
        Exporter::new(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Export { output, design } => {
            let params = design.build().context("Invalid design")?;
            design
                .exporter()
                .export_to_file(&params, &output)
                .with_context(|| format!("Failed to export {}", output.display()))?;
            println!("{}", output.display());
        }
        Command::Apply { folders, design } => {
            let params = design.build().context("Invalid design")?;
            let items: Vec<DroppedItem> = folders.iter().map(|f| DroppedItem::from_arg(f)).collect();

            let exporter = design.exporter();
            log::debug!("caching icon at {}", exporter.config().cache_path().display());
            let outcome = handle_drop(&exporter, &params, &items);
            for folder in &outcome.applied {
                println!("{}", folder.display());
            }
            if let Some(error) = outcome.error {
                bail!(error);
            }
        }
        Command::Presets => {
            for preset in PRESETS {
                println!("{:<10} base {}  tab {}", preset.name, preset.base, preset.tab);
            }
        }
        Command::Symbols => {
            for name in SymbolLibrary::builtin().names() {
                println!("{name}");
            }
        }
        #[cfg(feature = "jsonschema")]
        Command::Schema => {
            let schema = schemars::schema_for!(DesignProfile);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(args: &[&str]) -> DesignArgs {
        let argv: Vec<&str> = ["folco", "export", "out.png"]
            .into_iter()
            .chain(args.iter().copied())
            .collect();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Export { design, .. } => design,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn flags_are_applied_over_the_defaults() {
        let params = design(&["--symbol", "star", "--base", "#FF0000", "--offset-x", "-40"])
            .build()
            .unwrap();
        assert_eq!(params.symbol_name, "star");
        assert_eq!(params.base_color.to_hex(), "#FF0000");
        assert_eq!(params.overlay_offset_x, -40.0);
    }

    #[test]
    fn unknown_symbol_flag_is_rejected() {
        let err = design(&["--symbol", "no.such.glyph"]).build().unwrap_err();
        assert!(matches!(err, ProfileError::UnknownSymbol(ref name) if name == "no.such.glyph"));
    }

    #[test]
    fn image_and_symbol_conflict() {
        let argv = ["folco", "export", "out.png", "--image", "a.png", "--symbol", "star"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}

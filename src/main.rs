use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use spriteforge::{
    imaging,
    logger::{self, LogLevel, LoggerConfig},
    models::DEFAULT_SHIP_PROMPT,
    smoke, AssetClient, Config, Error, GenerationRequest, ImageClient, Result, StripOptions,
    StylePreset,
};

/// Generate sprites, strip their backgrounds, and poke the local asset server.
#[derive(Parser, Debug)]
#[command(name = "spriteforge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an image from a text prompt and save it as PNG.
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,

        #[arg(short, long, default_value = "generated_ship.png", value_name = "PATH")]
        output: PathBuf,
    },

    /// Make near-white pixels transparent and resize to a fixed height.
    Strip {
        #[arg(default_value = "generated_ship.png", value_name = "INPUT")]
        input: PathBuf,

        #[arg(default_value = "player_ship.png", value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        strip: StripArgs,
    },

    /// Generate a ship, then strip its background.
    Ship {
        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        strip: StripArgs,

        #[arg(long, default_value = "generated_ship.png", value_name = "PATH")]
        generated: PathBuf,

        #[arg(short, long, default_value = "player_ship.png", value_name = "PATH")]
        output: PathBuf,
    },

    /// Send the sprite and UI test requests to the local asset server.
    SmokeTest {
        /// Overrides ASSET_SERVER_URL.
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Check whether the local asset server reports itself healthy.
    Health {
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// List known engines and style presets.
    Presets,
}

#[derive(Args, Debug)]
struct GenerationArgs {
    #[arg(short, long, default_value = DEFAULT_SHIP_PROMPT)]
    prompt: String,

    #[arg(long, default_value = "digital-art", value_name = "PRESET")]
    style: StylePreset,

    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 1024)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    steps: u32,

    #[arg(long, default_value_t = 7.0)]
    cfg_scale: f32,
}

impl GenerationArgs {
    fn request(&self) -> GenerationRequest {
        GenerationRequest::from_prompt(self.prompt.as_str())
            .with_size(self.width, self.height)
            .with_style(self.style)
            .with_steps(self.steps)
            .with_cfg_scale(self.cfg_scale)
    }
}

#[derive(Args, Debug)]
struct StripArgs {
    /// Channels must all be above this to become transparent.
    #[arg(long, default_value_t = imaging::LIGHT_THRESHOLD)]
    threshold: u8,

    #[arg(long = "target-height", default_value_t = imaging::TARGET_HEIGHT)]
    target_height: u32,
}

impl StripArgs {
    fn options(&self) -> StripOptions {
        StripOptions::new()
            .with_threshold(self.threshold)
            .with_target_height(self.target_height)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("{}", e);
    }

    if dotenv_loaded {
        log::debug!(".env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if cli.verbose {
        logger::log_config_info(&config);
    }

    match cli.command {
        Command::Generate { generation, output } => {
            let client = AssetClient::new(config)?;
            client
                .image()
                .generate_to_file(&generation.request(), &output)
                .await?;
        }
        Command::Strip {
            input,
            output,
            strip,
        } => {
            imaging::strip_background_file(&input, &output, &strip.options())?;
        }
        Command::Ship {
            generation,
            strip,
            generated,
            output,
        } => {
            let client = AssetClient::new(config)?;
            let sprite = client
                .generate_and_strip(&generation.request(), &generated, &output, &strip.options())
                .await?;
            log::info!("Ship sprite ready at {}", sprite.display());
        }
        Command::SmokeTest { server } => {
            if let Some(url) = server {
                config.asset_server = config.asset_server.with_base_url(url);
            }
            let client = AssetClient::new(config)?;
            let mut first = true;
            smoke::run_smoke_test(client.assets(), |result| {
                if !first {
                    println!();
                }
                first = false;
                print!("{}", smoke::render_result(result));
            })
            .await?;
        }
        Command::Health { server } => {
            if let Some(url) = server {
                config.asset_server = config.asset_server.with_base_url(url);
            }
            let client = AssetClient::new(config)?;
            if !client.assets().check_health().await {
                return Err(Error::remote(
                    None,
                    format!("asset server at {} is not healthy", client.assets().base_url()),
                ));
            }
            println!("{} is healthy", client.assets().base_url());
        }
        Command::Presets => {
            println!("Engines:");
            for engine in ImageClient::supported_engines() {
                println!(
                    "  {} - {} ({}x{})",
                    engine.id, engine.name, engine.native_size.0, engine.native_size.1
                );
            }
            println!("Style presets:");
            for preset in StylePreset::all() {
                println!("  {}", preset);
            }
        }
    }

    Ok(())
}

//! gltf-tool - inspect, convert and garbage-collect glTF documents

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use gltf_loader::CoordinateSystem;
use gltf_tools::ConvertOptions;

#[derive(Parser)]
#[command(name = "gltf-tool")]
#[command(about = "Inspect and convert glTF 2.0 documents")]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print asset information, entity counts and extensions
    Info {
        /// Input .gltf or .glb file
        file: PathBuf,
    },

    /// Write a document as JSON or GLB, chosen by the output extension
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// JSON indent width; negative for a single line
        #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
        indent: i32,

        /// Embed external buffers as data URIs
        #[arg(long)]
        embed: bool,

        /// Remove unreferenced entities first
        #[arg(long)]
        gc: bool,
    },

    /// Remove unreferenced entities
    Gc { input: PathBuf, output: PathBuf },

    /// Print the debug rendering of a document
    Dump { file: PathBuf },

    /// Convert the default scene and print the scene tree
    Scene {
        file: PathBuf,

        /// Target coordinate system (zup, yup, zup-left, yup-left)
        #[arg(long, default_value_t = CoordinateSystem::ZupRight)]
        coordinate_system: CoordinateSystem,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(command: Commands) -> gltf_loader::Result<()> {
    match command {
        Commands::Info { file } => {
            let root = gltf_tools::read_document(&file)?;
            print!("{}", gltf_tools::info(&root));
        }
        Commands::Convert {
            input,
            output,
            indent,
            embed,
            gc,
        } => {
            gltf_tools::convert(&input, &output, ConvertOptions { indent, embed, gc })?;
        }
        Commands::Gc { input, output } => {
            let removed = gltf_tools::gc(&input, &output)?;
            println!("Removed {} entities", removed);
        }
        Commands::Dump { file } => {
            let root = gltf_tools::read_document(&file)?;
            print!("{}", gltf_tools::dump(&root));
        }
        Commands::Scene {
            file,
            coordinate_system,
        } => {
            print!("{}", gltf_tools::scene(&file, coordinate_system)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gltf-tool: {}", e);
            ExitCode::FAILURE
        }
    }
}

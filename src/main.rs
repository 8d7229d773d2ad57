//! Host-side helper: `serve` builds the WASM site and serves `static/` locally,
//! `check-frames` verifies that a directory holds the complete frame sequence.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use clap::{Parser, Subcommand};
use hero_wasm::config::{DEFAULT_EXTENSION, DEFAULT_INDEX_WIDTH, DEFAULT_TOTAL_FRAMES};
use hero_wasm::SequenceConfig;

#[derive(Parser, Debug)]
#[command(name = "hero_wasm", about = "Hero frame sequence site helper")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build the wasm bundle into static/pkg and serve static/ locally.
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Report frames missing from an exported sequence directory.
    CheckFrames {
        dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TOTAL_FRAMES)]
        total: usize,
        #[arg(long, default_value = "frame_")]
        prefix: String,
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        extension: String,
        #[arg(long, default_value_t = DEFAULT_INDEX_WIDTH)]
        index_width: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Cmd::Serve { port } => serve(port),
        Cmd::CheckFrames {
            dir,
            total,
            prefix,
            extension,
            index_width,
        } => {
            let config = SequenceConfig {
                total_frames: total,
                base_path: prefix,
                extension,
                index_width,
                max_in_flight: None,
            };
            check_frames(&dir, &config)
        }
    }
}

fn serve(port: u16) -> ExitCode {
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the site may serve stale artifacts.");
        }
    }

    println!("Launching local server at http://127.0.0.1:{port} …");
    let status = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .status();
    match status {
        Ok(st) if st.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Indices whose file is absent from `dir`.
fn missing_frames(dir: &Path, config: &SequenceConfig) -> Vec<usize> {
    (0..config.total_frames)
        .filter(|&index| !dir.join(config.frame_file_name(index)).is_file())
        .collect()
}

fn check_frames(dir: &Path, config: &SequenceConfig) -> ExitCode {
    if let Err(err) = config.validate() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    if !dir.is_dir() {
        eprintln!("{} is not a directory", dir.display());
        return ExitCode::FAILURE;
    }

    let missing = missing_frames(dir, config);
    if missing.is_empty() {
        println!(
            "All {} frames present in {}",
            config.total_frames,
            dir.display()
        );
        return ExitCode::SUCCESS;
    }

    eprintln!(
        "{} of {} frames missing from {}:",
        missing.len(),
        config.total_frames,
        dir.display()
    );
    for index in &missing {
        eprintln!("  {}", config.frame_file_name(*index));
    }
    ExitCode::FAILURE
}

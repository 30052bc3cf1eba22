//! Local CLI for exercising the layout engine outside of the FFI boundary:
//! reads a pattern file from disk, runs the full pipeline, writes the
//! serialized layout to stdout or a given output path.

use std::fs;
use std::path::Path;

use chrono::Utc;
use crochet_graph_layout::run_layout;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let input_path = match args.get(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: crochet-layout-cli <input-file> [output-file]");
            std::process::exit(1);
        }
    };

    let content = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("failed to read {input_path}: {e}");
            std::process::exit(1);
        }
    };

    let started_at = Utc::now();
    let output = match run_layout(&content) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("layout failed: {e}");
            std::process::exit(1);
        }
    };
    let elapsed = Utc::now().signed_duration_since(started_at);
    log::info!("laid out {input_path} in {}ms", elapsed.num_milliseconds());

    match args.get(2) {
        Some(output_path) => {
            if let Some(parent) = Path::new(output_path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).expect("failed to create output directory");
                }
            }
            fs::write(output_path, output).expect("failed to write output file");
        }
        None => print!("{output}"),
    }
}

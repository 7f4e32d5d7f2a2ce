//! # coco
//!
//! Compile, run and inspect `.co` sources.
//!
//! - Run a script: `coco main.co arg1 arg2`
//! - Compile a tree: `coco -c -o lib src`
//! - Inspect: `coco -t file.co`, `coco -a file.co`
//! - Interactive: `coco -i`

fn main() {
    env_logger::init();
    coco::cli::run_cli();
}

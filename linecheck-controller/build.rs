//! Build script for linecheck-controller
//!
//! - Sets up linker search paths for memory.x
//! - Validates ../harness.toml and generates the roster source

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use linecheck_config::{codegen, report, HarnessConfig, HARNESS_FILE};

fn main() {
    setup_linker();
    generate_roster();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Load harness.toml and write the Controller roster into OUT_DIR
fn generate_roster() {
    let harness = Path::new("..").join(HARNESS_FILE);
    println!("cargo:rerun-if-changed={}", harness.display());

    let config = match HarnessConfig::load(&harness) {
        Ok(config) => config,
        Err(e) => panic!(
            "{}",
            report::boxed("ERROR: harness.toml rejected", &e.to_string())
        ),
    };

    let mut src = String::new();
    codegen::write_controller(&config, &mut src).unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("roster.rs"), src).unwrap();

    println!(
        "cargo:warning=harness.toml validated: {} lines",
        config.lines.len()
    );
}

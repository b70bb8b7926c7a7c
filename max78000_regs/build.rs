use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // cortex-m-rt pulls the interrupt handler names out of device.x when linking
    if env::var_os("CARGO_FEATURE_RT").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set by cargo"));
        fs::copy("device.x", out.join("device.x")).expect("could not copy device.x");
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=device.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}

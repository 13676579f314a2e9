use std::{env, fs, path::PathBuf};

// The SROM blob is PixArt's and not part of this repository. Point
// PMW3389_SROM at a raw binary dump of it.
fn main() {
    println!("cargo:rerun-if-env-changed=PMW3389_SROM");

    let Some(source) = env::var_os("PMW3389_SROM") else {
        panic!("set PMW3389_SROM to the path of the PMW3389 SROM image");
    };
    let source = PathBuf::from(source);
    println!("cargo:rerun-if-changed={}", source.display());

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::copy(&source, out_dir.join("pmw3389_srom.bin"))
        .unwrap_or_else(|e| panic!("cannot copy {}: {}", source.display(), e));
}

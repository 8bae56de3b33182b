//! Build script that compiles every grammar model under `grammars/` into a
//! parser module.
//!
//! `grammars/<name>.json` becomes `$OUT_DIR/<name>.rs`, pulled into the
//! crate with `include!` from the module of the same name. Banners are left
//! off so the generated files only change when a grammar does.
//!
//! Set `RDGEN_DUMP_EBNF=1` to also write each grammar's EBNF rendering to
//! `target/rdgen/`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rdgen_emitter::{generate, EmitterOptions, Model};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let grammars = Path::new("grammars");

    let mut models: Vec<PathBuf> = fs::read_dir(grammars)
        .expect("Failed to read grammars directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    models.sort();

    for path in &models {
        compile(path, &out_dir);
        println!("cargo:rerun-if-changed={}", path.display());
    }
    println!("cargo:rerun-if-changed={}", grammars.display());
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RDGEN_DUMP_EBNF");
}

fn compile(path: &Path, out_dir: &Path) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .expect("grammar file names are UTF-8");
    let json = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    let model = Model::from_json(&json).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));

    let options = EmitterOptions {
        emit_rules: true,
        sources: vec![path.display().to_string()],
        ..EmitterOptions::default()
    };
    let parser = generate(&model, &options).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));

    let target = out_dir.join(format!("{}.rs", stem));
    fs::write(&target, parser.to_source())
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", target.display(), e));
}

//! Packs `fonts/*.map` into `$OUT_DIR/fontdir.zip` for the `bundled-fonts` feature.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=fonts");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let archive_path = out_dir.join("fontdir.zip");

    let mut maps: Vec<PathBuf> = Vec::new();
    if env::var_os("CARGO_FEATURE_BUNDLED_FONTS").is_some() {
        let font_dir = Path::new(&env::var("CARGO_MANIFEST_DIR")?).join("fonts");
        for entry in fs::read_dir(&font_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "map") {
                maps.push(path);
            }
        }
        maps.sort();
    }

    let file = fs::File::create(&archive_path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for path in &maps {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("font map with a non UTF-8 name")?;
        zip.start_file(name, options)?;
        zip.write_all(&fs::read(path)?)?;
    }
    zip.finish()?;

    Ok(())
}

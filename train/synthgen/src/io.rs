use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use image::{ImageFormat, RgbImage, codecs::jpeg::JpegEncoder};
use log::{info, warn};
use symbol_layout::{Annotation, Asset, Sprite, Symbol, Taxonomy, annotation::write_annotations};

use crate::config::{GenCfg, OutputFormat};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Decodes every raster image in `dir`, in file-name order.
///
/// Undecodable and zero-sized files are skipped with a warning.
pub fn load_assets(dir: &Path) -> anyhow::Result<Vec<Asset>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let img = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        if img.width() == 0 || img.height() == 0 {
            warn!("Skipping empty image {}", path.display());
            continue;
        }
        assets.push(Asset {
            name,
            sprite: Sprite::from_dynamic(img),
        });
    }
    Ok(assets)
}

/// Loads labelled symbols. Every file name must resolve to a class.
pub fn load_symbols(dir: &Path, taxonomy: &Taxonomy) -> anyhow::Result<Vec<Symbol>> {
    let assets = load_assets(dir)?;
    let mut unknown = Vec::new();
    let mut symbols = Vec::with_capacity(assets.len());
    for asset in assets {
        match taxonomy.class_id_from_file_name(&asset.name) {
            Ok(class_id) => symbols.push(Symbol { asset, class_id }),
            Err(e) => unknown.push(e.to_string()),
        }
    }
    if !unknown.is_empty() {
        bail!(
            "{} symbol file(s) in {} have no known class:\n  {}",
            unknown.len(),
            dir.display(),
            unknown.join("\n  ")
        );
    }
    Ok(symbols)
}

/// Context images are optional; a missing directory yields none.
pub fn load_contexts(dir: &Path) -> anyhow::Result<Vec<Asset>> {
    if !dir.is_dir() {
        warn!(
            "Context directory {} not found, continuing without clutter",
            dir.display()
        );
        return Ok(Vec::new());
    }
    load_assets(dir)
}

pub fn init_output(cfg: &GenCfg) -> anyhow::Result<()> {
    for dir in [&cfg.out_images, &cfg.out_labels] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

/// `classes.txt`: general class names, one per line, line number = class ID.
pub fn write_class_names(path: &Path, taxonomy: &Taxonomy) -> anyhow::Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    for name in taxonomy.names() {
        writeln!(out, "{name}")?;
    }
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} class names to {}", taxonomy.names().len(), path.display());
    Ok(())
}

pub fn save_image(img: &RgbImage, path: &Path, cfg: &GenCfg) -> anyhow::Result<()> {
    let result = match cfg.format {
        OutputFormat::Jpg => File::create(path)
            .map_err(image::ImageError::IoError)
            .and_then(|file| {
                let mut out = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut out, cfg.jpeg_quality)
                    .encode_image(img)?;
                out.flush().map_err(image::ImageError::IoError)
            }),
        OutputFormat::Png => img.save_with_format(path, ImageFormat::Png),
    };
    result.map_err(|e| discard_partial(path, e.into()))
}

pub fn save_annotations(annotations: &[Annotation], path: &Path) -> anyhow::Result<()> {
    let result = File::create(path).and_then(|file| {
        let mut out = BufWriter::new(file);
        write_annotations(&mut out, annotations)?;
        out.flush()
    });
    result.map_err(|e| discard_partial(path, e.into()))
}

fn discard_partial(path: &Path, err: anyhow::Error) -> anyhow::Error {
    let _ = fs::remove_file(path);
    err.context(format!("writing {}", path.display()))
}

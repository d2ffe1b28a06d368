use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::ValueEnum;
use image::Rgb;
use serde::Deserialize;
use symbol_layout::{
    SceneCfg,
    placement::{CONTEXT_TRIES, SYMBOL_TRIES},
};

/// Digits in every sample index; fixed so names line up across runs.
pub const INDEX_WIDTH: usize = 3;
/// Largest run whose indices fit in [`INDEX_WIDTH`] digits.
pub const MAX_IMAGES: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenCfg {
    pub symbols_dir: PathBuf,
    pub context_dir: PathBuf,
    pub out_images: PathBuf,
    pub out_labels: PathBuf,
    pub num_images: u32,
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    pub symbol_tries: u32,
    pub context_tries: u32,
    pub format: OutputFormat,
    pub jpeg_quality: u8,
    pub prefix: String,
    /// Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for GenCfg {
    fn default() -> Self {
        Self {
            symbols_dir: PathBuf::from("ground_truth_dilt_labelled"),
            context_dir: PathBuf::from("context_images"),
            out_images: PathBuf::from("synthetic_dataset"),
            out_labels: PathBuf::from("synthetic_labels"),
            num_images: 100,
            width: 1700,
            height: 800,
            background: [230, 178, 172],
            symbol_tries: SYMBOL_TRIES,
            context_tries: CONTEXT_TRIES,
            format: OutputFormat::Jpg,
            jpeg_quality: 95,
            prefix: "synthetic".to_string(),
            seed: None,
        }
    }
}

impl GenCfg {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("canvas must be non-empty, got {}x{}", self.width, self.height);
        }
        if self.symbol_tries == 0 || self.context_tries == 0 {
            bail!("retry budgets must be at least 1");
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            bail!("jpeg quality must be in 1..=100, got {}", self.jpeg_quality);
        }
        if self.num_images > MAX_IMAGES {
            bail!(
                "at most {MAX_IMAGES} images per run, got {}",
                self.num_images
            );
        }
        if self.prefix.is_empty() {
            bail!("file prefix must not be empty");
        }
        Ok(())
    }

    pub fn scene(&self) -> SceneCfg {
        SceneCfg {
            width: self.width,
            height: self.height,
            background: Rgb(self.background),
            symbol_tries: self.symbol_tries,
            context_tries: self.context_tries,
        }
    }

    pub fn stem(&self, index: u32) -> String {
        format!("{}_{index:0INDEX_WIDTH$}", self.prefix)
    }
}

/// Parses `R,G,B` into a colour triple.
pub fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err("colour must be in format 'R,G,B'".to_string());
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid colour component '{part}'"))?;
    }
    Ok(rgb)
}

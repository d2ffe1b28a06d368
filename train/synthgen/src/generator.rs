use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::Context;
use log::info;
use rand::{RngCore, SeedableRng, rngs::SmallRng};
use rand_xoshiro::SplitMix64;
use symbol_layout::{Library, Scene, Taxonomy};

use crate::{config::GenCfg, io, record::JsonRecord};

const PROGRESS_EVERY: u32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub images: u32,
    pub placed: usize,
    pub skipped: usize,
}

pub struct DatasetGenerator<'a> {
    pub cfg: &'a GenCfg,
    library: &'a Library,
    writer: Option<BufWriter<File>>,
}

impl<'a> DatasetGenerator<'a> {
    pub fn new(cfg: &'a GenCfg, library: &'a Library) -> Self {
        Self {
            cfg,
            library,
            writer: None,
        }
    }

    /// Creates output directories, `classes.txt` and the manifest writer.
    pub fn init_output(&mut self, taxonomy: &Taxonomy) -> anyhow::Result<()> {
        io::init_output(self.cfg)?;
        io::write_class_names(&self.cfg.out_labels.join("classes.txt"), taxonomy)?;
        if self.writer.is_none() {
            let path = self.cfg.out_labels.join("manifest.jsonl");
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            self.writer = Some(BufWriter::with_capacity(1 << 20, file));
        }
        Ok(())
    }

    /// Generates `num_images` samples. Per-image seeds come from one
    /// SplitMix64 stream seeded with `seed`.
    pub fn run(&mut self, seed: u64) -> anyhow::Result<RunSummary> {
        let scene_cfg = self.cfg.scene();
        let mut seeds = SplitMix64::seed_from_u64(seed);
        let mut summary = RunSummary::default();

        for i in 0..self.cfg.num_images {
            let image_seed = seeds.next_u64();
            let mut rng = SmallRng::seed_from_u64(image_seed);
            let scene = self.library.compose(&scene_cfg, &mut rng);

            summary.placed += scene.annotations.len();
            summary.skipped += scene.skipped.len();
            let image_name = self.write_sample(i, image_seed, &scene)?;
            summary.images += 1;

            if i == 0 || (i + 1) % PROGRESS_EVERY == 0 {
                info!("Generated {}/{} -> {image_name}", i + 1, self.cfg.num_images);
            }
        }

        self.finalize_output()
            .context("flushing manifest.jsonl")?;
        Ok(summary)
    }

    fn write_sample(&mut self, index: u32, seed: u64, scene: &Scene) -> anyhow::Result<String> {
        let stem = self.cfg.stem(index);
        let image_name = format!("{stem}.{}", self.cfg.format.extension());
        let image_path = self.cfg.out_images.join(&image_name);
        let label_path = self.cfg.out_labels.join(format!("{stem}.txt"));

        io::save_image(&scene.canvas, &image_path, self.cfg)?;
        if let Err(e) = io::save_annotations(&scene.annotations, &label_path) {
            // no image without its label file
            let _ = std::fs::remove_file(&image_path);
            return Err(e);
        }

        let rec = JsonRecord {
            schema: "v1",
            image: image_path.display().to_string(),
            labels: label_path.display().to_string(),
            seed,
            class_ids: scene.annotations.iter().map(|a| a.class_id).collect(),
            boxes: scene.boxes.clone(),
            skipped: scene.skipped.iter().map(|s| s.name.clone()).collect(),
            clutter: scene.clutter.clone(),
        };
        if let Some(ref mut writer) = self.writer {
            serde_json::to_writer(&mut *writer, &rec)?;
            writeln!(writer)?;
        }

        Ok(image_name)
    }

    pub fn finalize_output(&mut self) -> std::io::Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.into_inner()?.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for DatasetGenerator<'_> {
    fn drop(&mut self) {
        let _ = self.finalize_output();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgb, RgbImage};
    use symbol_layout::{Annotation, Asset, Sprite, Symbol};
    use tempfile::tempdir;

    use super::*;
    use crate::config::OutputFormat;

    fn library() -> Library {
        let taxonomy = Taxonomy::builtin();
        let symbols = ["pump_on_up.png", "chiller_on.png", "fan_right.png"]
            .iter()
            .enumerate()
            .map(|(i, name)| Symbol {
                asset: Asset {
                    name: name.to_string(),
                    sprite: Sprite::Opaque(RgbImage::from_pixel(
                        30 + 10 * i as u32,
                        20,
                        Rgb([0, 0, 0]),
                    )),
                },
                class_id: taxonomy.class_id_from_file_name(name).unwrap(),
            })
            .collect();
        Library::new(symbols, Vec::new()).unwrap()
    }

    fn cfg(root: &std::path::Path, num_images: u32) -> GenCfg {
        GenCfg {
            out_images: root.join("images"),
            out_labels: root.join("labels"),
            num_images,
            width: 320,
            height: 200,
            format: OutputFormat::Png,
            ..GenCfg::default()
        }
    }

    fn listing(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn five_images_use_one_naming_scheme() {
        let root = tempdir().unwrap();
        let cfg = cfg(root.path(), 5);
        let lib = library();
        let mut generator = DatasetGenerator::new(&cfg, &lib);
        generator.init_output(Taxonomy::builtin()).unwrap();
        let summary = generator.run(17).unwrap();

        assert_eq!(summary.images, 5);
        assert_eq!(summary.placed + summary.skipped, 15);
        assert_eq!(
            listing(&cfg.out_images),
            (0..5).map(|i| format!("synthetic_00{i}.png")).collect::<Vec<_>>()
        );
        let mut expected: Vec<_> = (0..5)
            .map(|i| format!("synthetic_00{i}.txt"))
            .collect();
        expected.extend(["classes.txt".to_string(), "manifest.jsonl".to_string()]);
        expected.sort();
        assert_eq!(listing(&cfg.out_labels), expected);

        let manifest = fs::read_to_string(cfg.out_labels.join("manifest.jsonl")).unwrap();
        assert_eq!(manifest.lines().count(), 5);
        let first: serde_json::Value =
            serde_json::from_str(manifest.lines().next().unwrap()).unwrap();
        assert_eq!(first["schema"], "v1");
    }

    #[test]
    fn manifest_records_match_label_files() {
        let root = tempdir().unwrap();
        let cfg = cfg(root.path(), 4);
        let lib = library();
        let mut generator = DatasetGenerator::new(&cfg, &lib);
        generator.init_output(Taxonomy::builtin()).unwrap();
        generator.run(29).unwrap();

        let manifest = fs::read_to_string(cfg.out_labels.join("manifest.jsonl")).unwrap();
        let num_classes = Taxonomy::builtin().names().len() as u64;
        for (i, line) in manifest.lines().enumerate() {
            let rec: serde_json::Value = serde_json::from_str(line).unwrap();
            let class_ids = rec["class_ids"].as_array().unwrap();
            let boxes = rec["boxes"].as_array().unwrap();
            assert_eq!(boxes.len(), class_ids.len());
            assert!(class_ids.iter().all(|id| id.as_u64().unwrap() < num_classes));
            let skipped = rec.get("skipped").map_or(0, |s| s.as_array().unwrap().len());
            assert_eq!(class_ids.len() + skipped, 3);

            let label = cfg.out_labels.join(cfg.stem(i as u32) + ".txt");
            assert_eq!(rec["labels"], label.display().to_string());
            let text = fs::read_to_string(label).unwrap();
            let ids: Vec<_> = Annotation::parse_all(&text)
                .unwrap()
                .iter()
                .map(|a| serde_json::Value::from(a.class_id))
                .collect();
            assert_eq!(&ids, class_ids);
        }
    }

    #[test]
    fn failed_label_write_removes_its_image() {
        let root = tempdir().unwrap();
        let cfg = cfg(root.path(), 1);
        let lib = library();
        let mut generator = DatasetGenerator::new(&cfg, &lib);
        generator.init_output(Taxonomy::builtin()).unwrap();
        fs::create_dir(cfg.out_labels.join("synthetic_000.txt")).unwrap();

        let err = generator.run(1).unwrap_err();
        assert!(format!("{err:#}").contains("synthetic_000.txt"), "{err:#}");
        assert!(!cfg.out_images.join("synthetic_000.png").exists());
    }

    #[test]
    fn label_files_match_canvas() {
        let root = tempdir().unwrap();
        let cfg = cfg(root.path(), 2);
        let lib = library();
        let mut generator = DatasetGenerator::new(&cfg, &lib);
        generator.init_output(Taxonomy::builtin()).unwrap();
        generator.run(3).unwrap();

        let text = fs::read_to_string(cfg.out_labels.join("synthetic_001.txt")).unwrap();
        let anns = Annotation::parse_all(&text).unwrap();
        assert!(!anns.is_empty());
        let img = image::open(cfg.out_images.join("synthetic_001.png"))
            .unwrap()
            .into_rgb8();
        for ann in anns {
            let r = ann.to_region(cfg.width, cfg.height);
            assert!(r.within(cfg.width, cfg.height));
            assert_eq!(*img.get_pixel(r.x, r.y), Rgb([0, 0, 0]));
        }
        for line in text.lines() {
            let decimals: Vec<_> = line
                .split(' ')
                .skip(1)
                .map(|f| f.split('.').nth(1).unwrap().len())
                .collect();
            assert_eq!(decimals, [6, 6, 6, 6]);
        }
    }

    #[test]
    fn same_seed_same_labels() {
        let lib = library();
        let run = |seed| {
            let root = tempdir().unwrap();
            let cfg = cfg(root.path(), 3);
            let mut generator = DatasetGenerator::new(&cfg, &lib);
            generator.init_output(Taxonomy::builtin()).unwrap();
            generator.run(seed).unwrap();
            (0..3)
                .map(|i| cfg.out_labels.join(cfg.stem(i) + ".txt"))
                .map(|path| fs::read_to_string(path).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(123), run(123));
    }

    #[test]
    fn jpeg_output_uses_jpg_extension() {
        let root = tempdir().unwrap();
        let cfg = GenCfg {
            format: OutputFormat::Jpg,
            ..cfg(root.path(), 1)
        };
        let lib = library();
        let mut generator = DatasetGenerator::new(&cfg, &lib);
        generator.init_output(Taxonomy::builtin()).unwrap();
        generator.run(1).unwrap();
        let img = image::open(cfg.out_images.join("synthetic_000.jpg")).unwrap();
        assert_eq!((img.width(), img.height()), (320, 200));
    }
}

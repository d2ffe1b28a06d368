use std::{fs::read_dir, path::Path};

use ab_glyph::{Font, FontArc};
use log::debug;

/// Fonts usable for box captions, in file-name order.
pub struct FontCache {
    fonts: Vec<FontArc>,
}

impl FontCache {
    pub fn load(font_dir: &Path) -> Self {
        let mut paths: Vec<_> = read_dir(font_dir)
            .ok()
            .into_iter()
            .flat_map(|rd| rd.filter_map(|e| e.ok()))
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("ttf") | Some("otf")
                )
            })
            .collect();
        paths.sort();

        let fonts = paths
            .iter()
            .filter_map(|path| {
                let font = std::fs::read(path)
                    .ok()
                    .and_then(|bytes| FontArc::try_from_vec(bytes).ok());
                if font.is_none() {
                    debug!("Ignoring unreadable font {}", path.display());
                }
                font
            })
            // captions need letters, digits and '_'
            .filter(|f| ['a', 'Z', '0', '_'].iter().all(|&ch| f.glyph_id(ch).0 != 0))
            .collect();
        FontCache { fonts }
    }

    pub fn first(&self) -> Option<&FontArc> {
        self.fonts.first()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }
}

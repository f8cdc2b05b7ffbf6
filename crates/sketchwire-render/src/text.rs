use sketchwire_core::{HeuristicMetrics, TextMetrics};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use ttf_parser::Face;

/// Holds the raw bytes of one system font face and rasterizes glyph outlines
/// through tiny-skia paths. When no face can be loaded (headless CI, bare
/// containers) drawing degrades to a no-op and measurement falls back to
/// [`HeuristicMetrics`], so hit-testing still behaves.
pub struct FontStore {
    face_data: Option<(Vec<u8>, u32)>,
    fallback: HeuristicMetrics,
}

impl FontStore {
    /// Loads the system sans-serif face.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };
        let face_data = db
            .query(&query)
            .and_then(|id| db.with_face_data(id, |data, index| (data.to_vec(), index)));
        if face_data.is_none() {
            log::warn!("no system sans-serif font found, text will not be rasterized");
        }
        Self {
            face_data,
            fallback: HeuristicMetrics,
        }
    }

    /// A store with no face at all. Useful in tests and headless setups.
    pub fn empty() -> Self {
        Self {
            face_data: None,
            fallback: HeuristicMetrics,
        }
    }

    pub fn has_face(&self) -> bool {
        self.face_data.is_some()
    }

    fn with_face<T>(&self, f: impl FnOnce(&Face<'_>) -> T) -> Option<T> {
        let (data, index) = self.face_data.as_ref()?;
        let face = Face::parse(data, *index).ok()?;
        Some(f(&face))
    }

    /// Fills `text` at the given baseline position. `y` is the baseline, as
    /// on a canvas: glyphs extend upward from it.
    pub(crate) fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f64,
        y: f64,
        font_size: f64,
        paint: &Paint<'_>,
    ) {
        let path = self.with_face(|face| {
            let upem = face.units_per_em() as f32;
            let scale = font_size as f32 / upem;
            let mut builder = GlyphPathBuilder {
                path: PathBuilder::new(),
                scale,
                offset_x: x as f32,
                offset_y: y as f32,
            };
            for ch in text.chars() {
                let Some(glyph) = face.glyph_index(ch) else {
                    builder.offset_x += scale * upem * 0.5;
                    continue;
                };
                face.outline_glyph(glyph, &mut builder);
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f32;
                builder.offset_x += advance * scale;
            }
            builder.path.finish()
        });
        if let Some(Some(path)) = path {
            pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

impl TextMetrics for FontStore {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let width = self.with_face(|face| {
            let scale = font_size / f64::from(face.units_per_em());
            text.chars()
                .map(|ch| match face.glyph_index(ch) {
                    Some(glyph) => f64::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale,
                    None => font_size * 0.5,
                })
                .sum()
        });
        match width {
            Some(w) => w,
            None => self.fallback.text_width(text, font_size),
        }
    }
}

/// Bridges ttf-parser outlines into a tiny-skia path, flipping the y axis
/// (font space points up, raster space points down) and translating each
/// glyph to its pen position.
struct GlyphPathBuilder {
    path: PathBuilder,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl GlyphPathBuilder {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.offset_x + x * self.scale,
            self.offset_y - y * self.scale,
        )
    }
}

impl ttf_parser::OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

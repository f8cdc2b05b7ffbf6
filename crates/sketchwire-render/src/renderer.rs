use sketchwire_core::{Color, Element};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Stroke, Transform};

use crate::surface::Surface;
use crate::text::FontStore;

/// Stroke width for pencil segments and shape outlines.
pub const STROKE_WIDTH: f32 = 2.0;

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke() -> Stroke {
    Stroke {
        width: STROKE_WIDTH,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Paints one element onto the surface without touching anything else.
/// Elements that fail [`Element::is_well_formed`] are skipped.
pub fn paint(surface: &mut Surface, element: &Element, fonts: &FontStore) {
    if !element.is_well_formed() {
        log::warn!("skipping malformed element {}", element.id());
        return;
    }
    let paint = paint_for(element.color());
    match element {
        Element::Pencil(seg) => {
            let mut pb = PathBuilder::new();
            pb.move_to(seg.start_x as f32, seg.start_y as f32);
            pb.line_to(seg.end_x as f32, seg.end_y as f32);
            if let Some(path) = pb.finish() {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &paint,
                    &stroke(),
                    Transform::identity(),
                    None,
                );
            }
        }
        Element::Rectangle(rect) => {
            let r = rect.as_rect();
            let mut pb = PathBuilder::new();
            pb.move_to(r.x0 as f32, r.y0 as f32);
            pb.line_to(r.x1 as f32, r.y0 as f32);
            pb.line_to(r.x1 as f32, r.y1 as f32);
            pb.line_to(r.x0 as f32, r.y1 as f32);
            pb.close();
            if let Some(path) = pb.finish() {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &paint,
                    &stroke(),
                    Transform::identity(),
                    None,
                );
            }
        }
        Element::Circle(circle) => {
            if circle.radius <= 0.0 {
                return;
            }
            let mut pb = PathBuilder::new();
            pb.push_circle(
                circle.start_x as f32,
                circle.start_y as f32,
                circle.radius as f32,
            );
            if let Some(path) = pb.finish() {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &paint,
                    &stroke(),
                    Transform::identity(),
                    None,
                );
            }
        }
        Element::Text(text) => {
            fonts.draw_text(
                surface.pixmap_mut(),
                &text.text,
                text.x,
                text.y,
                text.font_size,
                &paint,
            );
        }
    }
}

/// Re-derives the whole raster from the element sequence: clears to white
/// and paints every element in order. Later elements overdraw earlier ones,
/// so the result depends only on the sequence and the surface size.
pub fn redraw(surface: &mut Surface, elements: &[Element], fonts: &FontStore) {
    surface.clear();
    for element in elements {
        paint(surface, element, fonts);
    }
}

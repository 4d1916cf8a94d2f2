//! Stroke outlines of the confusable optotype letters, so letter charts stay
//! legible without a font.

use tiny_skia::{LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use vistrain_core::Letter;

const BOX: f32 = 50.0;
const STROKE: f32 = 6.0;

fn polyline(pb: &mut PathBuilder, points: &[(f32, f32)]) {
    if let Some((&(x, y), rest)) = points.split_first() {
        pb.move_to(x, y);
        for &(x, y) in rest {
            pb.line_to(x, y);
        }
    }
}

/// Outline of `letter` in a 50 unit box.
pub fn letter_path(letter: Letter) -> Option<Path> {
    let mut pb = PathBuilder::new();
    match letter.as_char() {
        'O' => pb.push_oval(Rect::from_ltrb(9.0, 6.0, 41.0, 44.0)?),
        'Q' => {
            pb.push_oval(Rect::from_ltrb(9.0, 6.0, 41.0, 44.0)?);
            polyline(&mut pb, &[(28.0, 32.0), (44.0, 47.0)]);
        }
        'C' => {
            pb.move_to(41.0, 13.0);
            pb.cubic_to(34.0, 3.0, 9.0, 4.0, 9.0, 25.0);
            pb.cubic_to(9.0, 46.0, 34.0, 47.0, 41.0, 37.0);
        }
        'D' => {
            polyline(&mut pb, &[(22.0, 6.0), (10.0, 6.0), (10.0, 44.0), (22.0, 44.0)]);
            pb.cubic_to(46.0, 44.0, 46.0, 6.0, 22.0, 6.0);
            pb.close();
        }
        'H' => {
            polyline(&mut pb, &[(10.0, 5.0), (10.0, 45.0)]);
            polyline(&mut pb, &[(40.0, 5.0), (40.0, 45.0)]);
            polyline(&mut pb, &[(10.0, 25.0), (40.0, 25.0)]);
        }
        'M' => polyline(
            &mut pb,
            &[(8.0, 45.0), (8.0, 5.0), (25.0, 30.0), (42.0, 5.0), (42.0, 45.0)],
        ),
        'N' => polyline(&mut pb, &[(10.0, 45.0), (10.0, 5.0), (40.0, 45.0), (40.0, 5.0)]),
        'K' => {
            polyline(&mut pb, &[(10.0, 5.0), (10.0, 45.0)]);
            polyline(&mut pb, &[(40.0, 5.0), (11.0, 28.0)]);
            polyline(&mut pb, &[(20.0, 21.0), (41.0, 45.0)]);
        }
        'X' => {
            polyline(&mut pb, &[(9.0, 5.0), (41.0, 45.0)]);
            polyline(&mut pb, &[(41.0, 5.0), (9.0, 45.0)]);
        }
        'R' => {
            polyline(&mut pb, &[(10.0, 45.0), (10.0, 6.0), (26.0, 6.0)]);
            pb.cubic_to(42.0, 6.0, 42.0, 26.0, 26.0, 26.0);
            pb.line_to(10.0, 26.0);
            polyline(&mut pb, &[(24.0, 26.0), (41.0, 45.0)]);
        }
        'S' => {
            pb.move_to(40.0, 11.0);
            pb.cubic_to(33.0, 3.0, 10.0, 4.0, 10.0, 15.0);
            pb.cubic_to(10.0, 26.0, 40.0, 23.0, 40.0, 35.0);
            pb.cubic_to(40.0, 46.0, 16.0, 47.0, 9.0, 39.0);
        }
        'Z' => polyline(&mut pb, &[(9.0, 6.0), (41.0, 6.0), (9.0, 44.0), (41.0, 44.0)]),
        'V' => polyline(&mut pb, &[(7.0, 5.0), (25.0, 45.0), (43.0, 5.0)]),
        _ => return None,
    }
    pb.finish()
}

/// `letter` stroked into a transparent square pixmap of `size` pixels.
pub fn letter_pixmap(letter: Letter, size: f32, rgba: [u8; 4]) -> Option<Pixmap> {
    let side = size.ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(side, side)?;
    let path = letter_path(letter)?;
    let k = side as f32 / BOX;

    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: STROKE,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };
    pm.stroke_path(&path, &paint, &stroke, Transform::from_scale(k, k), None);
    Some(pm)
}

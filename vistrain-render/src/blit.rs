use tiny_skia::Pixmap;

/// Copy `src` centred at `pos` onto `dst`, clipped to the canvas. Opaque
/// sources are copied row by row; anything else is blended source-over in
/// premultiplied space. Returns false when nothing landed on the canvas.
pub(crate) fn blit_centered(dst: &mut Pixmap, src: &Pixmap, pos: (f32, f32)) -> bool {
    let (w, h) = (src.width() as i32, src.height() as i32);
    let x0 = (pos.0 - w as f32 * 0.5).floor() as i32;
    let y0 = (pos.1 - h as f32 * 0.5).floor() as i32;

    let dst_x_start = x0.max(0);
    let dst_y_start = y0.max(0);
    let dst_x_end = (x0 + w).min(dst.width() as i32);
    let dst_y_end = (y0 + h).min(dst.height() as i32);
    if dst_x_end <= dst_x_start || dst_y_end <= dst_y_start {
        return false;
    }

    let copy_w = (dst_x_end - dst_x_start) as usize;
    let copy_h = (dst_y_end - dst_y_start) as usize;
    let src_x = (dst_x_start - x0) as usize;
    let src_y = (dst_y_start - y0) as usize;
    let (dst_x, dst_y) = (dst_x_start as usize, dst_y_start as usize);

    let src_stride = src.width() as usize * 4;
    let dst_stride = dst.width() as usize * 4;
    let src_data = src.data();
    let dst_data = dst.data_mut();

    let fully_opaque = (0..copy_h).all(|row| {
        let start = (src_y + row) * src_stride + src_x * 4;
        src_data[start..start + copy_w * 4]
            .iter()
            .skip(3)
            .step_by(4)
            .all(|&a| a == 255)
    });

    for row in 0..copy_h {
        let s = (src_y + row) * src_stride + src_x * 4;
        let d = (dst_y + row) * dst_stride + dst_x * 4;
        let src_row = &src_data[s..s + copy_w * 4];
        let dst_row = &mut dst_data[d..d + copy_w * 4];
        if fully_opaque {
            dst_row.copy_from_slice(src_row);
            continue;
        }
        for (sp, dp) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
            let inv = 255 - sp[3] as u32;
            for c in 0..4 {
                dp[c] = (sp[c] as u32 + (dp[c] as u32 * inv + 127) / 255).min(255) as u8;
            }
        }
    }
    true
}

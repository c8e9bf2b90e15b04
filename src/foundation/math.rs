use image::Rgb;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// ITU-R BT.601 luma, the same weights OpenCV uses for BGR->GRAY.
pub(crate) fn luma(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let y = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((y + 500) / 1000) as u8
}

pub(crate) fn grayscale(px: Rgb<u8>) -> Rgb<u8> {
    let y = luma(px);
    Rgb([y, y, y])
}

/// Blend `src` over `dst` with coverage `alpha` in `[0, 255]`.
pub(crate) fn blend_rgb(dst: Rgb<u8>, src: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    let a = u16::from(alpha);
    let inv = 255 - a;
    let mut out = [0u8; 3];
    for (i, o) in out.iter_mut().enumerate() {
        let v = mul_div255_u16(u16::from(src.0[i]), a) + mul_div255_u16(u16::from(dst.0[i]), inv);
        *o = v.min(255) as u8;
    }
    Rgb(out)
}

/// Map an opacity in `[0, 1]` to an 8-bit coverage value.
pub(crate) fn opacity_to_u8(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

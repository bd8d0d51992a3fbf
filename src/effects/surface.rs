//! 2D drawing targets for the splatter overlay.

use image::{Rgb, Rgba, RgbaImage};

/// What the particle renderer needs from a transparent overlay canvas.
pub trait SplatterSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn resize(&mut self, width: u32, height: u32);

    /// Wipes the surface back to fully transparent.
    fn clear(&mut self);

    /// Fills a circle with a radial gradient from `inner` at the centre to
    /// `outer` at the rim, with overall opacity `alpha`.
    fn fill_radial_circle(
        &mut self,
        center: (f32, f32),
        radius: f32,
        inner: Rgb<u8>,
        outer: Rgb<u8>,
        alpha: f32,
    );
}

/// Software raster target backed by an RGBA image (straight alpha).
#[derive(Clone, Debug)]
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.image.width() && y < self.image.height()).then(|| *self.image.get_pixel(x, y))
    }

    /// Number of pixels that are not fully transparent.
    pub fn painted_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p[3] > 0).count()
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> f32 {
    a as f32 + (b as f32 - a as f32) * t
}

/// Source-over blend of a straight-alpha colour onto `dst`.
fn blend_over(dst: &mut Rgba<u8>, src: [f32; 3], src_alpha: f32) {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let value = (src[c] * src_alpha + dst[c] as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

impl SplatterSurface for ImageSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != self.image.dimensions() {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn fill_radial_circle(
        &mut self,
        (cx, cy): (f32, f32),
        radius: f32,
        inner: Rgb<u8>,
        outer: Rgb<u8>,
        alpha: f32,
    ) {
        let alpha = alpha.clamp(0.0, 1.0);
        if radius <= 0.0 || alpha == 0.0 {
            return;
        }
        let (width, height) = self.image.dimensions();
        // Particles may have drifted off-screen; clip the bounding box
        let x0 = (cx - radius).floor().max(0.0);
        let y0 = (cy - radius).floor().max(0.0);
        let x1 = (cx + radius).ceil().min(width as f32);
        let y1 = (cy + radius).ceil().min(height as f32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > radius {
                    continue;
                }
                let t = distance / radius;
                let color = [
                    lerp_channel(inner[0], outer[0], t),
                    lerp_channel(inner[1], outer[1], t),
                    lerp_channel(inner[2], outer[2], t),
                ];
                blend_over(self.image.get_pixel_mut(x, y), color, alpha);
            }
        }
    }
}

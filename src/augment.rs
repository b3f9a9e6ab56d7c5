//! Random affine augmentation of a single image.
//!
//! Each call draws one random transform from the current parameter ranges and
//! resamples the source through it:
//!
//! ```text
//! theta  ~ U(-rotation, rotation)        degrees
//! tx     ~ U(-height_shift, height_shift) * rows
//! ty     ~ U(-width_shift, width_shift)   * cols
//! shear  ~ U(-shear, shear)              degrees
//! zx, zy ~ U(1 - zoom, 1 + zoom)
//!
//! M = offset(center) * rotate * shift * shear * zoom * offset(-center)
//! src(row, col) = M * dst(row, col)
//! ```
//!
//! Sampling is bilinear. Neighbours that land outside the source are
//! resolved by the [`FillMode`]. A draw that is exactly the identity returns
//! the source unchanged, so all-zero parameters are a no-op.

use image::{ImageBuffer, Pixel};
use rand::Rng;

use crate::error::Error;
use crate::params::{AugmentParams, FillMode};
use crate::types::SourceImage;

/// One concrete draw from the parameter ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomTransform {
    pub theta: f64, // degrees
    pub tx: f64,    // rows
    pub ty: f64,    // cols
    pub shear: f64, // degrees
    pub zx: f64,
    pub zy: f64,
}

impl RandomTransform {
    pub const IDENTITY: RandomTransform =
        RandomTransform { theta: 0.0, tx: 0.0, ty: 0.0, shear: 0.0, zx: 1.0, zy: 1.0 };

    /// Draw a transform for an image of `rows` x `cols`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, params: &AugmentParams, rows: u32, cols: u32) -> Self {
        let theta = symmetric(rng, params.rotation as f64);
        let tx = symmetric(rng, params.height_shift as f64) * rows as f64;
        let ty = symmetric(rng, params.width_shift as f64) * cols as f64;
        let shear = symmetric(rng, params.shear as f64);

        let zoom = params.zoom as f64;
        let (zx, zy) = if zoom > 0.0 {
            (rng.gen_range(1.0 - zoom..=1.0 + zoom), rng.gen_range(1.0 - zoom..=1.0 + zoom))
        } else {
            (1.0, 1.0)
        };

        RandomTransform { theta, tx, ty, shear, zx, zy }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Output-to-input mapping over (row, col), centered on the image.
    pub fn matrix(&self, rows: u32, cols: u32) -> Affine {
        let mut m = IDENTITY3;

        if self.theta != 0.0 {
            let (s, c) = self.theta.to_radians().sin_cos();
            m = matmul(&m, &[[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]);
        }
        if self.tx != 0.0 || self.ty != 0.0 {
            m = matmul(&m, &[[1.0, 0.0, self.tx], [0.0, 1.0, self.ty], [0.0, 0.0, 1.0]]);
        }
        if self.shear != 0.0 {
            let (s, c) = self.shear.to_radians().sin_cos();
            m = matmul(&m, &[[1.0, -s, 0.0], [0.0, c, 0.0], [0.0, 0.0, 1.0]]);
        }
        if self.zx != 1.0 || self.zy != 1.0 {
            m = matmul(&m, &[[self.zx, 0.0, 0.0], [0.0, self.zy, 0.0], [0.0, 0.0, 1.0]]);
        }

        let o_r = rows as f64 / 2.0 + 0.5;
        let o_c = cols as f64 / 2.0 + 0.5;
        let offset = [[1.0, 0.0, o_r], [0.0, 1.0, o_c], [0.0, 0.0, 1.0]];
        let reset = [[1.0, 0.0, -o_r], [0.0, 1.0, -o_c], [0.0, 0.0, 1.0]];
        let m = matmul(&matmul(&offset, &m), &reset);

        Affine { m: [m[0], m[1]] }
    }
}

#[inline]
fn symmetric<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    if range > 0.0 { rng.gen_range(-range..=range) } else { 0.0 }
}

type Mat3 = [[f64; 3]; 3];

const IDENTITY3: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn matmul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Top two rows of a homogeneous 3x3 matrix over (row, col).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    m: [[f64; 3]; 2],
}

impl Affine {
    #[inline]
    pub fn map(&self, row: f64, col: f64) -> (f64, f64) {
        let m = &self.m;
        (
            m[0][0] * row + m[0][1] * col + m[0][2],
            m[1][0] * row + m[1][1] * col + m[1][2],
        )
    }

    fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }
}

/// Map a possibly out-of-range sample index back into `0..n`.
/// `None` means "use the constant fill value".
#[inline]
fn resolve_index(i: i64, n: i64, mode: FillMode) -> Option<i64> {
    if (0..n).contains(&i) {
        return Some(i);
    }
    match mode {
        FillMode::Nearest => Some(i.clamp(0, n - 1)),
        FillMode::Constant => None,
        FillMode::Reflect => {
            let k = i.rem_euclid(2 * n);
            Some(if k < n { k } else { 2 * n - 1 - k })
        }
        FillMode::Wrap => Some(i.rem_euclid(n)),
    }
}

/// Resample `src` through `affine` with bilinear weights.
pub fn warp<P>(src: &ImageBuffer<P, Vec<u8>>, affine: &Affine, fill: FillMode) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    let (wi, hi) = (w as i64, h as i64);
    let channels = P::CHANNEL_COUNT as usize;
    let raw = src.as_raw();

    let mut out = ImageBuffer::<P, Vec<u8>>::new(w, h);
    let mut acc = vec![0.0f64; channels];

    for (col, row, px) in out.enumerate_pixels_mut() {
        let (r_in, c_in) = affine.map(row as f64, col as f64);
        let (r0, c0) = (r_in.floor(), c_in.floor());
        let (fr, fc) = (r_in - r0, c_in - c0);
        let (r0, c0) = (r0 as i64, c0 as i64);

        acc.iter_mut().for_each(|a| *a = 0.0);
        for (dr, wr) in [(0, 1.0 - fr), (1, fr)] {
            if wr == 0.0 { continue; }
            let Some(sr) = resolve_index(r0 + dr, hi, fill) else { continue };
            for (dc, wc) in [(0, 1.0 - fc), (1, fc)] {
                if wc == 0.0 { continue; }
                let Some(sc) = resolve_index(c0 + dc, wi, fill) else { continue };
                let base = (sr as usize * w as usize + sc as usize) * channels;
                let weight = wr * wc;
                for (a, v) in acc.iter_mut().zip(&raw[base..base + channels]) {
                    *a += weight * *v as f64;
                }
            }
        }

        for (dst, a) in px.channels_mut().iter_mut().zip(&acc) {
            *dst = a.round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

/// Turns the parameter snapshot plus the source into one augmented frame.
pub struct TransformInvoker<R> {
    rng: R,
}

impl<R: Rng> TransformInvoker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One random augmentation of `src`. Same size and channel count out as in.
    pub fn invoke(&mut self, src: &SourceImage, params: &AugmentParams) -> Result<SourceImage, Error> {
        let (cols, rows) = src.dimensions();
        if rows == 0 || cols == 0 {
            return Err(Error::Transform(format!("cannot augment an empty {cols}x{rows} image")));
        }

        let draw = RandomTransform::draw(&mut self.rng, params, rows, cols);
        tracing::trace!(?draw, "drew transform");
        apply(src, &draw, params.fill_mode)
    }
}

/// Apply a fixed draw to `src`.
pub fn apply(src: &SourceImage, draw: &RandomTransform, fill: FillMode) -> Result<SourceImage, Error> {
    if draw.is_identity() {
        return Ok(src.clone());
    }

    let (cols, rows) = src.dimensions();
    let affine = draw.matrix(rows, cols);
    if !affine.is_finite() {
        return Err(Error::Transform(format!("non-finite transform matrix from {draw:?}")));
    }

    Ok(match src {
        SourceImage::Luma(b) => SourceImage::Luma(warp(b, &affine, fill)),
        SourceImage::LumaAlpha(b) => SourceImage::LumaAlpha(warp(b, &affine, fill)),
        SourceImage::Rgb(b) => SourceImage::Rgb(warp(b, &affine, fill)),
        SourceImage::Rgba(b) => SourceImage::Rgba(warp(b, &affine, fill)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// 64x64 RGB gradient so every pixel is distinguishable.
    fn gradient(w: u32, h: u32) -> SourceImage {
        SourceImage::Rgb(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 4 % 256) as u8, (y * 4 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn rgb(img: &SourceImage) -> &RgbImage {
        match img {
            SourceImage::Rgb(b) => b,
            _ => panic!("expected an RGB image"),
        }
    }

    fn col_shift(cols: f64) -> RandomTransform {
        RandomTransform { ty: cols, ..RandomTransform::IDENTITY }
    }

    #[test]
    fn default_params_are_a_noop() {
        let src = gradient(64, 64);
        let mut invoker = TransformInvoker::new(StdRng::seed_from_u64(7));
        let out = invoker.invoke(&src, &AugmentParams::default()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn same_snapshot_gives_same_shape() {
        let src = gradient(40, 24);
        let params = AugmentParams {
            rotation: 45.0,
            width_shift: 0.3,
            height_shift: 0.2,
            shear: 20.0,
            zoom: 0.5,
            fill_mode: FillMode::Reflect,
        };
        let mut invoker = TransformInvoker::new(StdRng::seed_from_u64(1));
        let a = invoker.invoke(&src, &params).unwrap();
        let b = invoker.invoke(&src, &params).unwrap();
        assert_eq!(a.dimensions(), (40, 24));
        assert_eq!(b.dimensions(), (40, 24));
        assert_eq!(a.channels(), 3);
        assert_eq!(b.channels(), 3);
    }

    #[test]
    fn every_fill_mode_survives_a_shift() {
        let src = gradient(64, 64);
        for mode in FillMode::ALL {
            let params = AugmentParams { width_shift: 0.4, height_shift: 0.4, fill_mode: mode, ..Default::default() };
            let mut invoker = TransformInvoker::new(StdRng::seed_from_u64(3));
            let out = invoker.invoke(&src, &params).unwrap();
            assert_eq!(out.dimensions(), (64, 64), "{mode}");
            assert_eq!(out.channels(), 3, "{mode}");
        }
    }

    #[test]
    fn integer_shift_moves_pixels() {
        let src = gradient(16, 8);
        let out = apply(&src, &col_shift(3.0), FillMode::Nearest).unwrap();
        let (s, o) = (rgb(&src), rgb(&out));
        assert_eq!(o.get_pixel(0, 2), s.get_pixel(3, 2));
        assert_eq!(o.get_pixel(12, 5), s.get_pixel(15, 5));
        // past the right edge: edge pixel repeats
        assert_eq!(o.get_pixel(15, 5), s.get_pixel(15, 5));
    }

    #[test]
    fn fill_modes_resolve_the_uncovered_strip() {
        let src = gradient(16, 8);
        let s = rgb(&src).clone();

        let constant = apply(&src, &col_shift(3.0), FillMode::Constant).unwrap();
        assert_eq!(*rgb(&constant).get_pixel(14, 1), Rgb([0, 0, 0]));

        let wrap = apply(&src, &col_shift(3.0), FillMode::Wrap).unwrap();
        assert_eq!(rgb(&wrap).get_pixel(14, 1), s.get_pixel(1, 1));

        // 14 + 3 = 17 -> mirrored to 2 * 16 - 1 - 17 = 14
        let reflect = apply(&src, &col_shift(3.0), FillMode::Reflect).unwrap();
        assert_eq!(rgb(&reflect).get_pixel(14, 1), s.get_pixel(14, 1));
    }

    #[test]
    fn resolve_index_edges() {
        assert_eq!(resolve_index(-1, 4, FillMode::Nearest), Some(0));
        assert_eq!(resolve_index(5, 4, FillMode::Nearest), Some(3));
        assert_eq!(resolve_index(-1, 4, FillMode::Constant), None);
        assert_eq!(resolve_index(-1, 4, FillMode::Reflect), Some(0));
        assert_eq!(resolve_index(4, 4, FillMode::Reflect), Some(3));
        assert_eq!(resolve_index(-1, 4, FillMode::Wrap), Some(3));
        assert_eq!(resolve_index(4, 4, FillMode::Wrap), Some(0));
    }

    #[test]
    fn half_turn_flips_both_axes() {
        // The pivot sits at (rows/2 + 0.5, cols/2 + 0.5), so a 180 degree turn
        // maps (r, c) to (rows + 1 - r, cols + 1 - c).
        let src = gradient(9, 7);
        let draw = RandomTransform { theta: 180.0, ..RandomTransform::IDENTITY };
        let out = apply(&src, &draw, FillMode::Nearest).unwrap();
        let (s, o) = (rgb(&src), rgb(&out));
        assert_eq!(o.get_pixel(2, 3), s.get_pixel(9 + 1 - 2, 7 + 1 - 3));
        assert_eq!(o.get_pixel(4, 2), s.get_pixel(9 + 1 - 4, 7 + 1 - 2));
    }

    #[test]
    fn keeps_channel_layout() {
        let gray = SourceImage::Luma(image::GrayImage::from_pixel(10, 10, image::Luma([200])));
        let params = AugmentParams { rotation: 90.0, ..Default::default() };
        let mut invoker = TransformInvoker::new(StdRng::seed_from_u64(5));
        let out = invoker.invoke(&gray, &params).unwrap();
        assert_eq!(out.channels(), 1);
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn draws_stay_inside_ranges() {
        let params = AugmentParams { rotation: 30.0, width_shift: 0.5, height_shift: 0.25, shear: 10.0, zoom: 0.2, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let d = RandomTransform::draw(&mut rng, &params, 100, 40);
            assert!(d.theta.abs() <= 30.0);
            assert!(d.tx.abs() <= 25.0);
            assert!(d.ty.abs() <= 20.0);
            assert!(d.shear.abs() <= 10.0);
            assert!((0.8..=1.2).contains(&d.zx) && (0.8..=1.2).contains(&d.zy));
        }
    }

    #[test]
    fn empty_image_is_a_transform_error() {
        let empty = SourceImage::Rgb(RgbImage::new(0, 0));
        let mut invoker = TransformInvoker::new(StdRng::seed_from_u64(0));
        let err = invoker.invoke(&empty, &AugmentParams::default()).unwrap_err();
        assert!(matches!(err, Error::Transform(_)));
    }
}

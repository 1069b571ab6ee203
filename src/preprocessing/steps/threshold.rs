use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Side of the square neighbourhood used for the local mean
pub const BLOCK_SIZE: u32 = 15;
/// Pixels must be this much darker than their local mean to count as ink
pub const OFFSET: f32 = 8.0;

/// Apply Gaussian-weighted adaptive thresholding
/// Copes with uneven lighting across a photographed label
pub fn apply(image: GrayImage) -> GrayImage {
    adaptive_gaussian_threshold(&image, BLOCK_SIZE, OFFSET)
}

/// Binarize against a Gaussian-weighted local mean
///
/// A pixel becomes white (255) when `pixel > local_mean - offset`, black (0)
/// otherwise. The local mean is a `block_size` x `block_size` Gaussian blur
/// with edges replicated.
pub fn adaptive_gaussian_threshold(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let kernel = gaussian_kernel(block_size | 1);
    let local_mean = separable_filter_equal(&to_f32(img), &kernel);
    let delta = offset.ceil() as i32;

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = img.get_pixel(x, y).0[0] as i32;
        let mean = local_mean.get_pixel(x, y).0[0].round() as i32;
        if pixel - mean > -delta {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Normalized 1-D Gaussian taps, sigma derived from the window size
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let coeff = -0.5 / (sigma * sigma);

    let taps: Vec<f32> = (-half..=half)
        .map(|i| ((i * i) as f32 * coeff).exp())
        .collect();
    let total: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / total).collect()
}

/// Unscaled f32 copy so the blurred mean keeps its fractional part
fn to_f32(img: &GrayImage) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y).0[0] as f32])
    })
}

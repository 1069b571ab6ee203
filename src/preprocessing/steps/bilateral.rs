use image::GrayImage;

/// Neighbourhood diameter in pixels
pub const DIAMETER: u32 = 9;
/// Intensity sigma: how different two gray levels may be and still mix
pub const SIGMA_COLOR: f32 = 75.0;
/// Spatial sigma in pixels
pub const SIGMA_SPACE: f32 = 75.0;

/// Edge-preserving smoothing with the default label parameters
pub fn apply(image: GrayImage) -> GrayImage {
    bilateral_filter(&image, DIAMETER, SIGMA_COLOR, SIGMA_SPACE)
}

/// Bilateral filter over a `diameter` x `diameter` window
///
/// Flat regions are smoothed while character edges, where intensity jumps,
/// keep their contrast. Borders are replicated.
pub fn bilateral_filter(
    img: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    // imageproc panics on an empty image
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    imageproc::filter::bilateral_filter(img, diameter, sigma_color, sigma_space)
}

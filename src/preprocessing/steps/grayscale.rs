use image::{DynamicImage, GrayImage};

/// Convert the decoded raster to single-channel intensity
/// This is the foundation for every other normalization step
pub fn apply(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

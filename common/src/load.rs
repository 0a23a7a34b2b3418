use crate::{Error, Pixel, Result};
use image::{DynamicImage, ImageReader};
use std::{fs::File, io::BufReader, path::Path};

/// 16-bit channel down to 8-bit, truncating
#[inline]
fn quantize(channel: u16) -> u8 {
    (channel / 257) as u8
}

/// Extract every pixel with a non-zero alpha in row-major order
///
/// Partial alpha is not blended: anything visible at all is encoded with its straight RGB.
pub fn from_image(image: &DynamicImage, (base_x, base_y): (i64, i64)) -> Result<Vec<Pixel>> {
    // past this check no canvas coordinate can overflow
    if base_x.checked_add(i64::from(image.width())).is_none()
        || base_y.checked_add(i64::from(image.height())).is_none()
    {
        return Err(Error::OffsetOutOfRange {
            x: base_x,
            y: base_y,
        });
    }

    // widen first so alpha is tested at full precision, whatever the source depth
    let image = image.to_rgba16();

    let pixels = image
        .enumerate_pixels()
        .filter(|(_x, _y, pixel)| pixel[3] != 0)
        .map(|(x, y, pixel)| {
            let [r, g, b, _a] = pixel.0;
            Pixel::new(
                i64::from(x) + base_x,
                i64::from(y) + base_y,
                [quantize(r), quantize(g), quantize(b)],
            )
        })
        .collect();

    Ok(pixels)
}

pub fn load_memory(data: &[u8], base: (i64, i64)) -> Result<Vec<Pixel>> {
    let image = image::load_from_memory(data)?;
    from_image(&image, base)
}

pub fn load_path(path: impl AsRef<Path>, base: (i64, i64)) -> Result<Vec<Pixel>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let image = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::from)?
        .decode()?;

    let pixels = from_image(&image, base)?;
    info!(
        width = image.width(),
        height = image.height(),
        "pixels found: {}",
        pixels.len()
    );

    Ok(pixels)
}

#[cfg(test)]
mod test {
    use super::{from_image, load_memory, load_path};
    use crate::{Error, Pixel};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn sample() -> RgbaImage {
        // 3x2, transparent diagonal
        RgbaImage::from_fn(3, 2, |x, y| {
            if x == y {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([x as u8 * 100, y as u8 * 100, 7, 255])
            }
        })
    }

    fn encode_png(image: RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn skips_transparent_and_keeps_scan_order() {
        let pixels = from_image(&DynamicImage::ImageRgba8(sample()), (0, 0)).unwrap();

        assert_eq!(
            pixels,
            [
                Pixel::new(1, 0, [100, 0, 7]),
                Pixel::new(2, 0, [200, 0, 7]),
                Pixel::new(0, 1, [0, 100, 7]),
                Pixel::new(2, 1, [200, 100, 7]),
            ]
        );
    }

    #[test]
    fn applies_base_offset() {
        let (bx, by) = (500, 120);
        let pixels = from_image(&DynamicImage::ImageRgba8(sample()), (bx, by)).unwrap();

        assert_eq!(pixels.len(), 4);
        assert!(pixels.iter().all(|pixel| pixel.x >= bx && pixel.y >= by));
        assert_eq!(pixels[0], Pixel::new(501, 120, [100, 0, 7]));
    }

    #[test]
    fn partial_alpha_counts_as_opaque() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0x12, 0x34, 0x56, 1]));
        let pixels = from_image(&DynamicImage::ImageRgba8(image), (0, 0)).unwrap();

        assert_eq!(pixels, [Pixel::new(0, 0, [0x12, 0x34, 0x56])]);
    }

    #[test]
    fn extreme_offset_is_rejected() {
        let image = DynamicImage::ImageRgba8(sample());

        for base in [(i64::MAX, 0), (0, i64::MAX - 1), (i64::MAX, i64::MAX)] {
            let error = from_image(&image, base).unwrap_err();
            assert!(matches!(error, Error::OffsetOutOfRange { .. }), "{base:?}");
        }

        // largest offset that still fits
        let pixels = from_image(&image, (i64::MAX - 3, i64::MIN)).unwrap();
        assert_eq!(pixels[1].x, i64::MAX - 1);
        assert_eq!(pixels[0].y, i64::MIN);
    }

    #[test]
    fn pure_red() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let pixels = from_image(&DynamicImage::ImageRgba8(image), (0, 0)).unwrap();
        assert_eq!(pixels[0].color, "FF0000");
    }

    #[test]
    fn sixteen_bit_is_scaled_down() {
        let image: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 1, Rgba([u16::MAX, 0, 0, u16::MAX]));
        let pixels = from_image(&DynamicImage::ImageRgba16(image), (0, 0)).unwrap();

        assert_eq!(pixels.len(), 2);
        assert!(pixels.iter().all(|pixel| pixel.color == "FF0000"));
    }

    #[test]
    fn sixteen_bit_faint_alpha_is_visible() {
        let image: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgba([0, u16::MAX, 0, 1]));
        let pixels = from_image(&DynamicImage::ImageRgba16(image), (0, 0)).unwrap();

        assert_eq!(pixels, [Pixel::new(0, 0, [0, 255, 0])]);
    }

    #[test]
    fn fully_transparent_image_is_empty() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        assert!(
            from_image(&DynamicImage::ImageRgba8(image), (0, 0))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn decodes_png() {
        let pixels = load_memory(&encode_png(sample()), (10, 20)).unwrap();

        assert_eq!(pixels.len(), 4);
        assert_eq!(pixels[3], Pixel::new(12, 21, [200, 100, 7]));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let error = load_memory(b"definitely not a png", (0, 0)).unwrap_err();
        assert!(matches!(error, Error::Decode(..)));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let error = load_path("/nonexistent/pixeldeck/image.png", (0, 0)).unwrap_err();
        assert!(matches!(error, Error::Open { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("pixeldeck-{}.png", std::process::id()));
        std::fs::write(&path, encode_png(sample())).unwrap();

        let pixels = load_path(&path, (0, 0));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(pixels.unwrap().len(), 4);
    }
}

use image::{GrayImage, Luma, Rgb, RgbImage};

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 400;

/// Center of every synthetic target field, 51 px above the midline.
pub const CENTER: (u32, u32) = (200, 149);

/// Odd side lengths, outermost first.
pub const SIDES: [u32; 3] = [201, 121, 61];

/// Concentric squares with alternating colors, the outermost one painted
/// `first` over a `background` page.
pub fn target_field(background: u8, first: u8) -> GrayImage {
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, Luma([background]));
    let second = 255 - first;
    for (i, side) in SIDES.into_iter().enumerate() {
        let value = if i % 2 == 0 { first } else { second };
        let half = side / 2;
        for y in CENTER.1 - half..=CENTER.1 + half {
            for x in CENTER.0 - half..=CENTER.0 + half {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
    img
}

pub fn to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

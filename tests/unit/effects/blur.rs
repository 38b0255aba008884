use super::*;

#[test]
fn blur_sigma_0_is_identity() {
    let src = RgbImage::from_raw(1, 2, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
    let out = gaussian_blur(&src, 0.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_rejects_bad_sigma() {
    let src = RgbImage::new(2, 2);
    assert!(gaussian_blur(&src, -1.0).is_err());
    assert!(gaussian_blur(&src, f32::NAN).is_err());
}

#[test]
fn blur_constant_image_is_identity() {
    let src = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
    let out = gaussian_blur(&src, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let mut src = RgbImage::new(7, 7);
    src.put_pixel(3, 3, image::Rgb([255, 255, 255]));

    let out = gaussian_blur(&src, 1.0).unwrap();

    let nonzero = out.pixels().filter(|px| px[0] != 0).count();
    assert!(nonzero > 1);
    assert!(out.get_pixel(3, 3)[0] < 255);

    let sum: u32 = out.pixels().map(|px| u32::from(px[0])).sum();
    assert!((sum as i32 - 255).abs() <= 8);
}

//! File round trips through the codec bridge.

#![cfg(all(feature = "png", feature = "tiff", feature = "pnm"))]

use approx::assert_abs_diff_eq;
use pdiff_core::{ChannelOrder, Pixel, RgbaImage};
use pdiff_io::ppm::PpmBackend;
use pdiff_io::{Backend, Bitmap, BitmapData, CodecBridge, IoError, PixelType};
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};

const RED: Pixel = Pixel::rgb(1.0, 0.0, 0.0);
const GREEN: Pixel = Pixel::rgb(0.0, 1.0, 0.0);
const BLUE: Pixel = Pixel::rgb(0.0, 0.0, 1.0);
const WHITE: Pixel = Pixel::rgb(1.0, 1.0, 1.0);

/// 2x2 with four distinct corners, so any flip or transpose shows.
fn checkerboard() -> RgbaImage {
    let mut img = RgbaImage::new(2, 2, Some("board")).unwrap();
    img.set(0, 0, RED);
    img.set(1, 0, GREEN);
    img.set(0, 1, BLUE);
    img.set(1, 1, WHITE);
    img
}

fn assert_board(img: &RgbaImage) {
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get(0, 0), RED);
    assert_eq!(img.get(1, 0), GREEN);
    assert_eq!(img.get(0, 1), BLUE);
    assert_eq!(img.get(1, 1), WHITE);
}

#[test]
fn checkerboard_roundtrip_all_formats() {
    let dir = TempDir::new().unwrap();
    for ext in ["png", "tif", "ppm", "pfm"] {
        let path = dir.path().join(format!("board.{}", ext));
        pdiff_io::save(&path, &checkerboard()).unwrap();
        let back = pdiff_io::load(&path).unwrap();
        assert_board(&back);
        assert_eq!(back.name(), Some(&*path.to_string_lossy()), "{}", ext);
    }
}

#[test]
fn channel_order_override_roundtrip() {
    let dir = TempDir::new().unwrap();
    let bridge = CodecBridge::new().with_channel_order(ChannelOrder::BGRA);
    for ext in ["png", "ppm"] {
        let path = dir.path().join(format!("bgra.{}", ext));
        bridge.save(&path, &checkerboard()).unwrap();
        assert_board(&bridge.load(&path).unwrap());
    }
}

#[test]
fn ppm_file_is_top_down() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.ppm");
    pdiff_io::save(&path, &checkerboard()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let header = b"P6\n2 2\n255\n";
    assert!(bytes.starts_with(header));
    assert_eq!(
        &bytes[header.len()..],
        &[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]
    );
}

#[test]
fn eight_bit_quantization_within_one_step() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("q.png");
    let mut img = RgbaImage::new(3, 1, None).unwrap();
    img.set(0, 0, Pixel::rgb(0.3, 0.6, 0.9));
    img.set(1, 0, Pixel::new(0.1, 0.2, 0.3, 0.5));
    img.set(2, 0, Pixel::rgb(1.5, -0.5, 0.5));
    pdiff_io::save(&path, &img).unwrap();

    let back = pdiff_io::load(&path).unwrap();
    let p = back.get(0, 0);
    assert_abs_diff_eq!(p.r(), 0.3, epsilon = 1.0 / 255.0);
    assert_abs_diff_eq!(p.g(), 0.6, epsilon = 1.0 / 255.0);
    assert_abs_diff_eq!(p.b(), 0.9, epsilon = 1.0 / 255.0);
    // alpha is not saved
    assert_eq!(back.get(1, 0).a(), 1.0);
    // out of range values clamp
    assert_eq!(back.get(2, 0).r(), 1.0);
    assert_eq!(back.get(2, 0).g(), 0.0);
}

#[test]
fn float_formats_keep_range() {
    let dir = TempDir::new().unwrap();
    let mut img = RgbaImage::new(1, 1, None).unwrap();
    img.set(0, 0, Pixel::new(2.5, -0.25, 0.125, 0.5));
    for ext in ["tif", "pfm"] {
        let path = dir.path().join(format!("hdr.{}", ext));
        pdiff_io::save(&path, &img).unwrap();
        let back = pdiff_io::load(&path).unwrap();
        assert_eq!(back.get(0, 0), Pixel::new(2.5, -0.25, 0.125, 1.0), "{}", ext);
    }
}

#[test]
fn sixteen_bit_uses_high_byte() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deep.ppm");
    let bmp = Bitmap::from_parts(
        2,
        1,
        PixelType::Rgb16,
        BitmapData::U16(vec![0xFFFF, 0x8000, 0x00FF, 0x0100, 0x7FFF, 0x0000]),
    )
    .unwrap();
    std::fs::write(&path, PpmBackend.encode(&bmp).unwrap()).unwrap();

    let img = pdiff_io::load(&path).unwrap();
    assert_eq!(img.get(0, 0).to_bytes(), [0xFF, 0x80, 0x00, 0xFF]);
    assert_eq!(img.get(1, 0).to_bytes(), [0x01, 0x7F, 0x00, 0xFF]);
}

fn write_tiff<C: colortype::ColorType>(path: &std::path::Path, w: u32, h: u32, data: &[C::Inner])
where
    [C::Inner]: tiff::encoder::TiffValue,
{
    let file = std::fs::File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<C>(w, h, data)
        .unwrap();
}

#[test]
fn tiff_gray32_loads_high_byte() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gray32.tif");
    write_tiff::<colortype::Gray32>(&path, 2, 1, &[0, u32::MAX]);

    let img = pdiff_io::load(&path).unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get(0, 0), Pixel::new(0.0, 0.0, 0.0, 1.0));
    assert_eq!(img.get(1, 0), Pixel::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn tiff_rgba32_loads_high_byte() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rgba32.tif");
    let samples = [0x8000_0000, 0x0100_0000, 0x00FF_FFFF, u32::MAX];
    write_tiff::<colortype::RGBA32>(&path, 1, 1, &samples);

    let img = pdiff_io::load(&path).unwrap();
    assert_eq!(img.get(0, 0).to_bytes(), [0x80, 0x01, 0x00, 0xFF]);
}

#[test]
fn tiff_gray64_float_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gray64.tif");
    write_tiff::<colortype::Gray64Float>(&path, 1, 1, &[0.5]);

    assert!(matches!(
        pdiff_io::load(&path),
        Err(IoError::UnsupportedPixelType(_))
    ));
}

#[test]
fn unknown_format_rejected() {
    let dir = TempDir::new().unwrap();

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "just some text").unwrap();
    assert!(matches!(pdiff_io::load(&text), Err(IoError::UnsupportedFormat(_))));

    let out = dir.path().join("out.xyz");
    assert!(matches!(
        pdiff_io::save(&out, &checkerboard()),
        Err(IoError::UnsupportedFormat(_))
    ));
    assert!(!out.exists());
}

#[test]
fn detection_prefers_magic_bytes() {
    let dir = TempDir::new().unwrap();
    let png = dir.path().join("board.png");
    pdiff_io::save(&png, &checkerboard()).unwrap();
    let misnamed = dir.path().join("board.pfm");
    std::fs::copy(&png, &misnamed).unwrap();
    assert_board(&pdiff_io::load(&misnamed).unwrap());
}

#[test]
fn float_gray_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gray.pfm");
    let mut bytes = b"Pf\n1 1\n-1.0\n".to_vec();
    bytes.extend_from_slice(&0.5f32.to_le_bytes());
    std::fs::write(&path, bytes).unwrap();

    assert!(matches!(
        pdiff_io::load(&path),
        Err(IoError::UnsupportedPixelType(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = pdiff_io::load(dir.path().join("absent.png")).unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}

#[test]
fn save_named_uses_image_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("named.tif");
    let mut img = checkerboard();
    img.set_name(Some(&*path.to_string_lossy()));
    CodecBridge::new().save_named(&img).unwrap();
    assert_board(&pdiff_io::load(&path).unwrap());

    img.set_name(None);
    assert!(matches!(
        CodecBridge::new().save_named(&img),
        Err(IoError::InvalidFile(_))
    ));
}

//! Format detection.
//!
//! Detects image formats from magic bytes and file extensions.

use std::path::Path;

/// Image formats known to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// PNG.
    Png,
    /// TIFF.
    Tiff,
    /// Binary PPM (`P6`) or PGM (`P5`).
    Ppm,
    /// Portable Float Map (`PF` color, `Pf` gray).
    Pfm,
    /// Unrecognized.
    Unknown,
}

impl Format {
    /// Detects the format of a file already read into `bytes`.
    ///
    /// Magic bytes are checked first; the extension of `path` is the fallback.
    pub fn detect<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Self {
        match Self::from_bytes(bytes) {
            Format::Unknown => Self::from_extension(path),
            detected => detected,
        }
    }

    /// Detects format from file extension only (case-insensitive).
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("png") => Format::Png,
            Some("tif") | Some("tiff") => Format::Tiff,
            Some("ppm") | Some("pgm") | Some("pnm") => Format::Ppm,
            Some("pfm") => Format::Pfm,
            _ => Format::Unknown,
        }
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() >= 8 && bytes[0..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
            return Format::Png;
        }

        if bytes.len() >= 4
            && (bytes[0..4] == [b'I', b'I', 0x2A, 0x00] || bytes[0..4] == [b'M', b'M', 0x00, 0x2A])
        {
            return Format::Tiff;
        }

        // Netpbm family: two-byte tag followed by whitespace
        if bytes.len() >= 3 && bytes[0] == b'P' && bytes[2].is_ascii_whitespace() {
            match bytes[1] {
                b'5' | b'6' => return Format::Ppm,
                b'F' | b'f' => return Format::Pfm,
                _ => {}
            }
        }

        Format::Unknown
    }

    /// Canonical file extension, empty for [`Format::Unknown`].
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Tiff => "tif",
            Format::Ppm => "ppm",
            Format::Pfm => "pfm",
            Format::Unknown => "",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Png => "PNG",
            Format::Tiff => "TIFF",
            Format::Ppm => "PPM",
            Format::Pfm => "PFM",
            Format::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("a.PNG"), Format::Png);
        assert_eq!(Format::from_extension("dir/b.tiff"), Format::Tiff);
        assert_eq!(Format::from_extension("c.tif"), Format::Tiff);
        assert_eq!(Format::from_extension("d.pgm"), Format::Ppm);
        assert_eq!(Format::from_extension("e.pfm"), Format::Pfm);
        assert_eq!(Format::from_extension("f.xyz"), Format::Unknown);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            Format::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Format::Png
        );
        assert_eq!(Format::from_bytes(b"II*\0rest"), Format::Tiff);
        assert_eq!(Format::from_bytes(b"MM\0*rest"), Format::Tiff);
        assert_eq!(Format::from_bytes(b"P6\n2 2\n255\n"), Format::Ppm);
        assert_eq!(Format::from_bytes(b"P5 2 2 255 "), Format::Ppm);
        assert_eq!(Format::from_bytes(b"PF\n1 1\n-1.0\n"), Format::Pfm);
        assert_eq!(Format::from_bytes(b"Pf\n"), Format::Pfm);
        assert_eq!(Format::from_bytes(b"P3\n"), Format::Unknown);
        assert_eq!(Format::from_bytes(b"hello world"), Format::Unknown);
        assert_eq!(Format::from_bytes(b"P"), Format::Unknown);
    }

    #[test]
    fn test_detect_magic_then_extension() {
        assert_eq!(Format::detect("image.png", b"PF\n1 1\n-1.0\n"), Format::Pfm);
        assert_eq!(Format::detect("image.tif", b"??"), Format::Tiff);
        assert_eq!(Format::detect("image.PPM", b""), Format::Ppm);
        assert_eq!(Format::detect("image", b"??"), Format::Unknown);
    }
}

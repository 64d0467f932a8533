//! Content-type detection from leading bytes

/// Number of leading bytes the sniffer looks at.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

enum Signature {
    /// Case-insensitive HTML tag, followed by a tag-terminating byte.
    Html(&'static [u8]),
    /// Byte pattern compared under a mask, optionally after leading whitespace.
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
    },
    Exact(&'static [u8]),
    Mp4,
    Text,
}

const SIGNATURES: &[(Signature, &str)] = &[
    (Signature::Html(b"<!DOCTYPE HTML"), "text/html; charset=utf-8"),
    (Signature::Html(b"<HTML"), "text/html; charset=utf-8"),
    (Signature::Html(b"<HEAD"), "text/html; charset=utf-8"),
    (Signature::Html(b"<SCRIPT"), "text/html; charset=utf-8"),
    (Signature::Html(b"<IFRAME"), "text/html; charset=utf-8"),
    (Signature::Html(b"<H1"), "text/html; charset=utf-8"),
    (Signature::Html(b"<DIV"), "text/html; charset=utf-8"),
    (Signature::Html(b"<FONT"), "text/html; charset=utf-8"),
    (Signature::Html(b"<TABLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<A"), "text/html; charset=utf-8"),
    (Signature::Html(b"<STYLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<TITLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<B"), "text/html; charset=utf-8"),
    (Signature::Html(b"<BODY"), "text/html; charset=utf-8"),
    (Signature::Html(b"<BR"), "text/html; charset=utf-8"),
    (Signature::Html(b"<P"), "text/html; charset=utf-8"),
    (Signature::Html(b"<!--"), "text/html; charset=utf-8"),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\xFF",
            pattern: b"<?xml",
            skip_ws: true,
        },
        "text/xml; charset=utf-8",
    ),
    (Signature::Exact(b"%PDF-"), "application/pdf"),
    (Signature::Exact(b"%!PS-Adobe-"), "application/postscript"),
    // BOM-tagged text
    (
        Signature::Masked {
            mask: b"\xFF\xFF\x00\x00",
            pattern: b"\xFE\xFF\x00\x00",
            skip_ws: false,
        },
        "text/plain; charset=utf-16be",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\x00\x00",
            pattern: b"\xFF\xFE\x00\x00",
            skip_ws: false,
        },
        "text/plain; charset=utf-16le",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\x00",
            pattern: b"\xEF\xBB\xBF\x00",
            skip_ws: false,
        },
        TEXT_PLAIN_UTF8,
    ),
    // Images
    (Signature::Exact(b"\x00\x00\x01\x00"), "image/x-icon"),
    (Signature::Exact(b"\x00\x00\x02\x00"), "image/x-icon"),
    (Signature::Exact(b"BM"), "image/bmp"),
    (Signature::Exact(b"GIF87a"), "image/gif"),
    (Signature::Exact(b"GIF89a"), "image/gif"),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
            pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
            skip_ws: false,
        },
        "image/webp",
    ),
    (Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A"), "image/png"),
    (Signature::Exact(b"\xFF\xD8\xFF"), "image/jpeg"),
    // Audio and video
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            pattern: b"FORM\x00\x00\x00\x00AIFF",
            skip_ws: false,
        },
        "audio/aiff",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF",
            pattern: b"ID3",
            skip_ws: false,
        },
        "audio/mpeg",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\xFF",
            pattern: b"OggS\x00",
            skip_ws: false,
        },
        "application/ogg",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
            pattern: b"MThd\x00\x00\x00\x06",
            skip_ws: false,
        },
        "audio/midi",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            pattern: b"RIFF\x00\x00\x00\x00AVI ",
            skip_ws: false,
        },
        "video/avi",
    ),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            pattern: b"RIFF\x00\x00\x00\x00WAVE",
            skip_ws: false,
        },
        "audio/wave",
    ),
    (Signature::Mp4, "video/mp4"),
    (Signature::Exact(b"\x1A\x45\xDF\xA3"), "video/webm"),
    // Fonts
    (Signature::Exact(b"\x00\x01\x00\x00"), "font/ttf"),
    (Signature::Exact(b"OTTO"), "font/otf"),
    (Signature::Exact(b"ttcf"), "font/collection"),
    (Signature::Exact(b"wOFF"), "font/woff"),
    (Signature::Exact(b"wOF2"), "font/woff2"),
    // Archives
    (Signature::Exact(b"\x1F\x8B\x08"), "application/x-gzip"),
    (Signature::Exact(b"PK\x03\x04"), "application/zip"),
    (Signature::Exact(b"Rar!\x1A\x07\x00"), "application/x-rar-compressed"),
    (Signature::Exact(b"Rar!\x1A\x07\x01\x00"), "application/x-rar-compressed"),
    (Signature::Exact(b"\x00\x61\x73\x6D"), "application/wasm"),
    (Signature::Text, TEXT_PLAIN_UTF8),
];

/// Classifies `data` by its first [`SNIFF_LEN`] bytes.
///
/// Always returns a valid MIME type; `application/octet-stream` when nothing matches.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());

    SIGNATURES
        .iter()
        .find(|(signature, _)| signature.matches(data, first_non_ws))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(OCTET_STREAM)
}

impl Signature {
    fn matches(&self, data: &[u8], first_non_ws: usize) -> bool {
        match self {
            Signature::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return false;
                }
                let name_matches = tag
                    .iter()
                    .zip(data)
                    .all(|(t, d)| if t.is_ascii_uppercase() { d.to_ascii_uppercase() == *t } else { d == t });
                name_matches && is_tag_terminating(data[tag.len()])
            }
            Signature::Masked { mask, pattern, skip_ws } => {
                let data = if *skip_ws { &data[first_non_ws..] } else { data };
                data.len() >= pattern.len()
                    && pattern
                        .iter()
                        .zip(mask.iter())
                        .zip(data)
                        .all(|((p, m), d)| d & m == *p)
            }
            Signature::Exact(prefix) => data.starts_with(prefix),
            Signature::Mp4 => is_mp4(data),
            Signature::Text => !data[first_non_ws..].iter().any(|b| is_binary(*b)),
        }
    }
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }

    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }

    (8..box_size)
        .step_by(4)
        // bytes 12..16 hold the minor version, not a brand
        .filter(|start| *start != 12)
        .any(|start| &data[start..start + 3] == b"mp4")
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_tag_terminating(b: u8) -> bool {
    b == b' ' || b == b'>'
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_images() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];
        assert_eq!(detect_content_type(&png), "image/png");

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(detect_content_type(&jpeg), "image/jpeg");

        assert_eq!(detect_content_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(detect_content_type(b"RIFF\x10\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_detect_documents() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(
            detect_content_type(b"  <!DOCTYPE html><html></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(detect_content_type(b"<p>hi</p>"), "text/html; charset=utf-8");
        assert_eq!(
            detect_content_type(b"\n<?xml version=\"1.0\"?>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn test_html_tag_must_terminate() {
        // "<pre" starts like "<P" but is not followed by a tag-terminating byte
        assert_eq!(detect_content_type(b"<pre>x</pre>"), TEXT_PLAIN_UTF8);
    }

    #[test]
    fn test_detect_text_and_binary() {
        assert_eq!(detect_content_type(b"Hello, World!"), TEXT_PLAIN_UTF8);
        assert_eq!(detect_content_type(b""), TEXT_PLAIN_UTF8);
        assert_eq!(detect_content_type(b"\xEF\xBB\xBFbom text"), TEXT_PLAIN_UTF8);
        assert_eq!(detect_content_type(&[0x01, 0x02, 0x03, 0x04, 0x05]), OCTET_STREAM);
    }

    #[test]
    fn test_detect_archives_and_media() {
        assert_eq!(detect_content_type(b"PK\x03\x04rest"), "application/zip");
        assert_eq!(detect_content_type(b"\x1F\x8B\x08\x00"), "application/x-gzip");
        assert_eq!(detect_content_type(b"ID3\x04\x00"), "audio/mpeg");

        let mut mp4 = vec![0x00, 0x00, 0x00, 0x18];
        mp4.extend_from_slice(b"ftypmp42\x00\x00\x00\x00mp42isom");
        assert_eq!(detect_content_type(&mp4), "video/mp4");
    }

    #[test]
    fn test_only_leading_bytes_are_considered() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), TEXT_PLAIN_UTF8);
    }
}

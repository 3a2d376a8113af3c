//! Text string decoding
//!
//! PDF text strings are either UTF-16BE with a byte order mark or use
//! PDFDocEncoding, a Latin-1 superset defined in the PDF specification.
//! Code points of 0x0000 in the table (other than for byte 0) mark bytes
//! that are undefined in PDFDocEncoding.

use log::warn;

/// PDFDocEncoding byte-to-codepoint table
///
/// Identical to Latin-1 except for 0x18..=0x1F (accents) and the
/// 0x80..=0xA0 punctuation block.
pub const PDF_DOC_ENCODING: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007, 0x0008, 0x0009, 0x000a, 0x000b,
    0x000c, 0x000d, 0x000e, 0x000f, 0x0010, 0x0011, 0x0012, 0x0013, 0x0014, 0x0015, 0x0016, 0x0017,
    0x02d8, 0x02c7, 0x02c6, 0x02d9, 0x02dd, 0x02db, 0x02da, 0x02dc, 0x0020, 0x0021, 0x0022, 0x0023,
    0x0024, 0x0025, 0x0026, 0x0027, 0x0028, 0x0029, 0x002a, 0x002b, 0x002c, 0x002d, 0x002e, 0x002f,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038, 0x0039, 0x003a, 0x003b,
    0x003c, 0x003d, 0x003e, 0x003f, 0x0040, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x004a, 0x004b, 0x004c, 0x004d, 0x004e, 0x004f, 0x0050, 0x0051, 0x0052, 0x0053,
    0x0054, 0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005a, 0x005b, 0x005c, 0x005d, 0x005e, 0x005f,
    0x0060, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x006a, 0x006b,
    0x006c, 0x006d, 0x006e, 0x006f, 0x0070, 0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077,
    0x0078, 0x0079, 0x007a, 0x007b, 0x007c, 0x007d, 0x007e, 0x0000, 0x2022, 0x2020, 0x2021, 0x2026,
    0x2014, 0x2013, 0x0192, 0x2044, 0x2039, 0x203a, 0x2212, 0x2030, 0x201e, 0x201c, 0x201d, 0x2018,
    0x2019, 0x201a, 0x2122, 0xfb01, 0xfb02, 0x0141, 0x0152, 0x0160, 0x0178, 0x017d, 0x0131, 0x0142,
    0x0153, 0x0161, 0x017e, 0x0000, 0x20ac, 0x00a1, 0x00a2, 0x00a3, 0x00a4, 0x00a5, 0x00a6, 0x00a7,
    0x00a8, 0x00a9, 0x00aa, 0x00ab, 0x00ac, 0x0000, 0x00ae, 0x00af, 0x00b0, 0x00b1, 0x00b2, 0x00b3,
    0x00b4, 0x00b5, 0x00b6, 0x00b7, 0x00b8, 0x00b9, 0x00ba, 0x00bb, 0x00bc, 0x00bd, 0x00be, 0x00bf,
    0x00c0, 0x00c1, 0x00c2, 0x00c3, 0x00c4, 0x00c5, 0x00c6, 0x00c7, 0x00c8, 0x00c9, 0x00ca, 0x00cb,
    0x00cc, 0x00cd, 0x00ce, 0x00cf, 0x00d0, 0x00d1, 0x00d2, 0x00d3, 0x00d4, 0x00d5, 0x00d6, 0x00d7,
    0x00d8, 0x00d9, 0x00da, 0x00db, 0x00dc, 0x00dd, 0x00de, 0x00df, 0x00e0, 0x00e1, 0x00e2, 0x00e3,
    0x00e4, 0x00e5, 0x00e6, 0x00e7, 0x00e8, 0x00e9, 0x00ea, 0x00eb, 0x00ec, 0x00ed, 0x00ee, 0x00ef,
    0x00f0, 0x00f1, 0x00f2, 0x00f3, 0x00f4, 0x00f5, 0x00f6, 0x00f7, 0x00f8, 0x00f9, 0x00fa, 0x00fb,
    0x00fc, 0x00fd, 0x00fe, 0x00ff,
];

/// Decode a text string: UTF-16BE when it starts with the 0xFE 0xFF byte
/// order mark, PDFDocEncoding otherwise.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        decode_utf16be(&bytes[2..])
    } else {
        decode_pdf_doc(bytes)
    }
}

/// Decode UTF-16BE data (without a BOM); unpaired surrogates become U+FFFD
pub fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| {
            if pair.len() == 2 {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                // Odd trailing byte; keep what we can
                u16::from(pair[0])
            }
        })
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode PDFDocEncoding bytes; undefined bytes become U+FFFD
pub fn decode_pdf_doc(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            let cp = PDF_DOC_ENCODING[b as usize];
            if cp == 0 && b != 0 {
                warn!("byte 0x{:02X} is not defined in PDFDocEncoding", b);
                char::REPLACEMENT_CHARACTER
            } else {
                // The table only holds BMP code points
                char::from_u32(u32::from(cp)).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_text_string(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_utf16_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x74, 0x00, 0x65, 0x00, 0x73, 0x00, 0x74];
        assert_eq!(decode_text_string(&bytes), "test");
    }

    #[test]
    fn test_decode_utf16_surrogate_pair() {
        // U+1D11E MUSICAL SYMBOL G CLEF
        let bytes = [0xFE, 0xFF, 0xD8, 0x34, 0xDD, 0x1E];
        assert_eq!(decode_text_string(&bytes), "\u{1D11E}");
    }

    #[test]
    fn test_decode_pdf_doc_punctuation_block() {
        // 0x9C = oe ligature, 0x92 = trademark sign
        let bytes = [0x54, 0x65, 0x73, 0x74, 0x69, 0x6E, 0x67, 0x9C, 0x92];
        assert_eq!(decode_text_string(&bytes), "Testing\u{0153}\u{2122}");
    }

    #[test]
    fn test_decode_pdf_doc_accents() {
        assert_eq!(decode_pdf_doc(&[0x18, 0x19]), "\u{02D8}\u{02C7}");
    }

    #[test]
    fn test_decode_pdf_doc_latin1_region() {
        assert_eq!(decode_pdf_doc(&[0xE9]), "\u{00E9}"); // e acute
        assert_eq!(decode_pdf_doc(&[0xA0]), "\u{20AC}"); // euro sign, not NBSP
    }

    #[test]
    fn test_decode_pdf_doc_undefined_byte() {
        assert_eq!(decode_pdf_doc(&[0x7F]), "\u{FFFD}");
        assert_eq!(decode_pdf_doc(&[0x9F]), "\u{FFFD}");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_text_string(b""), "");
    }
}

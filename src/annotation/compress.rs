//! Zip + base64 encoding of oversized annotation values.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{Cursor, Read, Write};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const ENTRY_NAME: &str = "original";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Stores `data` as the single entry of a zip archive and base64-encodes it.
pub(crate) fn zip_and_encode(data: &[u8]) -> ZipResult<String> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(ENTRY_NAME, options)?;
    writer.write_all(data)?;
    let archive = writer.finish()?.into_inner();
    Ok(STANDARD.encode(archive))
}

/// Decodes an annotation value written by [`zip_and_encode`], or plain base64.
///
/// Returns None if the value is not base64.
pub(crate) fn decode(value: &str) -> Option<ZipResult<Vec<u8>>> {
    let decoded = STANDARD.decode(value).ok()?;
    if decoded.starts_with(ZIP_MAGIC) {
        Some(unzip(&decoded))
    } else {
        Some(Ok(decoded))
    }
}

fn unzip(archive: &[u8]) -> ZipResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut entry = archive.by_name(ENTRY_NAME)?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_roundtrip() {
        let data = br#"{"data":{"key":"value"}}"#;
        let encoded = zip_and_encode(data).unwrap();
        let decoded = decode(&encoded).unwrap().unwrap();
        assert_eq!(decoded, data.to_vec());
    }

    #[test]
    fn test_plain_base64() {
        let encoded = STANDARD.encode(b"{}");
        assert_eq!(decode(&encoded).unwrap().unwrap(), b"{}".to_vec());
    }

    #[test]
    fn test_not_base64() {
        assert!(decode("{\"a\":1}").is_none());
    }
}

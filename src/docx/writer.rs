//! DOCX package writing.
//!
//! The output zip carries every part of the source package unchanged except
//! word/document.xml, in the original entry order. Media parts are stored
//! uncompressed, matching how Word itself packages them.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";

/// Serialize a package with a replaced word/document.xml to bytes.
pub fn build_package(container: &OoxmlContainer, document_xml: &str) -> Result<Vec<u8>> {
    let entries = container.entries()?;
    let cursor = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(cursor);

    let mut wrote_document = false;
    for (name, data) in &entries {
        let method = if name.starts_with("word/media/") {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default().compression_method(method);

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::Write(e.to_string()))?;
        if name == DOCUMENT_PART {
            writer
                .write_all(document_xml.as_bytes())
                .map_err(|e| Error::Write(e.to_string()))?;
            wrote_document = true;
        } else {
            writer
                .write_all(data)
                .map_err(|e| Error::Write(e.to_string()))?;
        }
    }

    if !wrote_document {
        return Err(Error::MissingComponent(DOCUMENT_PART.to_string()));
    }

    let cursor = writer
        .finish()
        .map_err(|e| Error::Write(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Write a package with a replaced word/document.xml to disk.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so a failed write never leaves a truncated document behind.
pub fn write_package<P: AsRef<Path>>(
    container: &OoxmlContainer,
    document_xml: &str,
    out_path: P,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let bytes = build_package(container, document_xml)?;

    let dir = out_path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(|e| Error::Write(e.to_string()))?;

    tmp.write_all(&bytes)
        .map_err(|e| Error::Write(e.to_string()))?;
    tmp.persist(out_path)
        .map_err(|e| Error::Write(e.to_string()))?;
    Ok(())
}

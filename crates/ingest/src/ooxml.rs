use std::io::{Cursor, Read};

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::sentinel::UnreadableReason;

/// Maximum decompressed bytes read from a single archive entry.
pub(crate) const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

pub(crate) type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

#[derive(Debug, Error)]
pub(crate) enum OoxmlError {
    #[error("archive error: {0}")]
    Zip(#[from] ZipError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry `{0}` exceeds {MAX_XML_ENTRY_BYTES} bytes")]
    EntryTooLarge(String),
    #[error("required entry `{0}` is missing")]
    MissingEntry(&'static str),
}

impl OoxmlError {
    pub(crate) fn reason(&self) -> UnreadableReason {
        match self {
            Self::EntryTooLarge(_) => UnreadableReason::EntryTooLarge,
            _ => UnreadableReason::CorruptArchive,
        }
    }
}

pub(crate) fn open_archive(bytes: &[u8]) -> Result<Archive<'_>, OoxmlError> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Reads one entry with a decompression bound. A missing entry is `None`.
pub(crate) fn read_entry(archive: &mut Archive<'_>, name: &str) -> Result<Option<Vec<u8>>, OoxmlError> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(error.into()),
    };

    let mut out = Vec::new();
    entry.take(MAX_XML_ENTRY_BYTES + 1).read_to_end(&mut out)?;
    if out.len() as u64 > MAX_XML_ENTRY_BYTES {
        return Err(OoxmlError::EntryTooLarge(name.to_string()));
    }
    Ok(Some(out))
}

/// Value of the attribute whose local name is `local` (namespace prefix ignored).
pub(crate) fn attribute(
    element: &quick_xml::events::BytesStart<'_>,
    local: &[u8],
) -> Option<String> {
    element.attributes().flatten().find_map(|attr| {
        (attr.key.local_name().as_ref() == local)
            .then(|| attr.unescape_value().ok().map(|value| value.into_owned()))
            .flatten()
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Builds an in-memory zip archive from `(path, contents)` pairs.
    pub(crate) fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).expect("start entry");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }
}

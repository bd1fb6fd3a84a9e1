//! DOCX package (OPC zip container) reading and writing.

use crate::error::{RedactorError, RedactorResult};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document part name.
pub const MAIN_PART: &str = "word/document.xml";

/// One zip entry.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    /// Stored parts stay stored; everything else is written deflated
    compression: CompressionMethod,
}

fn writable(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

/// All entries of a DOCX package, in archive order.
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    entries: Vec<Entry>,
}

impl DocxPackage {
    /// Reads a package from disk.
    pub fn open(path: &Path) -> RedactorResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Reads a package from memory; the main document part must exist.
    pub fn from_bytes(bytes: &[u8]) -> RedactorResult<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| RedactorError::docx("<archive>", e))?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| RedactorError::docx("<archive>", e))?;
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| RedactorError::docx(name.as_str(), e))?;
            entries.push(Entry {
                is_dir: file.is_dir(),
                compression: writable(file.compression()),
                name,
                data,
            });
        }
        let package = Self { entries };
        if package.part(MAIN_PART).is_none() {
            return Err(RedactorError::docx(MAIN_PART, "missing main document part"));
        }
        Ok(package)
    }

    /// Bytes of a named part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Replaces (or adds) a part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                is_dir: false,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    /// Names of header parts (`word/header*.xml`).
    pub fn header_parts(&self) -> Vec<String> {
        self.parts_matching("word/header")
    }

    /// Names of footer parts (`word/footer*.xml`).
    pub fn footer_parts(&self) -> Vec<String> {
        self.parts_matching("word/footer")
    }

    fn parts_matching(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir && e.name.starts_with(prefix) && e.name.ends_with(".xml"))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Serializes the package.
    pub fn to_bytes(&self) -> RedactorResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let part = entry.name.as_str();
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                zip.add_directory(part, options)
                    .map_err(|e| RedactorError::docx(part, e))?;
                continue;
            }
            zip.start_file(part, options)
                .map_err(|e| RedactorError::docx(part, e))?;
            zip.write_all(&entry.data)
                .map_err(|e| RedactorError::docx(part, e))?;
        }
        let cursor = zip
            .finish()
            .map_err(|e| RedactorError::docx("<archive>", e))?;
        Ok(cursor.into_inner())
    }

    /// Writes the package to `path`.
    pub fn save(&self, path: &Path) -> RedactorResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

impl DocxPackage {
    /// A package holding nothing but the given main document part.
    pub fn minimal(document_xml: Vec<u8>) -> Self {
        let entry = |name: &str, data: Vec<u8>| Entry {
            name: name.to_string(),
            data,
            is_dir: false,
            compression: CompressionMethod::Deflated,
        };
        Self {
            entries: vec![
                entry("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
                entry("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
                entry(MAIN_PART, document_xml),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_package_round_trip() {
        let doc = b"<w:document/>".to_vec();
        let bytes = DocxPackage::minimal(doc.clone()).to_bytes().unwrap();
        let package = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(package.part(MAIN_PART), Some(doc.as_slice()));
        assert!(package.part("_rels/.rels").is_some());
        assert!(package.header_parts().is_empty());
    }

    #[test]
    fn test_missing_main_part_rejected() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        let err = DocxPackage::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("missing main document part"));
    }

    #[test]
    fn test_part_compression_is_kept() {
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", deflated).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        zip.start_file("word/media/image1.png", stored).unwrap();
        zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        zip.start_file(MAIN_PART, deflated).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let mut package = DocxPackage::from_bytes(&bytes).unwrap();
        package.set_part(MAIN_PART, b"<w:document></w:document>".to_vec());
        package.set_part("word/header1.xml", b"<w:hdr/>".to_vec());
        let rewritten = package.to_bytes().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(rewritten)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(
            names,
            ["[Content_Types].xml", "word/media/image1.png", MAIN_PART, "word/header1.xml"]
        );
        let method = |archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str| {
            archive.by_name(name).unwrap().compression()
        };
        assert_eq!(method(&mut archive, "word/media/image1.png"), CompressionMethod::Stored);
        assert_eq!(method(&mut archive, MAIN_PART), CompressionMethod::Deflated);
        assert_eq!(method(&mut archive, "word/header1.xml"), CompressionMethod::Deflated);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(DocxPackage::from_bytes(b"%PDF-1.7").is_err());
    }
}

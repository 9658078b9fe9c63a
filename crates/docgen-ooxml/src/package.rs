//! Zip container access for `.docx` and `.xlsx` files

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{OoxmlError, Result};

/// Document family, deciding which parts carry placeholder text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Word,
    Spreadsheet,
}

impl Family {
    /// Part every valid container of this family has
    pub fn main_part(self) -> &'static str {
        match self {
            Family::Word => "word/document.xml",
            Family::Spreadsheet => "xl/workbook.xml",
        }
    }

    /// Rank of a text part in reading order, `None` for other parts
    pub fn text_rank(self, name: &str) -> Option<u8> {
        match self {
            Family::Word => {
                let file = name.strip_prefix("word/")?;
                if file.contains('/') || !file.ends_with(".xml") {
                    return None;
                }
                match file {
                    "document.xml" => Some(0),
                    "footnotes.xml" => Some(3),
                    "endnotes.xml" => Some(4),
                    f if f.starts_with("header") => Some(1),
                    f if f.starts_with("footer") => Some(2),
                    _ => None,
                }
            }
            Family::Spreadsheet => match name {
                "xl/sharedStrings.xml" => Some(0),
                n if n.starts_with("xl/worksheets/")
                    && n.ends_with(".xml")
                    && !n["xl/worksheets/".len()..].contains('/') =>
                {
                    Some(1)
                }
                _ => None,
            },
        }
    }
}

fn open(buffer: &[u8], family: Family) -> Result<ZipArchive<Cursor<&[u8]>>> {
    let archive = ZipArchive::new(Cursor::new(buffer))?;
    if archive.index_for_name(family.main_part()).is_none() {
        return Err(OoxmlError::MissingPart(family.main_part()));
    }
    Ok(archive)
}

fn into_text(name: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| OoxmlError::Encoding {
        part: name.to_string(),
    })
}

/// Text parts of the container as `(name, xml)`, in reading order
pub fn text_parts(buffer: &[u8], family: Family) -> Result<Vec<(String, String)>> {
    let mut archive = open(buffer, family)?;
    let mut parts = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let Some(rank) = family.text_rank(&name) else {
            continue;
        };

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        parts.push((rank, name.clone(), into_text(&name, bytes)?));
    }

    parts.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(parts.into_iter().map(|(_, name, xml)| (name, xml)).collect())
}

/// Copy the container, passing every text part through `transform`.
///
/// Other entries are copied unchanged with their original compression.
pub fn rewrite<F>(buffer: &[u8], family: Family, mut transform: F) -> Result<Vec<u8>>
where
    F: FnMut(&str, &str) -> String,
{
    let mut archive = open(buffer, family)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(buffer.len())));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let options = SimpleFileOptions::default().compression_method(entry.compression());

        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;

        let bytes = if family.text_rank(&name).is_some() {
            let xml = into_text(&name, bytes)?;
            transform(&name, &xml).into_bytes()
        } else {
            bytes
        };

        writer.start_file(name, options)?;
        writer.write_all(&bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Build a zip container from `(name, content)` pairs
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Read one entry of a zip container
#[cfg(test)]
pub(crate) fn read_entry(buffer: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(buffer)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

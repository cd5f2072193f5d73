//! Catalog ingestion
//!
//! Turns a folder of price-catalog text files into the flat chunk file the
//! corpus loads from. Each catalog file carries `Main Category:` and
//! `Description:` headers followed by `Category:` sections containing
//! `Activity:` entries; one activity becomes one chunk, prefixed with its
//! category context so the chunk is self-describing.

use crate::error::Result;
use regex::Regex;
use std::path::Path;

/// Upper bound on chunk size in bytes. Oversized chunks are split at
/// `Work:` boundaries so each piece stays independently retrievable.
const MAX_CHUNK_BYTES: usize = 40_960;

/// Parse every `.txt` catalog file under `catalog_dir` into chunks.
pub fn ingest_catalog_dir(catalog_dir: &Path) -> Result<Vec<String>> {
    let mut chunks = Vec::new();

    for entry in walkdir::WalkDir::new(catalog_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())?;
        let file_chunks = parse_catalog_file(&content)?;
        tracing::info!("Ingested {:?}: {} chunks", entry.path(), file_chunks.len());
        chunks.extend(file_chunks);
    }

    Ok(chunks)
}

/// Parse one catalog file into chunks.
pub fn parse_catalog_file(content: &str) -> Result<Vec<String>> {
    let main_cat_re = Regex::new(r"Main Category: (.*)")?;
    let desc_re = Regex::new(r"Description: (.*)")?;
    // Line-anchored so the `Main Category:` header is not mistaken for a
    // category section
    let category_re = Regex::new(r"(?m)^\s*Category:")?;

    let main_category = main_cat_re
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let description = desc_re
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    let mut chunks = Vec::new();

    for cat_section in category_re.split(content).skip(1) {
        let cat_section = cat_section.trim();
        if cat_section.is_empty() {
            continue;
        }

        let (category_name, activities) = match cat_section.find("Activity:") {
            Some(pos) => (cat_section[..pos].trim(), &cat_section[pos..]),
            None => (cat_section, ""),
        };

        if activities.is_empty() {
            // Category with no activities still becomes one chunk
            let text = format!(
                "Main Category: {} Description: {} Category: {}",
                main_category,
                description,
                clean_chunk_text(category_name)?
            );
            chunks.extend(split_oversized(&text));
            continue;
        }

        for activity in activities.split("Activity:").skip(1) {
            let body = clean_chunk_text(&format!("Activity:{}", activity))?;
            let text = clean_chunk_text(&format!(
                "Main Category: {} Description: {} Category: {} {}",
                main_category, description, category_name, body
            ))?;
            chunks.extend(split_oversized(&text));
        }
    }

    Ok(chunks)
}

/// Flatten newlines and collapse catalog padding so each chunk fits on one
/// line of the chunk file.
fn clean_chunk_text(text: &str) -> Result<String> {
    let flat = text.trim().replace('\n', " ");
    let note_re = Regex::new(r"Note:\s{6,}")?;
    let ws_re = Regex::new(r" {4,}")?;
    let flat = note_re.replace_all(&flat, "Note:");
    Ok(ws_re.replace_all(&flat, " ").into_owned())
}

/// Recursively split a chunk exceeding `MAX_CHUNK_BYTES`, preferring `Work:`
/// boundaries and falling back to a char-safe byte cutoff.
fn split_oversized(text: &str) -> Vec<String> {
    if text.len() <= MAX_CHUNK_BYTES {
        return vec![text.to_string()];
    }

    // Last `Work:` that still leaves the head under the limit
    let split_pos = text
        .match_indices("Work:")
        .map(|(pos, _)| pos)
        .take_while(|&pos| pos < MAX_CHUNK_BYTES)
        .last();

    let cut = match split_pos {
        Some(pos) if pos > 0 => pos,
        _ => char_safe_cutoff(text, MAX_CHUNK_BYTES),
    };

    let head = text[..cut].trim();
    let rest = text[cut..].trim();

    let mut result = Vec::new();
    if !head.is_empty() {
        result.push(head.to_string());
    }
    if !rest.is_empty() {
        result.extend(split_oversized(rest));
    }
    result
}

/// Largest char boundary at or below `limit`
fn char_safe_cutoff(text: &str, limit: usize) -> usize {
    let mut cut = limit.min(text.len());
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

/// Write chunks to the flat corpus file, one per line.
pub fn write_chunk_file(chunks: &[String], out_path: &Path) -> Result<()> {
    let mut out = String::with_capacity(chunks.iter().map(|c| c.len() + 1).sum());
    for chunk in chunks {
        out.push_str(chunk);
        out.push('\n');
    }
    std::fs::write(out_path, out)?;
    tracing::info!("Wrote {} chunks to {:?}", chunks.len(), out_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Main Category: Opere edili\n\
        Description: Prezziario regionale\n\
        Category: Demolizioni\n\
        Activity: Demolizione di muratura\n\
        Work: rimozione macerie Codice: 01.A01, U.M.: mc, Euro: 45.20\n\
        Activity: Demolizione di pavimento\n\
        Work: taglio e rimozione Codice: 01.A02, U.M.: mq, Euro: 12.80\n\
        Category: Tinteggiature\n\
        Activity: Tinteggiatura pareti interne\n\
        Work: due mani di idropittura Codice: 02.B01, U.M.: mq, Euro: 6.50\n";

    #[test]
    fn test_parse_splits_by_activity() {
        let chunks = parse_catalog_file(SAMPLE).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].starts_with("Main Category: Opere edili"));
        assert!(chunks[0].contains("Category: Demolizioni"));
        assert!(chunks[0].contains("Activity: Demolizione di muratura"));
        assert!(chunks[2].contains("Tinteggiatura pareti interne"));
    }

    #[test]
    fn test_parse_chunks_are_single_line() {
        let chunks = parse_catalog_file(SAMPLE).unwrap();
        assert!(chunks.iter().all(|c| !c.contains('\n')));
    }

    #[test]
    fn test_category_without_activity_still_chunked() {
        let content = "Main Category: A\nDescription: B\nCategory: Solo categoria\n";
        let chunks = parse_catalog_file(content).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("Category: Solo categoria"));
    }

    #[test]
    fn test_clean_collapses_padding() {
        let cleaned = clean_chunk_text("Activity: x    Note:        y      z").unwrap();
        assert!(!cleaned.contains("    "));
        assert!(cleaned.contains("Note:"));
    }

    #[test]
    fn test_split_oversized_at_work_boundary() {
        let head = "Activity: big ".repeat(3000); // > 40960 bytes
        let text = format!("{}Work: part two", head);
        let pieces = split_oversized(&text);
        assert!(pieces.len() >= 2);
        assert!(pieces.iter().all(|p| p.len() <= MAX_CHUNK_BYTES));
        assert!(pieces.iter().any(|p| p.contains("part two")));
    }

    #[test]
    fn test_split_oversized_without_work_marker() {
        let text = "x".repeat(MAX_CHUNK_BYTES * 2 + 10);
        let pieces = split_oversized(&text);
        assert!(pieces.len() >= 2);
        assert!(pieces.iter().all(|p| p.len() <= MAX_CHUNK_BYTES));
    }

    #[test]
    fn test_small_chunk_untouched() {
        let pieces = split_oversized("Activity: piccola");
        assert_eq!(pieces, vec!["Activity: piccola".to_string()]);
    }
}

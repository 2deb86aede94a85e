use std::path::Path;

use lopdf::Document;

use crate::error::HistoryError;
use crate::models::{DrawHistory, GameConfig};
use crate::reconstruct::reconstruct;

const PDF_MAGIC: &[u8] = b"%PDF";

pub fn read_source(path: &Path) -> Result<Vec<u8>, HistoryError> {
    std::fs::read(path).map_err(|e| HistoryError::unreadable(path, e))
}

/// Texte brut de la source : extraction page par page pour un PDF, lecture
/// directe (UTF-8 avec remplacement) pour tout autre fichier.
pub fn text_from_bytes(path: &Path, bytes: &[u8]) -> Result<String, HistoryError> {
    let text = if bytes.starts_with(PDF_MAGIC) {
        extract_pdf_text(bytes).map_err(|e| HistoryError::unreadable(path, e))?
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    if text.trim().is_empty() {
        return Err(HistoryError::unreadable(path, "aucun texte extractible"));
    }
    Ok(text)
}

pub fn extract_text(path: &Path) -> Result<String, HistoryError> {
    let bytes = read_source(path)?;
    text_from_bytes(path, &bytes)
}

/// Les pages illisibles ou vides sont sautées ; seul l'échec de chargement du document est fatal.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let doc = Document::load_mem(bytes)?;
    let mut pages = Vec::new();

    for (page_number, _) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text),
            Ok(_) => log::debug!("Page {page_number} vide"),
            Err(e) => log::warn!("Page {page_number} ignorée : {e}"),
        }
    }

    log::debug!("{} pages de texte extraites", pages.len());
    Ok(pages.join("\n"))
}

/// Extraction + reconstruction. Une source illisible ou sans tirage est une erreur franche.
pub fn load_history(path: &Path, config: &GameConfig) -> Result<DrawHistory, HistoryError> {
    let text = extract_text(path)?;
    reconstruct(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("multimulti-source-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// PDF minimal, une page par entrée ; une chaîne vide donne une page blanche.
    fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 10.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let stream = Stream::new(dictionary! {}, content.encode().unwrap());
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    const NEWER: &str = "16616 01 02 03 04 05 06 07 08 09 10 11 12 13 14 15 16 17 18 19 20";
    const OLDER: &str = "16615 21 22 23 24 25 26 27 28 29 30 31 32 33 34 35 36 37 38 39 40";

    #[test]
    fn test_pdf_pages_extracted_in_order_blank_skipped() {
        let bytes = pdf_with_pages(&[NEWER, "", OLDER]);
        assert!(bytes.starts_with(PDF_MAGIC));

        let text = text_from_bytes(Path::new("wyniki.pdf"), &bytes).unwrap();
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec![NEWER, OLDER]);
    }

    #[test]
    fn test_pdf_file_loads() {
        let path = temp_file("wyniki.pdf", &pdf_with_pages(&[NEWER, ""]));
        let history = load_history(&path, &GameConfig::default()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.newest().draw_id, Some(16616));
        assert_eq!(history.newest().numbers, (1..=20).collect::<Vec<u8>>());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_blank_pdf_is_unreadable() {
        let path = temp_file("blank.pdf", &pdf_with_pages(&["", ""]));
        let err = load_history(&path, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, HistoryError::SourceUnreadable { .. }), "{err}");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let path = std::env::temp_dir().join("multimulti-absent/wyniki.pdf");
        let err = load_history(&path, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, HistoryError::SourceUnreadable { .. }), "{err}");
    }

    #[test]
    fn test_blank_file_is_unreadable() {
        let path = temp_file("blank.txt", b"  \n\t\n");
        let err = load_history(&path, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, HistoryError::SourceUnreadable { .. }), "{err}");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_corrupt_pdf_is_unreadable() {
        let path = temp_file("corrupt.pdf", b"%PDF-1.4\nce n'est pas un document");
        let err = load_history(&path, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, HistoryError::SourceUnreadable { .. }), "{err}");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_text_file_loads() {
        let contents = "16616 01 02 03 04 05 06 07 08 09 10 11 12 13 14 15 16 17 18 19 20\n\
                        16615 21 22 23 24 25 26 27 28 29 30 31 32 33 34 35 36 37 38 39 40\n";
        let path = temp_file("wyniki.txt", contents.as_bytes());
        let history = load_history(&path, &GameConfig::default()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.newest().draw_id, Some(16616));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_text_without_draws_is_no_usable_history() {
        let path = temp_file("empty-history.txt", b"Wyniki losowan Multi Multi\nBrak danych");
        let err = load_history(&path, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, HistoryError::NoUsableHistory { .. }), "{err}");
        std::fs::remove_file(path).unwrap();
    }
}

//! PDF text extraction, page by page.
//!
//! Parsing is CPU-bound; async callers should run it on a blocking thread.

use lopdf::Document;

use crate::{Error, Result};

/// Text extracted from each page, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
  pub pages: Vec<String>,
}

impl PdfText {
  /// All pages concatenated.
  pub fn text(&self) -> String {
    self
      .pages
      .iter()
      .map(|p| p.trim_end())
      .collect::<Vec<_>>()
      .join("\n")
  }
}

/// Load a PDF from memory and extract the text of every page.
///
/// A page whose text cannot be decoded contributes an empty string; a
/// document where every page is empty is an error.
pub fn extract_pages(bytes: &[u8]) -> Result<PdfText> {
  let doc = Document::load_mem(bytes).map_err(|e| Error::Pdf(e.to_string()))?;
  if doc.is_encrypted() {
    return Err(Error::EncryptedPdf);
  }

  let mut pages = Vec::new();
  for number in doc.get_pages().into_keys() {
    match doc.extract_text(&[number]) {
      Ok(text) => pages.push(text),
      Err(e) => {
        tracing::warn!(page = number, error = %e, "could not extract page text");
        pages.push(String::new());
      }
    }
  }

  if pages.iter().all(|p| p.trim().is_empty()) {
    return Err(Error::NoPdfText);
  }
  tracing::debug!(pages = pages.len(), "extracted PDF text");
  Ok(PdfText { pages })
}

#[cfg(test)]
pub(crate) mod tests {
  use lopdf::{
    Object, Stream,
    content::{Content, Operation},
    dictionary,
  };

  use super::*;

  /// A minimal PDF with one page per entry in `pages`; `None` is a page
  /// without content.
  pub(crate) fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
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

    let mut kids = Vec::new();
    for page in pages {
      let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
      };
      if let Some(text) = page {
        let content = Content {
          operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(*text)]),
            Operation::new("ET", vec![]),
          ],
        };
        let content_id =
          doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        page_dict.set("Contents", content_id);
      }
      kids.push(Object::from(doc.add_object(page_dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
      pages_id,
      Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
      }),
    );
    let catalog_id = doc.add_object(dictionary! {
      "Type" => "Catalog",
      "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
  }

  #[test]
  fn extracts_each_page_in_order() {
    let bytes = build_pdf(&[Some("Breaking headline"), Some("Second page body")]);
    let pdf = extract_pages(&bytes).unwrap();
    assert_eq!(pdf.pages.len(), 2);
    assert!(pdf.pages[0].contains("Breaking headline"));
    assert!(pdf.pages[1].contains("Second page body"));

    let all = pdf.text();
    let first = all.find("Breaking").unwrap();
    let second = all.find("Second").unwrap();
    assert!(first < second);
  }

  #[test]
  fn garbage_bytes_are_rejected() {
    let err = extract_pages(b"definitely not a pdf").unwrap_err();
    assert!(matches!(err, Error::Pdf(_)));
    assert!(err.is_bad_input());
  }

  #[test]
  fn document_without_text_is_rejected() {
    let bytes = build_pdf(&[None]);
    assert!(matches!(extract_pages(&bytes), Err(Error::NoPdfText)));
  }
}

//! Export engine
//!
//! Replays the modification store into a new PDF byte stream. The original
//! text objects are never edited: an `edit` paints an opaque white rectangle
//! over the original glyphs and draws the replacement on top, an `add` draws
//! directly. Output is deterministic for a given store: pages are handled
//! independently and, within a page, overrides paint in store order so
//! overlapping edits show the last one on top.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::error::RewriteError;
use crate::modification::{Modification, ModificationKind};
use crate::store::ModificationStore;

/// Resource names under which the two standard fonts are registered on
/// every painted page.
const FONT_REGULAR: &str = "FR1";
const FONT_BOLD: &str = "FR2";

/// White-out padding, in points. The rectangle covers
/// `[x - 0.5, y - 2]` to `[x + width + 1.5, y + font_size]` so anti-aliased
/// fringes of the original glyphs are fully occluded.
const PAD_LEFT: f64 = 0.5;
const PAD_BELOW: f64 = 2.0;
const PAD_WIDTH: f64 = 2.0;

/// Apply every modification to the original bytes and serialize a new file.
///
/// The store is only read; on failure the caller's in-memory state is
/// intact and a retry is always possible. Overrides addressing pages beyond
/// the document's page count are skipped, not errors.
pub fn export_document(
    pdf_bytes: &[u8],
    store: &ModificationStore,
) -> Result<Vec<u8>, RewriteError> {
    if store.is_empty() {
        // No changes, return the original bytes.
        return Ok(pdf_bytes.to_vec());
    }

    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| RewriteError::ParseError(e.to_string()))?;

    // One pair of font objects shared by every painted page.
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    for (page_num, page_id) in pages {
        // lopdf numbers pages from 1, the store from 0.
        let mods = store.by_page(page_num - 1);
        if mods.is_empty() {
            continue;
        }

        let ops = paint_operations(&mods);
        append_page_paint(&mut doc, page_id, ops)?;
        attach_standard_fonts(&mut doc, page_id, regular_id, bold_id)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| RewriteError::ExportError(e.to_string()))?;
    Ok(output)
}

/// Content-stream operations for one page's overrides, in store order.
fn paint_operations(mods: &[&Modification]) -> Vec<Operation> {
    let mut ops = Vec::new();

    for m in mods {
        if m.kind == ModificationKind::Edit {
            // White-out the original run. Painted even when the replacement
            // text is empty: a cleared edit still erases.
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new(
                "rg",
                vec![1.into(), 1.into(), 1.into()],
            ));
            ops.push(Operation::new(
                "re",
                vec![
                    Object::Real((m.x - PAD_LEFT) as f32),
                    Object::Real((m.y - PAD_BELOW) as f32),
                    Object::Real((m.width + PAD_WIDTH) as f32),
                    Object::Real((m.font_size + PAD_BELOW) as f32),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }

        if !m.text.is_empty() {
            let font = if m.is_bold { FONT_BOLD } else { FONT_REGULAR };
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "rg",
                vec![0.into(), 0.into(), 0.into()],
            ));
            ops.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(font.as_bytes().to_vec()),
                    Object::Real(m.font_size as f32),
                ],
            ));
            ops.push(Operation::new(
                "Td",
                vec![Object::Real(m.x as f32), Object::Real(m.y as f32)],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(m.text.as_str())],
            ));
            ops.push(Operation::new("ET", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
    }

    ops
}

/// Append painted operations after the page's existing content.
///
/// The original stream is wrapped in `q`/`Q` so whatever graphics state it
/// leaves behind cannot displace the overlay paint.
fn append_page_paint(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<Operation>,
) -> Result<(), RewriteError> {
    // A page without readable content still takes the overlay.
    let existing = doc.get_page_content(page_id).unwrap_or_default();

    let painted = Content { operations: ops }
        .encode()
        .map_err(|e| RewriteError::ExportError(e.to_string()))?;

    let mut content = Vec::with_capacity(existing.len() + painted.len() + 8);
    content.extend_from_slice(b"q\n");
    content.extend_from_slice(&existing);
    content.extend_from_slice(b"\nQ\n");
    content.extend_from_slice(&painted);

    doc.change_page_content(page_id, content)
        .map_err(|e| RewriteError::ExportError(e.to_string()))
}

/// Register the two standard fonts in the page's font resources.
///
/// The effective resources may be inline, a reference, or inherited from an
/// ancestor; the resolved dictionary is cloned onto the page so shared
/// state is never mutated.
fn attach_standard_fonts(
    doc: &mut Document,
    page_id: ObjectId,
    regular: ObjectId,
    bold: ObjectId,
) -> Result<(), RewriteError> {
    let mut resources = effective_resources(doc, page_id);

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(d)) => d.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .ok()
            .and_then(|o| o.as_dict().ok().cloned())
            .unwrap_or_default(),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_REGULAR, Object::Reference(regular));
    fonts.set(FONT_BOLD, Object::Reference(bold));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| RewriteError::ExportError(e.to_string()))?;
    let page_dict = page
        .as_dict_mut()
        .map_err(|e| RewriteError::ExportError(e.to_string()))?;
    page_dict.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Resolve the resources dictionary a page actually renders with,
/// following references and walking up the page tree when the entry is
/// inherited.
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = page_id;
    // Page trees are shallow; the cap only guards against reference cycles.
    for _ in 0..8 {
        let Some(dict) = doc
            .get_object(current)
            .ok()
            .and_then(|o| o.as_dict().ok())
        else {
            break;
        };

        match dict.get(b"Resources") {
            Ok(Object::Dictionary(d)) => return d.clone(),
            Ok(Object::Reference(id)) => {
                if let Some(d) = doc
                    .get_object(*id)
                    .ok()
                    .and_then(|o| o.as_dict().ok())
                {
                    return d.clone();
                }
            }
            _ => {}
        }

        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Dictionary::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::{Modification, ModificationKind, TextAlign};

    fn create_test_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn edit(text: &str) -> Modification {
        Modification {
            id: Modification::edit_id(0, 100.0, 700.0),
            page_index: 0,
            x: 100.0,
            y: 700.0,
            width: 40.0,
            height: 12.0,
            kind: ModificationKind::Edit,
            text: text.to_string(),
            original_text: "Hello".to_string(),
            font_size: 12.0,
            font_name: "sans-serif".to_string(),
            is_bold: false,
            is_italic: false,
            text_align: TextAlign::Left,
        }
    }

    fn store_with(mods: Vec<Modification>) -> ModificationStore {
        let mut store = ModificationStore::new();
        for m in mods {
            store.upsert(m);
        }
        store
    }

    fn page_operations(bytes: &[u8]) -> Vec<Operation> {
        let doc = Document::load_mem(bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content).unwrap().operations
    }

    fn operand(obj: &Object) -> f64 {
        match obj {
            Object::Real(v) => *v as f64,
            Object::Integer(v) => *v as f64,
            _ => panic!("expected numeric operand, got {:?}", obj),
        }
    }

    #[test]
    fn test_empty_store_returns_original_bytes() {
        let pdf = create_test_pdf();
        let store = ModificationStore::new();
        let out = export_document(&pdf, &store).unwrap();
        assert_eq!(out, pdf);
    }

    #[test]
    fn test_edit_paints_white_rect_then_text() {
        let pdf = create_test_pdf();
        let out = export_document(&pdf, &store_with(vec![edit("Goodbye")])).unwrap();
        assert!(out.starts_with(b"%PDF-"));

        let ops = page_operations(&out);

        let rect = ops
            .iter()
            .find(|op| op.operator == "re")
            .expect("white-out rectangle missing");
        assert!((operand(&rect.operands[0]) - 99.5).abs() < 0.01);
        assert!((operand(&rect.operands[1]) - 698.0).abs() < 0.01);
        assert!((operand(&rect.operands[2]) - 42.0).abs() < 0.01);
        assert!((operand(&rect.operands[3]) - 14.0).abs() < 0.01);

        let rect_pos = ops.iter().position(|op| op.operator == "re").unwrap();
        let text_pos = ops
            .iter()
            .position(|op| op.operator == "Tj")
            .expect("replacement text missing");
        assert!(rect_pos < text_pos, "text must paint over the white-out");

        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert!((operand(&td.operands[0]) - 100.0).abs() < 0.01);
        assert!((operand(&td.operands[1]) - 700.0).abs() < 0.01);

        let tj = &ops[text_pos];
        match &tj.operands[0] {
            Object::String(bytes, _) => assert_eq!(bytes, b"Goodbye"),
            other => panic!("unexpected Tj operand: {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_edit_whites_out_without_drawing() {
        let pdf = create_test_pdf();
        let out = export_document(&pdf, &store_with(vec![edit("")])).unwrap();
        let ops = page_operations(&out);

        assert!(ops.iter().any(|op| op.operator == "re"));
        assert!(
            !ops.iter().any(|op| op.operator == "Tj"),
            "a cleared edit must not draw any text"
        );
    }

    #[test]
    fn test_add_draws_text_without_rectangle() {
        let pdf = create_test_pdf();
        let m = Modification::insertion("add-t".to_string(), 0, 50.0, 742.0);
        let out = export_document(&pdf, &store_with(vec![m])).unwrap();
        let ops = page_operations(&out);

        assert!(!ops.iter().any(|op| op.operator == "re"));
        assert!(ops.iter().any(|op| op.operator == "Tj"));
    }

    #[test]
    fn test_bold_flag_selects_bold_font() {
        let pdf = create_test_pdf();
        let mut m = edit("Goodbye");
        m.is_bold = true;
        let out = export_document(&pdf, &store_with(vec![m])).unwrap();
        let ops = page_operations(&out);

        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert_eq!(tf.operands[0], Object::Name(b"FR2".to_vec()));
    }

    #[test]
    fn test_fonts_registered_in_page_resources() {
        let pdf = create_test_pdf();
        let out = export_document(&pdf, &store_with(vec![edit("x")])).unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();

        for name in ["FR1", "FR2"] {
            let font_ref = fonts.get(name.as_bytes()).unwrap().as_reference().unwrap();
            let font = doc.get_object(font_ref).unwrap().as_dict().unwrap();
            assert_eq!(font.get(b"Subtype").unwrap(), &Object::Name(b"Type1".to_vec()));
        }
    }

    #[test]
    fn test_within_page_order_is_store_order() {
        let pdf = create_test_pdf();
        let first = edit("first");
        let mut second = edit("second");
        second.id = Modification::edit_id(0, 100.0, 701.0);
        second.y = 701.0;

        let out = export_document(&pdf, &store_with(vec![first, second])).unwrap();
        let ops = page_operations(&out);

        let texts: Vec<Vec<u8>> = ops
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| match &op.operands[0] {
                Object::String(bytes, _) => bytes.clone(),
                _ => panic!(),
            })
            .collect();
        assert_eq!(texts, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn test_page_beyond_document_is_skipped() {
        let pdf = create_test_pdf();
        let mut m = edit("orphan");
        m.page_index = 5;
        m.id = Modification::edit_id(5, 100.0, 700.0);

        let out = export_document(&pdf, &store_with(vec![m])).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        // Nothing was painted anywhere.
        assert!(!out.windows(6).any(|w| w == b"orphan"));
    }

    #[test]
    fn test_failed_export_leaves_store_intact() {
        let store = store_with(vec![edit("keep me")]);
        let result = export_document(b"not a pdf at all", &store);
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("orig-0-100-700").unwrap().text, "keep me");
    }

    #[test]
    fn test_export_is_deterministic() {
        let pdf = create_test_pdf();
        let store = store_with(vec![edit("same")]);
        let a = export_document(&pdf, &store).unwrap();
        let b = export_document(&pdf, &store).unwrap();
        assert_eq!(a, b);
    }
}

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::ooxml::{open_archive, read_entry, OoxmlError};

const DOCUMENT: &str = "word/document.xml";

/// Text of `w:t` runs, one output line per `w:p` paragraph.
pub(crate) fn extract_docx(bytes: &[u8]) -> Result<String, OoxmlError> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, DOCUMENT)?.ok_or(OoxmlError::MissingEntry(DOCUMENT))?;
    paragraphs(&xml)
}

fn paragraphs(xml: &[u8]) -> Result<String, OoxmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) if element.local_name().as_ref() == b"t" => in_text = true,
            Event::Empty(element) => match element.local_name().as_ref() {
                b"tab" => line.push('\t'),
                b"br" | b"cr" => line.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text => line.push_str(&text.unescape()?),
            Event::End(element) => match element.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let finished = std::mem::take(&mut line);
                    if !finished.trim().is_empty() {
                        lines.push(finished.trim_end().to_string());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !line.trim().is_empty() {
        lines.push(line.trim_end().to_string());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::extract_docx;
    use crate::ooxml::fixtures::archive;
    use crate::ooxml::OoxmlError;

    #[test]
    fn paragraphs_become_lines() {
        let bytes = archive(&[(
            "word/document.xml",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Item 1:</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">ASTM A106 Gr.B </w:t></w:r><w:r><w:t>pipe</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>Delivery: Rotterdam &amp; Antwerp</w:t></w:r></w:p>
</w:body></w:document>"#,
        )]);

        let text = extract_docx(&bytes).expect("docx should extract");
        assert_eq!(text, "Item 1:\tASTM A106 Gr.B pipe\nDelivery: Rotterdam & Antwerp");
    }

    #[test]
    fn archive_without_document_part_is_an_error() {
        let bytes = archive(&[("docProps/app.xml", "<Properties/>")]);
        assert!(matches!(extract_docx(&bytes), Err(OoxmlError::MissingEntry(_))));
    }
}

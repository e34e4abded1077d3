//! OOXML backend tests against DOCX packages written with `zip::ZipWriter`.

use std::io::Write;
use std::path::{Path, PathBuf};

use docparse_core::{BackendError, DocxBackend, DocxMetadata, Metadata, assemble_docx};
use docparse_docx::OoxmlBackend;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

fn write_package(dir: &Path, name: &str, parts: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (part, content) in parts {
        writer.start_file(*part, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn write_docx(dir: &Path, name: &str, body: &str) -> PathBuf {
    let document = document_xml(body);
    write_package(
        dir,
        name,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", &document),
        ],
    )
}

fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

fn cell(text: &str) -> String {
    format!("<w:tc>{}</w:tc>", para(text))
}

#[test]
fn paragraphs_then_tables() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}{}<w:tbl><w:tr>{}{}</w:tr></w:tbl>",
        para("A"),
        para("B"),
        cell("C"),
        cell("D")
    );
    let path = write_docx(dir.path(), "simple.docx", &body);

    let doc = assemble_docx(&OoxmlBackend::new().read_body(&path).unwrap());
    assert_eq!(doc.text, "A\nB\nC D");
    assert_eq!(
        doc.metadata,
        Metadata::Docx(DocxMetadata {
            paragraphs: 2,
            word_count: 4,
        })
    );
}

#[test]
fn table_between_paragraphs_is_emitted_after_them() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}<w:tbl><w:tr>{}</w:tr><w:tr>{}</w:tr></w:tbl>{}",
        para("Intro"),
        cell("r1"),
        cell("r2"),
        para("Outro")
    );
    let path = write_docx(dir.path(), "order.docx", &body);

    let doc = assemble_docx(&OoxmlBackend::new().read_body(&path).unwrap());
    assert_eq!(doc.text, "Intro\nOutro\nr1 \nr2");
}

#[test]
fn merged_cells_repeat() {
    let dir = tempfile::tempdir().unwrap();
    let body = concat!(
        "<w:tbl>",
        r#"<w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Head</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"<w:tr><w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>Tall</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"<w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc><w:tc><w:p><w:r><w:t>y</w:t></w:r></w:p></w:tc></w:tr>"#,
        "</w:tbl>"
    );
    let path = write_docx(dir.path(), "merged.docx", body);

    let body = OoxmlBackend::new().read_body(&path).unwrap();
    assert_eq!(
        body.tables[0].rows,
        vec![
            vec!["Head", "Head"],
            vec!["Tall", "x"],
            vec!["Tall", "y"],
        ]
    );
    assert_eq!(body.paragraphs.len(), 0);
}

#[test]
fn hyperlinks_tabs_and_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let body = concat!(
        r#"<w:p><w:r><w:t>Name:</w:t><w:tab/><w:t>Value</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Visit </w:t></w:r><w:hyperlink r:id="rId9"><w:r><w:t>the site</w:t></w:r></w:hyperlink></w:p>"#,
        r#"<w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t><w:br w:type="page"/></w:r></w:p>"#,
    );
    let path = write_docx(dir.path(), "runs.docx", body);

    let body = OoxmlBackend::new().read_body(&path).unwrap();
    assert_eq!(
        body.paragraphs,
        vec!["Name:\tValue", "Visit the site", "line one\nline two"]
    );
}

#[test]
fn empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_docx(dir.path(), "empty.docx", "<w:p/>");

    let doc = assemble_docx(&OoxmlBackend::new().read_body(&path).unwrap());
    assert_eq!(doc.text, "");
    assert_eq!(doc.metadata.word_count(), 0);
}

#[test]
fn main_part_located_through_relationships() {
    let dir = tempfile::tempdir().unwrap();
    let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/main.xml"/></Relationships>"#;
    let document = document_xml(&para("relocated"));
    let path = write_package(
        dir.path(),
        "relocated.docx",
        &[("_rels/.rels", rels), ("word/main.xml", &document)],
    );

    let body = OoxmlBackend::new().read_body(&path).unwrap();
    assert_eq!(body.paragraphs, vec!["relocated"]);
}

#[test]
fn corrupt_zip_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.docx");
    std::fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();

    let err = OoxmlBackend::new().read_body(&path).unwrap_err();
    assert!(matches!(err, BackendError::OpenError(_)), "{err}");
}

#[test]
fn zip_without_document_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_package(dir.path(), "nodoc.docx", &[("hello.txt", "hi")]);

    let err = OoxmlBackend::new().read_body(&path).unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)), "{err}");
    assert!(err.to_string().contains("word/document.xml"), "{err}");
}

#[test]
fn broken_xml_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_package(
        dir.path(),
        "badxml.docx",
        &[("word/document.xml", "<w:document><w:body><w:p></w:body>")],
    );

    let err = OoxmlBackend::new().read_body(&path).unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)), "{err}");
}

#[test]
fn part_size_limit_applies() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_docx(dir.path(), "big.docx", &para(&"word ".repeat(200)));

    let err = OoxmlBackend::new()
        .with_max_part_bytes(256)
        .read_body(&path)
        .unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)), "{err}");

    assert!(OoxmlBackend::new().read_body(&path).is_ok());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = OoxmlBackend::new()
        .read_body(&dir.path().join("nope.docx"))
        .unwrap_err();
    assert!(matches!(err, BackendError::Io(_)), "{err}");
}

#[test]
fn deeply_nested_document_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let depth = 200_000;
    let body = format!(
        "{}{}",
        "<w:sdt>".repeat(depth),
        "</w:sdt>".repeat(depth)
    );
    let path = write_docx(dir.path(), "deep.docx", &body);

    let err = OoxmlBackend::new().read_body(&path).unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)), "{err}");
    assert!(err.to_string().contains("nesting too deep"), "{err}");
}

#[test]
fn wordprocessing_namespace_under_another_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ns0:document xmlns:ns0="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><ns0:body><ns0:p><ns0:r><ns0:t>Hello</ns0:t></ns0:r></ns0:p><ns0:tbl><ns0:tr><ns0:tc><ns0:p><ns0:r><ns0:t>cell</ns0:t></ns0:r></ns0:p></ns0:tc></ns0:tr></ns0:tbl></ns0:body></ns0:document>"#;
    let path = write_package(
        dir.path(),
        "ns0.docx",
        &[("_rels/.rels", ROOT_RELS), ("word/document.xml", document)],
    );

    let doc = assemble_docx(&OoxmlBackend::new().read_body(&path).unwrap());
    assert_eq!(doc.text, "Hello\ncell");
}

#[test]
fn tall_vertical_merge_reads_quickly() {
    let dir = tempfile::tempdir().unwrap();
    let rows = 20_000;
    let mut body = format!(
        r#"<w:tbl><w:tr><w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr>{}</w:tc>{}</w:tr>"#,
        para("key"),
        cell("0")
    );
    for i in 1..rows {
        body.push_str(&format!(
            r#"<w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>{}</w:tr>"#,
            cell(&i.to_string())
        ));
    }
    body.push_str("</w:tbl>");
    let path = write_docx(dir.path(), "tall.docx", &body);

    let started = std::time::Instant::now();
    let read = OoxmlBackend::new().read_body(&path).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(read.tables[0].rows.len(), rows);
    assert_eq!(read.tables[0].rows[rows - 1][0], "key");
}

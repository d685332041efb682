//! HTML serialization of [`ReportDocument`].

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::document::{
    ArtifactBlock, Block, Cell, FAILED_PLACEHOLDER, Figure, MISSING_PLACEHOLDER, ReportDocument,
    Table, TableKind,
};

/// Stylesheet shared by every report.
const STYLESHEET: &str = "\
body{font-family:Helvetica,sans-serif;color:#343434}\
img.banner{width:100%}\
h1{text-align:center;margin-bottom:0}\
h3{text-align:center;margin-bottom:25px}\
p.module{border:2px solid #666;padding-top:10px;padding-left:5px;background-color:#eee;font-size:14px}\
p.heading{font-size:12px;text-align:left;margin-bottom:0}\
p.subheading,p.artifact{font-size:10px;text-align:left;margin-bottom:0}\
p.filepath{font-size:10px;text-align:left;margin:0}\
div.figure{text-align:center}\
div.figure img{width:500px;margin-top:0}\
table{border:1px solid #666;width:100%}\
td,th{padding:4px 3px}\
table.key-value td{text-align:left}\
table.key-value td:first-child{width:20%}\
table.gallery td,table.gallery th{text-align:center}\
table.gallery img{display:block;width:100%}\
td.title{text-align:center}\
td.missing{font-style:italic}\
td.failed,p.failed{font-style:italic;color:#b22222}\
p.footer{font-size:8px;text-align:right;color:#888}";

impl ReportDocument {
    /// Serializes the document to a standalone HTML page.
    pub fn to_html(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
        writer.write_event(Event::Start(BytesStart::new("html")))?;

        writer.write_event(Event::Start(BytesStart::new("head")))?;
        let mut meta = BytesStart::new("meta");
        meta.push_attribute(("charset", "utf-8"));
        writer.write_event(Event::Empty(meta))?;
        write_text_element(&mut writer, "title", &self.title)?;
        write_text_element(&mut writer, "style", STYLESHEET)?;
        writer.write_event(Event::End(BytesEnd::new("head")))?;

        writer.write_event(Event::Start(BytesStart::new("body")))?;
        for block in &self.blocks {
            write_block(&mut writer, block)?;
        }
        writer.write_event(Event::End(BytesEnd::new("body")))?;
        writer.write_event(Event::End(BytesEnd::new("html")))?;

        String::from_utf8(writer.into_inner()).context("report HTML is not valid UTF-8")
    }
}

/// Serializes a list of blocks without the surrounding page.
pub fn render_blocks(blocks: &[Block]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    for block in blocks {
        write_block(&mut writer, block)?;
    }
    String::from_utf8(writer.into_inner()).context("report HTML is not valid UTF-8")
}

fn write_block<W: Write>(writer: &mut Writer<W>, block: &Block) -> Result<()> {
    match block {
        Block::Banner(path) => {
            let src = path_text(path);
            let mut img = BytesStart::new("img");
            img.push_attribute(("id", "top"));
            img.push_attribute(("class", "banner"));
            img.push_attribute(("src", src.as_str()));
            img.push_attribute(("alt", "micapipe"));
            writer.write_event(Event::Empty(img))?;
        }
        Block::Title(title) => write_text_element(writer, "h1", title)?,
        Block::SubjectLine { subject, session } => {
            writer.write_event(Event::Start(BytesStart::new("h3")))?;
            write_text_element(writer, "b", "Subject")?;
            writer.write_event(Event::Text(BytesText::new(&format!(": {subject} | "))))?;
            write_text_element(writer, "b", "Session")?;
            writer.write_event(Event::Text(BytesText::new(&format!(": {session}"))))?;
            writer.write_event(Event::End(BytesEnd::new("h3")))?;
        }
        Block::ModuleHeader(module) => {
            write_bold_paragraph(writer, "module", &format!("Module: {module}"))?;
        }
        Block::Heading(text) => write_bold_paragraph(writer, "heading", text)?,
        Block::Subheading(text) => write_bold_paragraph(writer, "subheading", text)?,
        Block::BulletList(items) => {
            writer.write_event(Event::Start(BytesStart::new("ul")))?;
            for item in items {
                write_text_element(writer, "li", item)?;
            }
            writer.write_event(Event::End(BytesEnd::new("ul")))?;
        }
        Block::Artifact(artifact) => write_artifact(writer, artifact)?,
        Block::Table(table) => write_table(writer, table)?,
        Block::Footer(text) => write_class_element(writer, "p", "footer", text)?,
    }
    Ok(())
}

fn write_artifact<W: Write>(writer: &mut Writer<W>, artifact: &ArtifactBlock) -> Result<()> {
    write_bold_paragraph(writer, "artifact", &artifact.name)?;
    let location = match (&artifact.path, &artifact.figure) {
        (Some(path), Figure::Image(_) | Figure::Failed) => path_text(path),
        _ => MISSING_PLACEHOLDER.to_string(),
    };
    write_class_element(writer, "p", "filepath", &format!("Filepath: {location}"))?;

    match &artifact.figure {
        Figure::Image(figure) => {
            let mut div = BytesStart::new("div");
            div.push_attribute(("class", "figure"));
            writer.write_event(Event::Start(div))?;
            write_image(writer, figure)?;
            writer.write_event(Event::End(BytesEnd::new("div")))?;
        }
        Figure::Failed => write_class_element(writer, "p", "failed", FAILED_PLACEHOLDER)?,
        Figure::Missing => {}
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut Writer<W>, table: &Table) -> Result<()> {
    let class = match table.kind {
        TableKind::KeyValue => "key-value",
        TableKind::Gallery => "gallery",
    };
    let mut start = BytesStart::new("table");
    start.push_attribute(("class", class));
    writer.write_event(Event::Start(start))?;

    if let Some(title) = &table.title {
        let colspan = table.width().max(1).to_string();
        writer.write_event(Event::Start(BytesStart::new("tr")))?;
        let mut td = BytesStart::new("td");
        td.push_attribute(("class", "title"));
        td.push_attribute(("colspan", colspan.as_str()));
        writer.write_event(Event::Start(td))?;
        writer.write_event(Event::Text(BytesText::new(title)))?;
        writer.write_event(Event::End(BytesEnd::new("td")))?;
        writer.write_event(Event::End(BytesEnd::new("tr")))?;
    }

    if !table.header.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("tr")))?;
        for label in &table.header {
            write_text_element(writer, "th", label)?;
        }
        writer.write_event(Event::End(BytesEnd::new("tr")))?;
    }

    for row in &table.rows {
        writer.write_event(Event::Start(BytesStart::new("tr")))?;
        for cell in row {
            match cell {
                Cell::Text(text) => write_text_element(writer, "td", text)?,
                Cell::Image(path) => {
                    writer.write_event(Event::Start(BytesStart::new("td")))?;
                    write_image(writer, path)?;
                    writer.write_event(Event::End(BytesEnd::new("td")))?;
                }
                Cell::Missing => write_class_element(writer, "td", "missing", MISSING_PLACEHOLDER)?,
                Cell::Failed => write_class_element(writer, "td", "failed", FAILED_PLACEHOLDER)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new("tr")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(())
}

fn write_image<W: Write>(writer: &mut Writer<W>, path: &Path) -> Result<()> {
    let src = path_text(path);
    let mut img = BytesStart::new("img");
    img.push_attribute(("src", src.as_str()));
    writer.write_event(Event::Empty(img))?;
    Ok(())
}

/// Write a simple text element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write a text element carrying a `class` attribute.
fn write_class_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    class: &str,
    text: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("class", class));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `<p class="..."><b>text</b></p>`.
fn write_bold_paragraph<W: Write>(writer: &mut Writer<W>, class: &str, text: &str) -> Result<()> {
    let mut start = BytesStart::new("p");
    start.push_attribute(("class", class));
    writer.write_event(Event::Start(start))?;
    write_text_element(writer, "b", text)?;
    writer.write_event(Event::End(BytesEnd::new("p")))?;
    Ok(())
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn renders_present_artifact_with_image() {
        let block = Block::Artifact(ArtifactBlock::rendered(
            "T1w nativepro",
            Path::new("/out/anat/t1.nii.gz"),
            PathBuf::from("/tmp/t1.png"),
        ));
        let html = render_blocks(&[block]).unwrap();
        insta::assert_snapshot!(html, @r#"<p class="artifact"><b>T1w nativepro</b></p><p class="filepath">Filepath: /out/anat/t1.nii.gz</p><div class="figure"><img src="/tmp/t1.png"/></div>"#);
    }

    #[test]
    fn renders_missing_artifact_as_placeholder() {
        let block = Block::Artifact(ArtifactBlock::missing("T1w nativepro"));
        let html = render_blocks(&[block]).unwrap();
        insta::assert_snapshot!(html, @r#"<p class="artifact"><b>T1w nativepro</b></p><p class="filepath">Filepath: does not exist</p>"#);
    }

    #[test]
    fn renders_failed_artifact_with_its_path() {
        let block = Block::Artifact(ArtifactBlock::failed(
            "T1w nativepro",
            Path::new("/out/anat/t1.nii.gz"),
        ));
        let html = render_blocks(&[block]).unwrap();
        insta::assert_snapshot!(html, @r#"<p class="artifact"><b>T1w nativepro</b></p><p class="filepath">Filepath: /out/anat/t1.nii.gz</p><p class="failed">figure could not be rendered</p>"#);
    }

    #[test]
    fn renders_table_with_title_and_placeholders() {
        let mut table = Table::gallery()
            .with_title("GD connectomes")
            .with_header(["Parcellation", "Connectomes"]);
        table.push_row(vec![Cell::text("aparc"), Cell::Image(PathBuf::from("/tmp/gd.png"))]);
        table.push_row(vec![Cell::text("vosdewael-100"), Cell::Missing]);
        table.push_row(vec![Cell::text("schaefer-100"), Cell::Failed]);
        let html = render_blocks(&[Block::Table(table)]).unwrap();
        insta::assert_snapshot!(html, @r#"<table class="gallery"><tr><td class="title" colspan="2">GD connectomes</td></tr><tr><th>Parcellation</th><th>Connectomes</th></tr><tr><td>aparc</td><td><img src="/tmp/gd.png"/></td></tr><tr><td>vosdewael-100</td><td class="missing">does not exist</td></tr><tr><td>schaefer-100</td><td class="failed">figure could not be rendered</td></tr></table>"#);
    }

    #[test]
    fn escapes_text() {
        let html = render_blocks(&[Block::Heading("A & B <C>".to_string())]).unwrap();
        assert!(html.contains("A &amp; B &lt;C&gt;"));
    }

    #[test]
    fn full_page_has_stylesheet_and_body() {
        let mut doc = ReportDocument::new("sub-01 proc_surf");
        doc.push(Block::Title("MICs".to_string()));
        let html = doc.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html><html><head><meta charset=\"utf-8\"/>"));
        assert!(html.contains("<title>sub-01 proc_surf</title>"));
        assert!(html.contains("<style>"));
        assert!(html.ends_with("<body><h1>MICs</h1></body></html>"));
    }
}

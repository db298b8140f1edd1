//! Commands that print a view of the document

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use super::{LoadOptions, load_document};

pub fn flatten(main: &Path, options: &LoadOptions, out: &mut impl Write) -> Result<()> {
    let document = load_document(main, options)?;
    out.write_all(document.get_source().as_bytes())?;
    Ok(())
}

pub fn text(main: &Path, options: &LoadOptions, out: &mut impl Write) -> Result<()> {
    let document = load_document(main, options)?;
    out.write_all(document.get_text().as_bytes())?;
    Ok(())
}

pub fn files(main: &Path, options: &LoadOptions, out: &mut impl Write) -> Result<()> {
    let document = load_document(main, options)?;
    for path in document.files() {
        writeln!(out, "{}", path)?;
    }
    Ok(())
}

pub fn dump(main: &Path, options: &LoadOptions, out: &mut impl Write) -> Result<()> {
    let document = load_document(main, options)?;
    serde_json::to_writer_pretty(&mut *out, &document.serialize())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_lists_inclusion_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tex"), "\\input{b}\\input{a}").unwrap();
        std::fs::write(dir.path().join("a.tex"), "a").unwrap();
        std::fs::write(dir.path().join("b.tex"), "b").unwrap();

        let mut out = Vec::new();
        files(&dir.path().join("main.tex"), &LoadOptions::default(), &mut out).unwrap();
        let listed: Vec<String> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| {
                Path::new(line)
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(listed, vec!["main.tex", "b.tex", "a.tex"]);
    }

    #[test]
    fn test_dump_has_sources_and_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tex"), "A \\deleted{x}\\input{b}").unwrap();
        std::fs::write(dir.path().join("b.tex"), "\\emph{b}").unwrap();

        let mut out = Vec::new();
        dump(&dir.path().join("main.tex"), &LoadOptions::default(), &mut out).unwrap();
        let record: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(record["sources"]["flat"], "A \\emph{b}");
        assert_eq!(record["text"], "A b");
        assert_eq!(record["sources"]["files"].as_array().unwrap().len(), 2);
        assert!(
            record["sources"]["files"][1]["path"]
                .as_str()
                .unwrap()
                .ends_with("b.tex")
        );
    }

    #[test]
    fn test_text_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.tex"), "A \\emph{b} c").unwrap();

        let mut out = Vec::new();
        text(&dir.path().join("main.tex"), &LoadOptions::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A b c");
    }
}

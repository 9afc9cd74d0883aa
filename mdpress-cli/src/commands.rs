//! Export command implementations.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use mdpress_docx::Compression;
use mdpress_types::{sanitize_filename, ConvertOptions, MAX_INPUT_BYTES};

pub fn export_html(input: &Path, out: Option<PathBuf>, opts: &ConvertOptions) -> anyhow::Result<()> {
    let markdown = read_input(input)?;
    let html = mdpress_core::to_html(&markdown, opts)?;
    let out = output_path(input, out, &opts.title, "html");
    fs::write(&out, html).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote html");
    Ok(())
}

pub fn export_docx(
    input: &Path,
    out: Option<PathBuf>,
    deflate: bool,
    opts: &ConvertOptions,
) -> anyhow::Result<()> {
    let markdown = read_input(input)?;

    let compression = if deflate {
        Compression::Deflate
    } else {
        Compression::Store
    };
    let bytes = mdpress_docx::to_docx_with(&markdown, opts, compression)?;

    let out = output_path(input, out, &opts.title, "docx");
    fs::write(&out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote docx");
    Ok(())
}

/// Read the Markdown source and enforce the input size ceiling. The limit
/// lives here at the export boundary; the core pipeline itself is unbounded.
fn read_input(path: &Path) -> anyhow::Result<String> {
    let markdown = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    if markdown.len() > MAX_INPUT_BYTES {
        bail!(
            "input is {} bytes, the maximum is {MAX_INPUT_BYTES}",
            markdown.len()
        );
    }
    Ok(markdown)
}

fn output_path(input: &Path, out: Option<PathBuf>, title: &str, ext: &str) -> PathBuf {
    out.unwrap_or_else(|| {
        if input == Path::new("-") {
            PathBuf::from(format!("{}.{ext}", sanitize_filename(title)))
        } else {
            input.with_extension(ext)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn output_path_follows_the_input_name() {
        let out = output_path(Path::new("notes/report.md"), None, "ignored", "docx");
        assert_eq!(out, PathBuf::from("notes/report.docx"));
    }

    #[test]
    fn stdin_output_derives_from_title() {
        let out = output_path(Path::new("-"), None, "My Report", "html");
        assert_eq!(out, PathBuf::from("My_Report.html"));
    }

    #[test]
    fn explicit_output_wins() {
        let out = output_path(
            Path::new("a.md"),
            Some(PathBuf::from("b.html")),
            "t",
            "html",
        );
        assert_eq!(out, PathBuf::from("b.html"));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'a'; MAX_INPUT_BYTES + 1]).unwrap();
        let err = read_input(file.path()).unwrap_err();
        assert!(err.to_string().contains("maximum"));
    }

    #[test]
    fn small_input_reads_through() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# hi").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "# hi");
    }
}

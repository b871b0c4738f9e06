use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

pub fn write(path: &Path, svg: &str) -> Result<()> {
    let pdf = svg_to_pdf(svg)
        .with_context(|| format!("failed to render PDF for {}", path.display()))?;
    fs::write(path, pdf).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Labels need system fonts; without them usvg drops the text but still
/// lays out the boxes.
fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).context("plot is not valid SVG")?;
    svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow!("PDF conversion: {e}"))
}

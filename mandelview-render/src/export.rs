//! PNG snapshots of the pixel buffer with the view embedded as tEXt chunks.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use mandelview_core::Viewport;

use crate::buffer::PixelBuffer;

/// What produced an exported frame.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub left: f64,
    pub top: f64,
    pub zoom: f64,
    pub step_budget: u32,
    pub palette_name: String,
    pub width: u32,
    pub height: u32,
}

impl ExportMetadata {
    pub fn new(viewport: &Viewport, step_budget: u32, palette_name: &str) -> Self {
        Self {
            left: viewport.left,
            top: viewport.top,
            zoom: viewport.zoom,
            step_budget,
            palette_name: palette_name.to_string(),
            width: viewport.width,
            height: viewport.height,
        }
    }
}

/// Write the current buffer contents as an RGBA PNG.
///
/// Uses the `png` crate directly so the view parameters can be stored as
/// text chunks next to the image.
pub fn export_png(buffer: &PixelBuffer, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let writer = BufWriter::new(File::create(path)?);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "Mandelview".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.to_rgba())?;
    png_writer.finish()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    format!(
        "Mandelbrot - Origin: {} {}i, Zoom: {}, Steps: {}",
        meta.left, meta.top, meta.zoom, meta.step_budget,
    )
}

fn build_metadata_pairs(meta: &ExportMetadata) -> Vec<(String, String)> {
    vec![
        ("Mandelview.Left".into(), meta.left.to_string()),
        ("Mandelview.Top".into(), meta.top.to_string()),
        ("Mandelview.Zoom".into(), meta.zoom.to_string()),
        ("Mandelview.StepBudget".into(), meta.step_budget.to_string()),
        ("Mandelview.Palette".into(), meta.palette_name.clone()),
        (
            "Mandelview.Resolution".into(),
            format!("{}x{}", meta.width, meta.height),
        ),
    ]
}

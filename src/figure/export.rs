use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat};

use crate::error::{Error, Result};

use super::compose::ComposedFigure;
use super::render;

/// Raster formats an output name may ask for.
pub fn output_format(path: &Path) -> Result<ImageFormat> {
    match ImageFormat::from_path(path) {
        Ok(fmt @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp)) => Ok(fmt),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Rasterize `figure` and write it to `path`.
///
/// The image is written to a temporary file next to `path` and renamed over
/// it only once encoding succeeded; on failure the temporary file is removed
/// and `path` is left as it was.
pub fn export(figure: &ComposedFigure, path: &Path) -> Result<()> {
    let format = output_format(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = tempfile::Builder::new()
        .prefix(".trace-compose-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(path, e))?;

    let image = render::rasterize(figure)?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut writer, format)
            .map_err(|e| encode_error(path, e))?;
        writer.flush().map_err(|e| Error::io(path, e))?;
    }

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// Writer failures surface as I/O errors; everything else is the encoder's.
fn encode_error(path: &Path, e: ImageError) -> Error {
    match e {
        ImageError::IoError(e) => Error::io(path, e),
        source => Error::Encode {
            path: path.to_path_buf(),
            source,
        },
    }
}

use crate::bitmap::Bitmap;
use crate::error::Result;
use crate::options::Options;
use crate::packer::AtlasPage;
use crate::serial;

/// Renders one page to a transparent canvas and blits every non-duplicate
/// placement onto it, rotating 90 degrees clockwise where marked.
pub fn render_page(page: &AtlasPage) -> Bitmap {
    let mut canvas = Bitmap::blank(page.page_width, page.page_height);
    for (bmp, p) in page.bitmaps.iter().zip(&page.placements) {
        if p.dup_of.is_some() {
            continue;
        }
        if p.rotated {
            canvas.blit_rotated(bmp, p.x, p.y);
        } else {
            canvas.blit(bmp, p.x, p.y);
        }
    }
    canvas
}

/// Writes every requested artifact for a completed pack: the page PNGs,
/// then whichever of binary/xml/json were asked for.
pub fn write_all(pages: &[AtlasPage], options: &Options) -> Result<()> {
    for (idx, page) in pages.iter().enumerate() {
        let path = options.page_path(idx, pages.len(), "png");
        log::info!("writing png {}", path.display());
        let canvas = render_page(page);
        canvas.save_as(&path)?;

        let size = std::fs::metadata(&path)?.len();
        use humansize::{file_size_opts as size_opts, FileSize};
        log::info!(
            "page {} size: {}",
            idx,
            size.file_size(size_opts::CONVENTIONAL).unwrap()
        );
    }

    if options.binary {
        serial::write_binary(pages, options, options.trim, options.rotate)?;
    }
    if options.xml {
        serial::write_xml(pages, options, options.trim, options.rotate)?;
    }
    if options.json {
        serial::write_json(pages, options)?;
    }

    Ok(())
}

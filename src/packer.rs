use crate::bin_packs::max_rects::MaxRectsBinPack;
use crate::bitmap::Bitmap;
use crate::error::{AtlasError, Result};
use crate::options::Options;
use metrohash::MetroHashMap;

/// Where one bitmap landed on one page.
#[derive(Debug)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub rotated: bool,
    pub dup_of: Option<usize>,
}

/// One emitted atlas image: a page size plus the bitmaps placed on it, in
/// the order they were inserted.
#[derive(Debug)]
pub struct AtlasPage {
    pub page_width: i32,
    pub page_height: i32,
    pub bitmaps: Vec<Bitmap>,
    pub placements: Vec<Placement>,
}

/// Sorts `bitmaps` by area ascending and packs them into as many pages as
/// needed. Fails if a single bitmap cannot fit on a fresh page.
pub fn pack_all(mut bitmaps: Vec<Bitmap>, options: &Options) -> Result<Vec<AtlasPage>> {
    bitmaps.sort_by_key(|b| b.width * b.height);

    let mut pages = vec![];
    while !bitmaps.is_empty() {
        log::info!("packing {} remaining bitmaps...", bitmaps.len());
        let page = pack_one_page(&mut bitmaps, options)?;
        log::info!(
            "finished page {} ({}x{}, {} bitmaps)",
            pages.len(),
            page.page_width,
            page.page_height,
            page.bitmaps.len()
        );
        pages.push(page);
    }
    Ok(pages)
}

fn pack_one_page(bitmaps: &mut Vec<Bitmap>, options: &Options) -> Result<AtlasPage> {
    let mut bin = MaxRectsBinPack::new(options.size, options.size);
    let mut dup_lookup: MetroHashMap<u64, usize> = MetroHashMap::default();

    let mut page_bitmaps: Vec<Bitmap> = vec![];
    let mut placements: Vec<Placement> = vec![];
    let mut ww = 0;
    let mut hh = 0;

    while !bitmaps.is_empty() {
        let last_idx = bitmaps.len() - 1;
        log::trace!("{}: {}", bitmaps.len(), bitmaps[last_idx].name);

        if options.unique {
            let hash = bitmaps[last_idx].content_hash;
            if let Some(&hit) = dup_lookup.get(&hash) {
                if bitmaps[last_idx] == page_bitmaps[hit] {
                    let bitmap = bitmaps.pop().expect("non-empty");
                    let (hx, hy, hrot) = {
                        let p = &placements[hit];
                        (p.x, p.y, p.rotated)
                    };
                    placements.push(Placement {
                        x: hx,
                        y: hy,
                        rotated: hrot,
                        dup_of: Some(hit),
                    });
                    page_bitmaps.push(bitmap);
                    log::debug!("duplicate found, reusing placement {}", hit);
                    continue;
                }
            }
        }

        let (w, h) = (bitmaps[last_idx].width, bitmaps[last_idx].height);
        let rect = bin.insert(w + options.padding, h + options.padding, options.rotate);
        if rect.height == 0 {
            break;
        }

        let bitmap = bitmaps.pop().expect("non-empty");
        if options.unique {
            dup_lookup.insert(bitmap.content_hash, placements.len());
        }

        let rotated = options.rotate && bitmap.width != (rect.width - options.padding);
        placements.push(Placement {
            x: rect.x,
            y: rect.y,
            rotated,
            dup_of: None,
        });
        page_bitmaps.push(bitmap);

        ww = ww.max(rect.x + rect.width);
        hh = hh.max(rect.y + rect.height);
    }

    if page_bitmaps.is_empty() {
        let name = bitmaps.last().map(|b| b.name.clone()).unwrap_or_default();
        return Err(AtlasError::CantFit { name });
    }

    let mut page_width = options.size;
    let mut page_height = options.size;
    while page_width / 2 >= ww {
        page_width /= 2;
    }
    while page_height / 2 >= hh {
        page_height /= 2;
    }

    log::debug!("page occupancy: {:.1}%", bin.occupancy() * 100.0);

    Ok(AtlasPage {
        page_width,
        page_height,
        bitmaps: page_bitmaps,
        placements,
    })
}

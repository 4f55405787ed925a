use crate::error::Result;
use crate::options::Options;
use crate::packer::AtlasPage;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonPage {
    name: String,
    width: i32,
    height: i32,
    images: Vec<JsonImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonImage {
    name: String,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    trim_offset_x: i32,
    trim_offset_y: i32,
    untrimmed_width: i32,
    untrimmed_height: i32,
}

fn page_name(output_name: &str, index: usize) -> String {
    format!("{}{}", output_name, index)
}

/// Packed (w,h) of a placement, swapped if rotated.
fn packed_dims(bmp_w: i32, bmp_h: i32, rotated: bool) -> (i32, i32) {
    if rotated {
        (bmp_h, bmp_w)
    } else {
        (bmp_w, bmp_h)
    }
}

/// One JSON file per page: `<output>.json` if there is exactly one page,
/// `<output><i>.json` otherwise.
pub fn write_json(pages: &[AtlasPage], options: &Options) -> Result<()> {
    for (idx, page) in pages.iter().enumerate() {
        let images = page
            .bitmaps
            .iter()
            .zip(&page.placements)
            .map(|(bmp, p)| {
                let (w, h) = packed_dims(bmp.width, bmp.height, p.rotated);
                JsonImage {
                    name: format!("{}.png", bmp.name),
                    x: p.x,
                    y: p.y,
                    w,
                    h,
                    trim_offset_x: bmp.frame_x,
                    trim_offset_y: bmp.frame_y,
                    untrimmed_width: bmp.frame_w,
                    untrimmed_height: bmp.frame_h,
                }
            })
            .collect();

        let json_page = JsonPage {
            name: format!("{}_atlas", page_name(&options.output_name, idx)),
            width: page.page_width,
            height: page.page_height,
            images,
        };

        let path = options.page_path(idx, pages.len(), "json");
        log::info!("writing json {}", path.display());
        let bytes = serde_json::to_vec_pretty(&json_page)?;
        std::fs::write(path, bytes)?;
    }
    Ok(())
}

/// A single `<atlas>` document with one `<tex>` per page and one `<img>`
/// per placement (including duplicates).
pub fn write_xml(pages: &[AtlasPage], options: &Options, trim: bool, rotate: bool) -> Result<()> {
    use xml::writer::{EmitterConfig, XmlEvent};

    let path = options.sidecar_path("xml");
    log::info!("writing xml {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = EmitterConfig::new().perform_indent(true).create_writer(file);

    writer.write(XmlEvent::start_element("atlas"))?;
    for (idx, page) in pages.iter().enumerate() {
        writer.write(XmlEvent::start_element("tex").attr("n", &page_name(&options.output_name, idx)))?;
        for (bmp, p) in page.bitmaps.iter().zip(&page.placements) {
            let (w, h) = packed_dims(bmp.width, bmp.height, p.rotated);
            let x_str = p.x.to_string();
            let y_str = p.y.to_string();
            let w_str = w.to_string();
            let h_str = h.to_string();
            let fx_str = bmp.frame_x.to_string();
            let fy_str = bmp.frame_y.to_string();
            let fw_str = bmp.frame_w.to_string();
            let fh_str = bmp.frame_h.to_string();

            let mut el = XmlEvent::start_element("img")
                .attr("n", bmp.name.as_str())
                .attr("x", &x_str)
                .attr("y", &y_str)
                .attr("w", &w_str)
                .attr("h", &h_str);
            if trim {
                el = el
                    .attr("fx", &fx_str)
                    .attr("fy", &fy_str)
                    .attr("fw", &fw_str)
                    .attr("fh", &fh_str);
            }
            if rotate {
                el = el.attr("r", if p.rotated { "1" } else { "0" });
            }
            writer.write(el)?;
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Byte-exact little-endian binary layout: `i16` counts, `uint16`-length-
/// prefixed (non-null-terminated) strings, conditional trim/rotation fields.
pub fn write_binary(pages: &[AtlasPage], options: &Options, trim: bool, rotate: bool) -> Result<()> {
    let path = options.sidecar_path("bin");
    log::info!("writing binary {}", path.display());
    let mut out = Vec::new();

    write_i16(&mut out, pages.len() as i16);
    for (idx, page) in pages.iter().enumerate() {
        write_str(&mut out, &page_name(&options.output_name, idx));
        write_i16(&mut out, page.bitmaps.len() as i16);
        for (bmp, p) in page.bitmaps.iter().zip(&page.placements) {
            let (w, h) = packed_dims(bmp.width, bmp.height, p.rotated);
            write_str(&mut out, &bmp.name);
            write_i16(&mut out, p.x as i16);
            write_i16(&mut out, p.y as i16);
            write_i16(&mut out, w as i16);
            write_i16(&mut out, h as i16);
            if trim {
                write_i16(&mut out, bmp.frame_x as i16);
                write_i16(&mut out, bmp.frame_y as i16);
                write_i16(&mut out, bmp.frame_w as i16);
                write_i16(&mut out, bmp.frame_h as i16);
            }
            if rotate {
                out.push(if p.rotated { 1 } else { 0 });
            }
        }
    }

    std::fs::write(path, out)?;
    Ok(())
}

fn write_i16(out: &mut Vec<u8>, v: i16) {
    out.write_all(&v.to_le_bytes()).expect("writing to a Vec never fails");
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    out.write_all(&(bytes.len() as u16).to_le_bytes())
        .expect("writing to a Vec never fails");
    out.write_all(bytes).expect("writing to a Vec never fails");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::packer::Placement;
    use image::RgbaImage;

    fn sample_page() -> AtlasPage {
        let bmp = Bitmap::new(
            RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255])),
            "sprite".into(),
            false,
            false,
        );
        AtlasPage {
            page_width: 16,
            page_height: 16,
            bitmaps: vec![bmp],
            placements: vec![Placement { x: 1, y: 2, rotated: false, dup_of: None }],
        }
    }

    fn sample_options(dir: &std::path::Path) -> Options {
        Options {
            output_dir: dir.to_path_buf(),
            output_name: "atlas".into(),
            inputs: vec![],
            size: 16,
            padding: 0,
            xml: true,
            binary: true,
            json: true,
            premultiply: false,
            trim: true,
            force: false,
            unique: false,
            rotate: true,
        }
    }

    #[test]
    fn json_round_trips_through_serde_value() {
        let dir = tempfile::tempdir().unwrap();
        let options = sample_options(dir.path());
        let pages = vec![sample_page()];
        write_json(&pages, &options).unwrap();
        let contents = std::fs::read_to_string(options.page_path(0, 1, "json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["Name"], "atlas0_atlas");
        assert_eq!(value["Images"][0]["Name"], "sprite.png");
        assert_eq!(value["Images"][0]["X"], 1);
    }

    #[test]
    fn xml_contains_lowercase_tags_and_conditional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let options = sample_options(dir.path());
        let pages = vec![sample_page()];
        write_xml(&pages, &options, true, true).unwrap();
        let contents = std::fs::read_to_string(options.sidecar_path("xml")).unwrap();
        assert!(contents.contains("<atlas"));
        assert!(contents.contains("<tex"));
        assert!(contents.contains("<img"));
        assert!(contents.contains("fx="));
        assert!(contents.contains("r="));
    }

    #[test]
    fn binary_layout_matches_expected_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let options = sample_options(dir.path());
        let pages = vec![sample_page()];
        write_binary(&pages, &options, true, true).unwrap();
        let bytes = std::fs::read(options.sidecar_path("bin")).unwrap();

        // i16 page count, str "atlas0" (2 + 6), i16 image count,
        // str "sprite" (2 + 6), 4 x i16 (x,y,w,h), 4 x i16 trim fields, 1 byte rotated
        let expected = 2 + (2 + 6) + 2 + (2 + 6) + 4 * 2 + 4 * 2 + 1;
        assert_eq!(bytes.len(), expected);
    }
}

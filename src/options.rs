use crate::error::{AtlasError, Result};
use std::path::PathBuf;
use structopt::StructOpt;

/// A texture atlas packer.
#[derive(StructOpt, Debug)]
#[structopt(name = "atlaspack")]
pub struct Opt {
    /// Use default settings (-x -p -t -u)
    #[structopt(short, long)]
    pub default: bool,

    /// Saves the atlas data as a .xml file
    #[structopt(short, long)]
    pub xml: bool,

    /// Saves the atlas data as a .bin file
    #[structopt(short, long)]
    pub binary: bool,

    /// Saves the atlas data as a .json file
    #[structopt(short, long)]
    pub json: bool,

    /// Premultiplies the pixels of the bitmaps by their alpha channel
    #[structopt(short, long)]
    pub premultiply: bool,

    /// Trims excess transparency off the bitmaps
    #[structopt(short, long)]
    pub trim: bool,

    /// Print progress as the packer works; repeat for more detail (-vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Ignore the cache, forcing the packer to repack
    #[structopt(short, long)]
    pub force: bool,

    /// Remove duplicate bitmaps from the atlas
    #[structopt(short, long)]
    pub unique: bool,

    /// Allow rotating bitmaps 90 degrees clockwise when packing
    #[structopt(short, long)]
    pub rotate: bool,

    /// Max atlas page size
    #[structopt(
        short,
        long,
        default_value = "4096",
        possible_values = &["64", "128", "256", "512", "1024", "2048", "4096"]
    )]
    pub size: u32,

    /// Padding between images, in pixels (0 to 16)
    #[structopt(short = "P", long, default_value = "1")]
    pub pad: u32,

    /// File to output (the output directory plus an atlas name)
    #[structopt(short = "o", long = "output", name = "OUTPUT", parse(from_os_str))]
    pub output: PathBuf,

    /// Comma-separated files or folders to pack
    #[structopt(short = "i", long = "input", name = "INPUTS", parse(from_os_str), use_delimiter = true)]
    pub inputs: Vec<PathBuf>,
}

/// The validated, immutable view of `Opt` that every component operates on.
pub struct Options {
    pub output_dir: PathBuf,
    pub output_name: String,
    pub inputs: Vec<PathBuf>,
    pub size: i32,
    pub padding: i32,
    pub xml: bool,
    pub binary: bool,
    pub json: bool,
    pub premultiply: bool,
    pub trim: bool,
    pub force: bool,
    pub unique: bool,
    pub rotate: bool,
}

impl Options {
    pub fn from_opt(mut opt: Opt) -> Result<Self> {
        if opt.default {
            opt.xml = true;
            opt.premultiply = true;
            opt.trim = true;
            opt.unique = true;
        }

        if opt.pad > 16 {
            return Err(AtlasError::InvalidPadding { size: opt.pad });
        }

        if opt.inputs.is_empty() {
            return Err(AtlasError::MissingArgument("INPUTS"));
        }

        let output_dir = opt
            .output
            .parent()
            .map(|p| if p.as_os_str().is_empty() { PathBuf::from(".") } else { p.to_path_buf() })
            .unwrap_or_else(|| PathBuf::from("."));
        let output_name = opt
            .output
            .file_name()
            .ok_or(AtlasError::MissingArgument("OUTPUT"))?
            .to_string_lossy()
            .into_owned();

        Ok(Self {
            output_dir,
            output_name,
            inputs: opt.inputs,
            size: opt.size as i32,
            padding: opt.pad as i32,
            xml: opt.xml,
            binary: opt.binary,
            json: opt.json,
            premultiply: opt.premultiply,
            trim: opt.trim,
            force: opt.force,
            unique: opt.unique,
            rotate: opt.rotate,
        })
    }

    pub fn page_path(&self, index: usize, count: usize, ext: &str) -> PathBuf {
        let name = if count == 1 {
            self.output_name.clone()
        } else {
            format!("{}{}", self.output_name, index)
        };
        self.output_dir.join(name).with_extension(ext)
    }

    pub fn sidecar_path(&self, ext: &str) -> PathBuf {
        self.output_dir.join(&self.output_name).with_extension(ext)
    }

    /// A stable textual representation of every non-path flag, fed into the
    /// fingerprint so that a config change invalidates the cache.
    pub fn flag_tokens(&self) -> Vec<String> {
        let mut tokens = vec![
            format!("size={}", self.size),
            format!("pad={}", self.padding),
        ];
        for (flag, name) in [
            (self.xml, "xml"),
            (self.binary, "binary"),
            (self.json, "json"),
            (self.premultiply, "premultiply"),
            (self.trim, "trim"),
            (self.unique, "unique"),
            (self.rotate, "rotate"),
        ] {
            if flag {
                tokens.push(name.to_string());
            }
        }
        tokens
    }
}

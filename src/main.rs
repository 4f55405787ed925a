mod bin_packs;
mod bitmap;
mod emitter;
mod error;
mod fingerprint;
mod hashing;
mod loader;
mod options;
mod packer;
mod rect;
mod serial;

use error::Result;
use options::{Opt, Options};
use structopt::StructOpt;

fn init_logging(verbosity: u8) -> Result<()> {
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let formatter = |out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    };

    let file_config = fern::Dispatch::new()
        .format(formatter)
        .chain(fern::log_file("atlaspack.log")?)
        .level(log::LevelFilter::Trace);

    let stderr_config = fern::Dispatch::new()
        .format(formatter)
        .level(log_level)
        .chain(std::io::stderr());

    fern::Dispatch::new()
        .chain(file_config)
        .chain(stderr_config)
        .apply()?;

    Ok(())
}

fn run() -> Result<()> {
    let opt = Opt::from_args();
    let verbosity = opt.verbose;
    init_logging(verbosity)?;

    log::debug!("invoked with: {}", std::env::args().collect::<Vec<_>>().join(" "));

    let options = Options::from_opt(opt)?;
    let flag_tokens = options.flag_tokens();
    let flag_token_refs: Vec<&str> = flag_tokens.iter().map(String::as_str).collect();

    let current_fingerprint = fingerprint::compute(&options, &flag_token_refs)?;

    if fingerprint::is_unchanged(&options, current_fingerprint) {
        log::info!("atlas is unchanged: {}", options.output_name);
        return Ok(());
    }

    log::trace!("options: output={:?} inputs={:?}", options.output_dir, options.inputs);

    fingerprint::clean_stale_outputs(&options)?;

    log::info!("loading bitmaps...");
    let bitmaps = loader::load_all(&options.inputs, &options)?;
    log::info!("loaded {} bitmaps.", bitmaps.len());

    if bitmaps.is_empty() {
        fingerprint::save(&options, current_fingerprint)?;
        return Ok(());
    }

    let pages = packer::pack_all(bitmaps, &options)?;

    emitter::write_all(&pages, &options)?;

    fingerprint::save(&options, current_fingerprint)?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

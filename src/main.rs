// What you SEE:
// • The body image (live camera or a photo) fills the top of the window.
// • Tattoo thumbnails sit in a strip underneath; click one (or press 1-9) to place it.
// • Drag a tattoo to move it, scroll to scale. In studio mode the selected
//   tattoo gets resize/rotate handles.
// • S saves tattoo-tryon.png. ESC quits.

use clap::Parser;
use env_logger::Env;

use tattoo_tryon::app::App;
use tattoo_tryon::cli::Args;
use tattoo_tryon::config::Config;
use tattoo_tryon::error::Error;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = args.apply(Config::load(args.config.as_deref())?);
    log::info!(
        "starting {:?} editor, {}x{} surface, {:?} background",
        cfg.editor.variant,
        cfg.surface.width,
        cfg.surface.height,
        cfg.editor.mode
    );

    let mut app = App::new(cfg, args.photo.as_deref())?;
    app.run()
}

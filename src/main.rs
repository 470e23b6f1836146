// What you SEE:
// • The image, panned with the left mouse button and zoomed with the wheel.
// • Right click resets the view; ctrl + right click resets only the zoom.
// • Middle click prints the value under the cursor.
// • Shift + move recenters the contrast on the pixel under the cursor;
//   shift + wheel widens or narrows the contrast span. N: auto contrast.
// • R / shift+R cycles the ROI: periodic spectrum, raw spectrum, smooth part, off.
//   While the ROI is on, the wheel resizes it.
// • + - p m P M zoom at the window center, arrows and page keys pan.
// • Q or ESC quits.

mod cli;
mod compositor;
mod config;
mod draw;
mod error;
mod fourier;
mod pixel;
mod ppsmooth;
mod roi;
mod session;
mod source;
mod types;
mod view;

use std::process::ExitCode;

use compositor::Compositor;
use config::ViewerConfig;
use draw::Drawer;
use error::Error;
use session::{Event, Session};
use source::{PyramidImage, PyramidSource};
use tracing_subscriber::EnvFilter;
use types::FrameBuffer;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let args = cli::parse()?;
    let config = ViewerConfig::default();

    /* --- Image + window setup ---
       The image is fully decoded before any window appears. */
    let src = PyramidImage::open(&args.image)?;
    let (w, h) = config.window_size(src.width(), src.height());
    let title = format!("panview: {}", args.image.display());
    let mut drawer = Drawer::new(&title, w, h)?;

    /* --- Reusable screen buffer, repainted whenever the session is dirty --- */
    let mut screen = FrameBuffer::new(w, h);
    let mut compositor = Compositor::new(config.label_zoom_threshold);
    let mut session = Session::new(config, w, h);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !session.quit_requested() {
        for event in drawer.poll_events() {
            if let Event::Resize { width, height } = event {
                screen.resize(width, height);
            }
            session.handle(&src, event);
        }

        if session.take_dirty() {
            compositor.render(&mut screen, &src, &session.view, &session.roi);
        }

        drawer.present(&screen)?;
    }

    tracing::info!("viewer closed");
    Ok(())
}

use clap::{Args, Subcommand};
use wintrack_core::{Rect, Window, WindowHandle};

use super::CommandResult;

/// Arguments for the `window` subcommand.
#[derive(Args)]
pub struct WindowArgs {
    /// Window handle (decimal or hex with 0x prefix)
    handle: String,
    #[command(subcommand)]
    action: WindowAction,
}

#[derive(Subcommand)]
enum WindowAction {
    /// Bring the window to the foreground, restoring it if minimized
    Focus,
    /// Minimize the window
    Minimize,
    /// Maximize the window
    Maximize,
    /// Restore the window from minimized or maximized
    Restore,
    /// Ask the window to close
    Close,
    /// Move and resize the window's visible frame
    Move {
        /// X position in pixels
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        /// Y position in pixels
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        /// Width in pixels
        #[arg(long)]
        width: i32,
        /// Height in pixels
        #[arg(long)]
        height: i32,
    },
}

pub fn execute(args: &WindowArgs) -> CommandResult {
    let handle = WindowHandle::parse(&args.handle)
        .ok_or_else(|| format!("invalid window handle: {}", args.handle))?;
    let window = Window::new(handle, super::platform()?);

    match &args.action {
        WindowAction::Focus => window.focus()?,
        WindowAction::Minimize => window.minimize()?,
        WindowAction::Maximize => window.maximize()?,
        WindowAction::Restore => window.restore()?,
        WindowAction::Close => window.close()?,
        WindowAction::Move {
            x,
            y,
            width,
            height,
        } => {
            let target = Rect::new(*x, *y, *width, *height);
            println!("Moving {window} to {target}");
            window.move_resize(&target)?;
        }
    }

    println!("Done.");
    Ok(())
}

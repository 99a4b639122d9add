//! Input simulation using the X11 XTEST extension
//!
//! Clicks are injected with XTEST `FakeInput`, so they reach whatever window is
//! under the pointer exactly like a physical click. Pointer position is read
//! and restored with the core `QueryPointer`/`WarpPointer` requests.

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt as _, Window, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT,
};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;
use x11rb::{CURRENT_TIME, NONE};

use crate::settings::ClickType;
use crate::AutoclickError;

/// X11 button number of the primary (left) button
const LEFT_BUTTON: u8 = 1;

/// Device id meaning "the core pointer" for XTEST
const CORE_POINTER: u8 = 0;

/// Something that can click and move the pointer
///
/// Implemented by `XTestMouse` for the real display; the click loop only
/// depends on this trait.
pub trait MouseBackend: Send {
    /// Left click (single or double) at the current pointer location
    fn click(&mut self, kind: ClickType) -> Result<(), AutoclickError>;

    /// Current pointer position in root-window coordinates
    fn position(&mut self) -> Result<(i32, i32), AutoclickError>;

    /// Move the pointer to an absolute root-window position
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), AutoclickError>;
}

fn display_err(context: &str, e: impl std::fmt::Display) -> AutoclickError {
    AutoclickError::Display(format!("{}: {}", context, e))
}

/// Mouse simulator backed by an XTEST-capable X server
pub struct XTestMouse {
    conn: RustConnection,
    root: Window,
}

impl XTestMouse {
    /// Connect to `$DISPLAY` and verify the XTEST extension is present
    pub fn new() -> Result<Self, AutoclickError> {
        info!("Connecting to X11 display...");

        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| display_err("Failed to connect to X11", e))?;
        let root = conn.setup().roots[screen_num].root;

        let version = conn
            .xtest_get_version(2, 2)
            .map_err(|e| display_err("XTEST extension unavailable", e))?
            .reply()
            .map_err(|e| display_err("XTEST extension unavailable", e))?;

        info!(
            "XTEST {}.{} ready on screen {}",
            version.major_version, version.minor_version, screen_num
        );
        Ok(Self { conn, root })
    }

    fn fake_button(&self, event_type: u8) -> Result<(), AutoclickError> {
        self.conn
            .xtest_fake_input(
                event_type,
                LEFT_BUTTON,
                CURRENT_TIME,
                self.root,
                0,
                0,
                CORE_POINTER,
            )
            .map_err(|e| display_err("Failed to send fake input", e))?;
        Ok(())
    }

    fn press_release(&self) -> Result<(), AutoclickError> {
        self.fake_button(BUTTON_PRESS_EVENT)?;
        self.fake_button(BUTTON_RELEASE_EVENT)
    }
}

impl MouseBackend for XTestMouse {
    fn click(&mut self, kind: ClickType) -> Result<(), AutoclickError> {
        debug!("Sending {} click via XTEST", kind);
        self.press_release()?;
        if kind == ClickType::Double {
            self.press_release()?;
        }
        self.conn
            .flush()
            .map_err(|e| display_err("Failed to flush X11 connection", e))
    }

    fn position(&mut self) -> Result<(i32, i32), AutoclickError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(|e| display_err("Failed to query pointer", e))?
            .reply()
            .map_err(|e| display_err("Failed to query pointer", e))?;
        Ok((i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), AutoclickError> {
        let x = i16::try_from(x).map_err(|e| display_err("Pointer x out of range", e))?;
        let y = i16::try_from(y).map_err(|e| display_err("Pointer y out of range", e))?;

        self.conn
            .warp_pointer(NONE, self.root, 0, 0, 0, 0, x, y)
            .map_err(|e| display_err("Failed to warp pointer", e))?;
        self.conn
            .flush()
            .map_err(|e| display_err("Failed to flush X11 connection", e))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// In-memory mouse that records every action
    ///
    /// `drift` is added to the pointer after each click, standing in for a
    /// click target that moves the pointer.
    #[derive(Debug, Default)]
    pub(crate) struct FakeMouse {
        pub pos: (i32, i32),
        pub drift: (i32, i32),
        pub clicks: Vec<ClickType>,
        pub moves: Vec<(i32, i32)>,
        pub fail_clicks: bool,
    }

    impl FakeMouse {
        pub fn at(x: i32, y: i32) -> Self {
            Self {
                pos: (x, y),
                ..Self::default()
            }
        }
    }

    impl MouseBackend for FakeMouse {
        fn click(&mut self, kind: ClickType) -> Result<(), AutoclickError> {
            if self.fail_clicks {
                return Err(AutoclickError::Display("fake failure".to_string()));
            }
            self.clicks.push(kind);
            self.pos = (self.pos.0 + self.drift.0, self.pos.1 + self.drift.1);
            Ok(())
        }

        fn position(&mut self) -> Result<(i32, i32), AutoclickError> {
            Ok(self.pos)
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), AutoclickError> {
            self.moves.push((x, y));
            self.pos = (x, y);
            Ok(())
        }
    }
}

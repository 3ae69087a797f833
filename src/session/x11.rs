//! X11 display session.
//!
//! Barriers are 1-pixel override-redirect `InputOnly` windows laid along the
//! screen edges with `EnterWindowMask` selected, so the server notifies us
//! the moment the pointer touches an edge. Geometry changes arrive as
//! `ConfigureNotify` on the root window (`StructureNotifyMask`), which the
//! server emits when RandR reconfigures the screen. Relocation is
//! `XWarpPointer`.
//!
//! Xlib's wait-for-event call blocks with no way to also wait on anything
//! else, so a dedicated reader thread pumps `XNextEvent` and decodes each
//! raw event into a [`Notification`] pushed onto a channel; the async
//! `next_notification` just awaits the channel. `XInitThreads` is called
//! before `XOpenDisplay` so the reader and the main thread may share the
//! `Display` (Xlib serializes access internally).

use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use x11::xlib;

use crate::geometry::{Edge, EdgeSegment, Point, ScreenGeometry};

use super::{BarrierHandle, DisplaySession, Notification, SessionError, SessionResult};

/// Raw display pointer handed to the reader thread.
///
/// Safe to send because `XInitThreads` is called before the display is
/// opened, making concurrent Xlib calls on it legal.
#[derive(Clone, Copy)]
struct DisplayHandle(*mut xlib::Display);

unsafe impl Send for DisplayHandle {}

pub struct X11Session {
    display: DisplayHandle,
    root: xlib::Window,
    geometry: ScreenGeometry,
    notifications: mpsc::UnboundedReceiver<Notification>,
    swallow_enter: Arc<AtomicBool>,
}

impl X11Session {
    /// Connect to the display named by `DISPLAY`.
    ///
    /// Fails with `Connection` if the server is unreachable and with
    /// `CapabilityMissing` if the server cannot report screen
    /// reconfigurations.
    pub fn connect() -> SessionResult<Self> {
        unsafe { xlib::XInitThreads() };

        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(SessionError::Connection(
                "cannot open X display (is DISPLAY set?)".into(),
            ));
        }

        let screen = unsafe { xlib::XDefaultScreen(display) };
        let root = unsafe { xlib::XRootWindow(display, screen) };
        let geometry = ScreenGeometry::new(
            unsafe { xlib::XDisplayWidth(display, screen) } as u32,
            unsafe { xlib::XDisplayHeight(display, screen) } as u32,
        );

        // Root ConfigureNotify on resize is only generated when the server
        // supports RandR; without it a geometry change would leave stale
        // barriers behind.
        if !has_extension(display, b"RANDR\0") {
            unsafe { xlib::XCloseDisplay(display) };
            return Err(SessionError::CapabilityMissing(
                "RANDR (screen reconfiguration notifications)".into(),
            ));
        }

        unsafe {
            xlib::XSelectInput(display, root, xlib::StructureNotifyMask);
            xlib::XFlush(display);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let swallow_enter = Arc::new(AtomicBool::new(false));
        let handle = DisplayHandle(display);
        let swallow = Arc::clone(&swallow_enter);
        std::thread::Builder::new()
            .name("x11-reader".into())
            .spawn(move || run_reader(handle, tx, swallow))
            .map_err(|err| SessionError::Connection(format!("cannot spawn reader: {err}")))?;

        Ok(Self {
            display: handle,
            root,
            geometry,
            notifications: rx,
            swallow_enter,
        })
    }
}

// The display connection is deliberately not closed on drop: the reader
// thread stays blocked in XNextEvent on it until the process exits, and the
// kernel reclaims the socket then.

#[async_trait::async_trait]
impl DisplaySession for X11Session {
    fn query_geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    fn create_barrier(&mut self, segment: EdgeSegment) -> SessionResult<BarrierHandle> {
        let (x, y, width, height) = strip_rect(&segment);

        let mut attrs: xlib::XSetWindowAttributes = unsafe { std::mem::zeroed() };
        attrs.override_redirect = 1;
        attrs.event_mask = xlib::EnterWindowMask;

        let window = unsafe {
            xlib::XCreateWindow(
                self.display.0,
                self.root,
                x,
                y,
                width as c_uint,
                height as c_uint,
                0,
                0, // depth: CopyFromParent (InputOnly windows have none)
                xlib::InputOnly as c_uint,
                ptr::null_mut(), // visual: CopyFromParent
                xlib::CWOverrideRedirect | xlib::CWEventMask,
                &mut attrs,
            )
        };
        if window == 0 {
            return Err(SessionError::BarrierCreation {
                edge: segment.edge,
                reason: "XCreateWindow returned no window".into(),
            });
        }
        unsafe { xlib::XMapRaised(self.display.0, window) };
        Ok(BarrierHandle(window as u64))
    }

    fn delete_barrier(&mut self, handle: BarrierHandle) -> SessionResult<()> {
        unsafe { xlib::XDestroyWindow(self.display.0, handle.0 as c_ulong) };
        Ok(())
    }

    fn relocate_pointer(&mut self, target: Point) -> SessionResult<()> {
        // The warp lands inside the opposite edge zone; mark the enter
        // event it synthesizes to be dropped by the reader.
        self.swallow_enter.store(true, Ordering::SeqCst);
        unsafe {
            xlib::XWarpPointer(self.display.0, 0, self.root, 0, 0, 0, 0, target.x, target.y);
        }
        Ok(())
    }

    async fn next_notification(&mut self) -> SessionResult<Notification> {
        self.notifications
            .recv()
            .await
            .ok_or_else(|| SessionError::Connection("event reader terminated".into()))
    }

    fn flush(&mut self) -> SessionResult<()> {
        unsafe { xlib::XFlush(self.display.0) };
        Ok(())
    }
}

/// The 1-pixel window rectangle for an edge segment.
///
/// Segment lines sit at 0 and `width`/`height`; the far-edge windows must
/// cover the last on-screen pixel row/column, hence the `- 1`.
fn strip_rect(segment: &EdgeSegment) -> (c_int, c_int, u32, u32) {
    match segment.edge {
        Edge::Left => (0, 0, 1, (segment.y2 - segment.y1) as u32),
        Edge::Right => (segment.x1 - 1, 0, 1, (segment.y2 - segment.y1) as u32),
        Edge::Top => (0, 0, (segment.x2 - segment.x1) as u32, 1),
        Edge::Bottom => (0, segment.y1 - 1, (segment.x2 - segment.x1) as u32, 1),
    }
}

fn has_extension(display: *mut xlib::Display, name: &'static [u8]) -> bool {
    let mut opcode: c_int = 0;
    let mut event_base: c_int = 0;
    let mut error_base: c_int = 0;
    let present = unsafe {
        xlib::XQueryExtension(
            display,
            name.as_ptr() as *const c_char,
            &mut opcode,
            &mut event_base,
            &mut error_base,
        )
    };
    present != 0
}

fn run_reader(
    display: DisplayHandle,
    tx: mpsc::UnboundedSender<Notification>,
    swallow_enter: Arc<AtomicBool>,
) {
    loop {
        let mut event: xlib::XEvent = unsafe { std::mem::zeroed() };
        unsafe { xlib::XNextEvent(display.0, &mut event) };
        if let Some(notification) = decode_event(&event, &swallow_enter) {
            if tx.send(notification).is_err() {
                // Session dropped; nobody is listening anymore.
                return;
            }
        }
    }
}

/// Decode a raw X event into a typed notification, or `None` to drop it.
fn decode_event(event: &xlib::XEvent, swallow_enter: &AtomicBool) -> Option<Notification> {
    match event.get_type() {
        xlib::EnterNotify => {
            if swallow_enter.swap(false, Ordering::SeqCst) {
                return None;
            }
            let crossing = unsafe { event.crossing };
            Some(Notification::Crossing {
                position: Point::new(crossing.x_root, crossing.y_root),
            })
        }
        xlib::ConfigureNotify => {
            let configure = unsafe { event.configure };
            Some(Notification::GeometryChanged {
                width: configure.width as u32,
                height: configure.height as u32,
            })
        }
        other => Some(Notification::Unknown { tag: other as u8 }),
    }
}

//! Asynchronous renders where the newest request wins.
//!
//! A render has two one-shot suspension points before drawing can start:
//! decoding the background bytes and confirming the fonts are ready. A
//! [`RenderSession`] runs both as futures and tags every submission with a
//! ticket taken at submit time. A render whose ticket is no longer the
//! latest when it resumes is dropped, so an old decode that finishes late
//! can never paint over a newer request.
//!
//! # Example
//!
//! ```no_run
//! use thumbcraft::{FontLibrary, RenderRequest, RenderSession};
//!
//! # async fn run(photo: Vec<u8>) {
//! let session = RenderSession::new(FontLibrary::system());
//!
//! let stale = session.submit(RenderRequest::new(), Some(photo));
//! let fresh = session.submit(RenderRequest::new().with_title("New title"), None);
//! let (stale, fresh) = tokio::join!(stale, fresh);
//!
//! assert!(!stale.is_committed());
//! assert!(fresh.is_committed());
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::compositor::paint;
use crate::fonts::{FontLibrary, FontSpec, FontStatus, SUBTITLE_FONT, TITLE_FONT};
use crate::layer::decode_background;
use crate::request::RenderRequest;
use crate::surface::Canvas;

/// Default bound on waiting for font readiness.
pub const DEFAULT_FONT_WAIT: Duration = Duration::from_secs(3);

/// What happened to a submitted render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The render finished and is now the published surface.
    Committed { ticket: u64 },
    /// A newer submission arrived first; this render was discarded.
    Superseded { ticket: u64 },
}

impl RenderOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn ticket(&self) -> u64 {
        match *self {
            Self::Committed { ticket } | Self::Superseded { ticket } => ticket,
        }
    }
}

struct Published {
    ticket: u64,
    canvas: Canvas,
}

/// Serializes renders onto one published surface, newest request first.
///
/// Cloning a session yields another handle to the same surface and ticket
/// counter.
#[derive(Clone)]
pub struct RenderSession {
    fonts: Arc<FontLibrary>,
    latest: Arc<AtomicU64>,
    published: Arc<RwLock<Option<Published>>>,
    font_wait: Duration,
    fonts_warned: Arc<AtomicBool>,
}

impl RenderSession {
    pub fn new(fonts: FontLibrary) -> Self {
        Self::with_shared_fonts(Arc::new(fonts))
    }

    pub fn with_shared_fonts(fonts: Arc<FontLibrary>) -> Self {
        Self {
            fonts,
            latest: Arc::new(AtomicU64::new(0)),
            published: Arc::new(RwLock::new(None)),
            font_wait: DEFAULT_FONT_WAIT,
            fonts_warned: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets how long a render waits for fonts before drawing with fallbacks.
    pub fn with_font_wait(mut self, wait: Duration) -> Self {
        self.font_wait = wait;
        self
    }

    /// Ticket of the most recent submission (0 before any).
    pub fn latest_ticket(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Ticket of the render currently published, if any.
    pub fn published_ticket(&self) -> Option<u64> {
        self.read_published(|p| p.ticket)
    }

    /// A byte-exact copy of the published surface, if anything has rendered.
    pub fn snapshot(&self) -> Option<Canvas> {
        self.read_published(|p| p.canvas.clone())
    }

    /// Queues a render.
    ///
    /// The ticket is taken immediately, so any later `submit` supersedes
    /// this one even if the returned future has not been polled yet. When
    /// `background` holds file bytes they are decoded first and replace
    /// `request.background`; an undecodable file renders without a
    /// background.
    pub fn submit(
        &self,
        request: RenderRequest,
        background: Option<Vec<u8>>,
    ) -> impl Future<Output = RenderOutcome> + Send + 'static {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let session = self.clone();
        async move { session.run(ticket, request, background).await }
    }

    #[tracing::instrument(level = "debug", skip(self, request, background))]
    async fn run(
        self,
        ticket: u64,
        mut request: RenderRequest,
        background: Option<Vec<u8>>,
    ) -> RenderOutcome {
        if let Some(bytes) = background {
            let decoded = tokio::task::spawn_blocking(move || decode_background(&bytes))
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "background decode task failed");
                    None
                });
            request.background = decoded.map(Arc::new);
        }
        if self.is_stale(ticket) {
            tracing::debug!("superseded after decode");
            return RenderOutcome::Superseded { ticket };
        }

        self.await_fonts().await;
        if self.is_stale(ticket) {
            tracing::debug!("superseded after font wait");
            return RenderOutcome::Superseded { ticket };
        }

        let frame = paint(&self.fonts, &request);
        self.commit(ticket, frame.canvas)
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != ticket
    }

    fn commit(&self, ticket: u64, canvas: Canvas) -> RenderOutcome {
        let mut slot = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let older = slot.as_ref().is_some_and(|p| p.ticket > ticket);
        if self.is_stale(ticket) || older {
            tracing::debug!(ticket, "superseded at commit");
            return RenderOutcome::Superseded { ticket };
        }

        *slot = Some(Published { ticket, canvas });
        tracing::debug!(ticket, "render committed");
        RenderOutcome::Committed { ticket }
    }

    /// Waits (bounded) for the title and subtitle fonts. Failure only logs.
    async fn await_fonts(&self) {
        let fonts = Arc::clone(&self.fonts);
        let check = tokio::task::spawn_blocking(move || {
            [TITLE_FONT, SUBTITLE_FONT].map(|font| (font, fonts.ensure_ready(&font)))
        });

        match tokio::time::timeout(self.font_wait, check).await {
            Ok(Ok(statuses)) => {
                for (font, status) in statuses {
                    self.report_font(&font, status);
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "font readiness check failed; using fallback fonts");
            }
            Err(_) => {
                tracing::warn!(
                    wait_ms = self.font_wait.as_millis() as u64,
                    "timed out waiting for fonts; using fallback fonts"
                );
            }
        }
    }

    fn report_font(&self, font: &FontSpec, status: FontStatus) {
        if status == FontStatus::Ready {
            return;
        }
        // Warn once per session, then keep quiet
        if self.fonts_warned.swap(true, Ordering::Relaxed) {
            tracing::debug!(font = %font.css(), ?status, "font still unavailable");
            return;
        }
        match status {
            FontStatus::Substituted { family } => {
                tracing::warn!(font = %font.css(), substitute = %family, "failed to load font; a substitute will be used");
            }
            _ => {
                tracing::warn!(font = %font.css(), "failed to load font; default fonts will be used");
            }
        }
    }

    fn read_published<T>(&self, f: impl FnOnce(&Published) -> T) -> Option<T> {
        let slot = self
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::host_fonts;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const ORANGE: [u8; 4] = [0x7c, 0x2d, 0x12, 0xff];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn blue_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(32, 32, Rgba(BLUE))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn quiet_request() -> RenderRequest {
        RenderRequest::new()
            .with_title("")
            .with_subtitle("")
            .with_brightness(0.0)
    }

    fn session() -> RenderSession {
        RenderSession::new(FontLibrary::empty())
    }

    #[tokio::test]
    async fn nothing_published_before_first_render() {
        let session = session();
        assert!(session.snapshot().is_none());
        assert_eq!(session.published_ticket(), None);
        assert_eq!(session.latest_ticket(), 0);
    }

    #[tokio::test]
    async fn single_render_commits() {
        let session = session();
        let outcome = session.submit(quiet_request(), Some(blue_png())).await;

        assert_eq!(outcome, RenderOutcome::Committed { ticket: 1 });
        let canvas = session.snapshot().unwrap();
        assert_eq!(canvas.pixel(540, 540).0, BLUE);
        assert_eq!(session.published_ticket(), Some(1));
    }

    #[tokio::test]
    async fn newer_request_supersedes_pending_decode() {
        let session = session();

        let stale = session.submit(quiet_request(), Some(blue_png()));
        let fresh = session.submit(quiet_request(), None);
        let (stale, fresh) = tokio::join!(stale, fresh);

        assert_eq!(stale, RenderOutcome::Superseded { ticket: 1 });
        assert_eq!(fresh, RenderOutcome::Committed { ticket: 2 });

        let canvas = session.snapshot().unwrap();
        for pixel in canvas.data.pixels() {
            assert_eq!(pixel.0, ORANGE, "stale background leaked onto the surface");
        }
    }

    #[tokio::test]
    async fn stale_future_polled_last_still_loses() {
        let session = session();

        let stale = session.submit(quiet_request(), None);
        let fresh = session.submit(quiet_request(), Some(blue_png()));

        assert!(fresh.await.is_committed());
        assert!(!stale.await.is_committed());
        assert_eq!(session.snapshot().unwrap().pixel(0, 0).0, BLUE);
    }

    #[tokio::test]
    async fn sequential_renders_replace_background() {
        let session = session();

        assert!(session.submit(quiet_request(), Some(blue_png())).await.is_committed());
        assert!(session.submit(quiet_request(), None).await.is_committed());

        assert_eq!(session.published_ticket(), Some(2));
        assert_eq!(session.snapshot().unwrap().pixel(10, 10).0, ORANGE);
    }

    #[tokio::test]
    async fn undecodable_background_falls_back() {
        let session = session();
        let outcome = session
            .submit(quiet_request(), Some(b"not an image".to_vec()))
            .await;

        assert!(outcome.is_committed());
        assert_eq!(session.snapshot().unwrap().pixel(540, 540).0, ORANGE);
    }

    #[tokio::test]
    async fn font_wait_timeout_still_renders() {
        let session = session().with_font_wait(Duration::ZERO);
        let outcome = session.submit(quiet_request(), None).await;

        assert!(outcome.is_committed());
        assert!(session.snapshot().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_submissions_publish_the_latest() {
        let session = session();
        let pending: Vec<_> = (0..6)
            .map(|i| session.submit(quiet_request(), (i % 2 == 0).then(blue_png)))
            .collect();
        let handles: Vec<_> = pending.into_iter().map(tokio::spawn).collect();

        let mut committed = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap();
            if outcome.is_committed() {
                committed.push(outcome.ticket());
            }
        }

        assert_eq!(committed, vec![6]);
        assert_eq!(session.published_ticket(), Some(6));
        // Ticket 6 had no background
        assert_eq!(session.snapshot().unwrap().pixel(0, 0).0, ORANGE);
    }

    #[tokio::test]
    async fn committed_render_draws_text_with_host_fonts() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let session = RenderSession::new(fonts);
        let request = quiet_request()
            .with_title("HELLO")
            .with_style(crate::request::TextStyle::None)
            .with_text_color("#FFFFFF");

        assert!(session.submit(request, None).await.is_committed());

        let canvas = session.snapshot().unwrap();
        let white = canvas
            .data
            .pixels()
            .filter(|p| p.0 == [255, 255, 255, 255])
            .count();
        assert!(white > 200, "only {white} text pixels");
    }
}

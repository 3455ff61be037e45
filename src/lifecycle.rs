// ============================================================================
// lifecycle.rs - driftfield
// Mount/unmount of the background onto a host, event intake and the
// self-rescheduling frame callback.
// ============================================================================

use crate::config::{FieldConfig, Viewport};
use crate::driver::{DrawTarget, FrameDriver, StepReport};
use crate::error::{FieldError, FrameError};
use crate::input::PointerState;
use crate::metrics::FrameStats;

/// The container a background mounts into.
pub trait SurfaceHost {
    type Target: DrawTarget;

    /// Current size of the container in device pixels.
    fn viewport(&self) -> Viewport;

    /// Create a drawing surface sized to `viewport` and attach it.
    fn create_target(&mut self, viewport: &Viewport) -> Result<Self::Target, FieldError>;

    fn is_attached(&self, target: &Self::Target) -> bool;

    /// Remove the surface from the container.
    fn detach(&mut self, target: &mut Self::Target);

    /// Ask for one more frame callback at the next display refresh.
    fn request_frame(&self);
}

/// A mounted background. Dropping it unmounts.
pub struct Background<H: SurfaceHost> {
    host: H,
    target: Option<H::Target>,
    driver: Option<FrameDriver>,
    pointer: PointerState,
    viewport: Viewport,
    stats: FrameStats,
    diag_interval: u64,
    listening: bool,
    visible: bool,
    disposed: bool,
}

impl<H: SurfaceHost> Background<H> {
    /// Create the surface, seed the field and schedule the first frame.
    ///
    /// Anything acquired before a failure is released when the partially
    /// built background is dropped on the error path.
    pub fn mount(host: H, config: &FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let viewport = host.viewport();

        let mut background = Self {
            host,
            target: None,
            driver: None,
            pointer: PointerState::default(),
            viewport,
            stats: FrameStats::default(),
            diag_interval: u64::from(config.diag_interval.max(1)),
            listening: false,
            visible: true,
            disposed: false,
        };

        let target = background.host.create_target(&viewport)?;
        background.target = Some(target);
        background.driver = Some(FrameDriver::start(
            config,
            &viewport,
            &mut rand::thread_rng(),
        )?);
        background.listening = true;
        background.host.request_frame();

        log::info!(
            "Background mounted: {} particles on {}x{} @{:.2}x",
            config.particle_count,
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );
        Ok(background)
    }

    /// Pointer moved to a physical position inside (or outside) the host.
    pub fn on_pointer_moved(&mut self, x: f64, y: f64) {
        if !self.listening {
            return;
        }
        if !self.pointer.record(x, y, &self.viewport) {
            log::trace!("Ignoring malformed pointer event ({}, {})", x, y);
        }
    }

    /// Host resized. Zero-sized viewports (minimized windows) are ignored.
    pub fn on_resized(&mut self, width: u32, height: u32) {
        if !self.listening {
            return;
        }
        let viewport = Viewport::new(width, height, self.viewport.scale_factor);
        if viewport.is_empty() {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.apply_viewport(viewport);
    }

    pub fn on_scale_factor_changed(&mut self, scale_factor: f64) {
        if !self.listening || !(scale_factor.is_finite() && scale_factor > 0.0) {
            return;
        }
        let mut viewport = self.host.viewport();
        viewport.scale_factor = scale_factor;
        if viewport.is_empty() {
            self.viewport.scale_factor = scale_factor;
            return;
        }
        self.apply_viewport(viewport);
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(target) = &mut self.target {
            target.resize(&viewport);
        }
        if let Some(driver) = &mut self.driver {
            driver.resize(&viewport);
        }
    }

    /// Hidden hosts stop rescheduling; becoming visible restarts the loop.
    pub fn set_visible(&mut self, visible: bool) {
        if self.disposed || self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.host.request_frame();
        }
    }

    /// The display-refresh callback. Runs one step and requests the next.
    /// Returns `None` once unmounted; nothing is touched or rescheduled then.
    pub fn on_frame(&mut self) -> Option<StepReport> {
        if self.disposed {
            return None;
        }
        let (Some(driver), Some(target)) = (&mut self.driver, &mut self.target) else {
            return None;
        };

        let started = std::time::Instant::now();
        let result = driver.step(self.pointer.latest(), target);
        let report = match result {
            Ok(report) => {
                self.stats.record(report.edges, started.elapsed());
                Some(report)
            }
            Err(FrameError::SurfaceLost) => {
                log::debug!("Surface reconfigured, frame {} skipped", driver.frame());
                self.stats.record_skip();
                None
            }
            Err(e) => {
                log::warn!("Frame {} skipped: {}", driver.frame(), e);
                self.stats.record_skip();
                None
            }
        };

        if driver.frame() % self.diag_interval == 0 {
            self.stats.log(driver.frame());
        }
        if self.visible {
            self.host.request_frame();
        }
        report
    }

    /// Stop the driver, drop listeners, detach (if still attached) and release
    /// the surface. Safe to call any number of times.
    pub fn shutdown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.listening = false;
        self.driver = None;

        if let Some(mut target) = self.target.take() {
            if self.host.is_attached(&target) {
                self.host.detach(&mut target);
            }
            target.release();
        }
        log::info!("Background unmounted after {} frames", self.stats.frames());
    }

    pub fn is_mounted(&self) -> bool {
        !self.disposed
    }

    pub fn driver(&self) -> Option<&FrameDriver> {
        self.driver.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: SurfaceHost> Drop for Background<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The viewer context: owns the engine, host, camera, mesh slot and state.
///
/// Everything runs on one thread. Host callbacks (input, frames, fetch
/// completions) call into the viewer between frames, so the mesh swap in
/// [`Viewer::finish_load`] is never observed half-done by [`Viewer::frame`].
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::engine::{Engine, Host, InputEvent, LISTENERS};
use crate::error::{LoadError, ViewerError};
use crate::geometry::{NormalizedMesh, TriangleGeometry};
use crate::loader::{prepare_mesh, LoadCompletion, LoadGeneration, LoadOutcome, LoadTicket};
use crate::projection::Camera;
use crate::scene::{LightRig, MeshSlot, Theme};
use crate::state::{ViewerState, ViewerStatus};
use crate::transform::RotationState;

/// Interactive STL viewer over an [`Engine`] and a [`Host`].
pub struct Viewer<E: Engine, H: Host> {
    config: ViewerConfig,
    engine: E,
    host: H,
    camera: Camera,
    controls: OrbitControls,
    lights: LightRig,
    mesh: MeshSlot<E::Mesh>,
    state: ViewerState,
    generation: LoadGeneration,
    listeners: Vec<H::Listener>,
    frame: Option<H::Frame>,
    bootstrapped: bool,
}

impl<E: Engine, H: Host> Viewer<E, H> {
    pub fn new(config: ViewerConfig, engine: E, host: H) -> Self {
        let mut camera = Camera::new(config.fov_degrees, 1.0, config.near, config.far);
        camera.set_distance(config.camera_distance);

        Self {
            controls: OrbitControls::new(&config),
            state: ViewerState::new(config.auto_rotate, Theme::from_dark(config.dark_theme)),
            lights: LightRig::three_point(),
            mesh: MeshSlot::new(),
            generation: LoadGeneration::new(),
            listeners: Vec::new(),
            frame: None,
            bootstrapped: false,
            camera,
            config,
            engine,
            host,
        }
    }

    /// Build the scene, register listeners and start the render loop.
    ///
    /// Calling this while mounted does nothing. If a source URL is set, its
    /// load is started. On failure everything acquired so far is released.
    pub fn mount(&mut self) -> Result<(), ViewerError> {
        if self.state.mounted {
            log::debug!("mount ignored, viewer already mounted");
            return Ok(());
        }

        if let Err(e) = self.try_mount() {
            log::error!("mount failed: {e}");
            self.unmount();
            return Err(e);
        }

        if let Some(url) = self.state.source.clone() {
            self.load(&url);
        }
        Ok(())
    }

    fn try_mount(&mut self) -> Result<(), ViewerError> {
        self.bootstrap()?;

        for (target, kind) in LISTENERS {
            let listener = self.host.listen(target, kind)?;
            self.listeners.push(listener);
        }

        self.state.mounted = true;
        self.frame = Some(self.host.request_frame()?);
        log::info!("viewer mounted");
        Ok(())
    }

    /// Create the engine surface, camera projection and light rig. Runs once per mount.
    fn bootstrap(&mut self) -> Result<(), ViewerError> {
        if self.bootstrapped {
            return Ok(());
        }

        let (width, height) = self.host.surface_size();
        self.camera.set_viewport(width, height);
        if let Err(e) = self.engine.mount(width, height, self.host.pixel_ratio()) {
            // The surface may already be attached to the host element.
            self.engine.dispose();
            return Err(ViewerError::Engine(e.to_string()));
        }
        self.bootstrapped = true;

        for light in self.lights.lights() {
            self.engine.add_light(light);
        }
        self.engine.set_background(self.state.theme.background(&self.config));

        log::debug!("scene bootstrapped at {width}x{height}");
        Ok(())
    }

    /// Release everything acquired by [`mount`](Self::mount) and by loads.
    ///
    /// Safe to call repeatedly. Outstanding fetches are superseded and their
    /// results will be discarded.
    pub fn unmount(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.host.cancel_frame(frame);
        }
        for listener in self.listeners.drain(..) {
            self.host.unlisten(listener);
        }
        self.release_mesh();
        if self.bootstrapped {
            self.engine.dispose();
            self.bootstrapped = false;
        }

        self.generation.invalidate();
        if self.state.mounted {
            log::info!("viewer unmounted");
        }
        self.state.mounted = false;
        self.state.loading = false;
        self.state.dragging = false;
        self.state.last_pointer = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.state.mounted
    }

    /// Recompute the camera aspect and output size. Mesh and camera position are kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        if self.bootstrapped {
            self.engine.resize(width, height, self.host.pixel_ratio());
        }
    }

    /// Change the model URL. Starts a load when mounted and the URL differs.
    ///
    /// Returns true when a load was started.
    pub fn set_source(&mut self, url: &str) -> bool {
        if self.state.source.as_deref() == Some(url) {
            return false;
        }
        self.state.source = Some(url.to_string());
        if !self.state.mounted {
            return false;
        }
        self.load(url);
        true
    }

    /// Issue a ticket for `url` and hand it to the host for fetching.
    pub fn load(&mut self, url: &str) -> LoadTicket {
        let ticket = self.begin_load(url);
        self.host.start_fetch(ticket.clone());
        ticket
    }

    /// Issue a ticket superseding every earlier load and mark the viewer as loading.
    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        let ticket = self.generation.issue(url);
        self.state.loading = true;
        self.state.error = None;
        log::info!("loading model {url} (request {})", ticket.generation);
        ticket
    }

    /// Re-issue the load for the current source URL.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        let url = self.state.source.clone()?;
        if !self.state.mounted {
            return None;
        }
        Some(self.load(&url))
    }

    /// Continuation of a fetch: parse, normalize and swap the mesh in.
    ///
    /// Completions for superseded tickets are dropped before parsing.
    pub fn finish_load(&mut self, completion: LoadCompletion) -> LoadOutcome {
        if !self.state.mounted || !self.generation.is_current(&completion.ticket) {
            log::debug!(
                "discarding superseded load of {} (request {})",
                completion.ticket.url,
                completion.ticket.generation
            );
            return LoadOutcome::Superseded;
        }

        let prepared = completion
            .bytes
            .map_err(LoadError::from)
            .and_then(|bytes| prepare_mesh(&bytes, &self.config));

        let outcome = match prepared.and_then(|mesh| self.attach_mesh(&mesh)) {
            Ok(triangles) => {
                log::info!("attached {} ({triangles} triangles)", completion.ticket.url);
                self.state.error = None;
                LoadOutcome::Applied { triangles }
            }
            Err(e) => {
                log::warn!("failed to load {}: {e}", completion.ticket.url);
                self.release_mesh();
                self.state.error = Some(e.clone());
                LoadOutcome::Failed(e)
            }
        };
        self.state.loading = false;
        outcome
    }

    /// Display in-memory geometry, superseding any load in flight.
    pub fn show_geometry(&mut self, geometry: TriangleGeometry) -> Result<usize, LoadError> {
        self.generation.invalidate();
        self.state.loading = false;

        let result = if geometry.triangle_count() == 0 {
            Err(LoadError::Empty)
        } else {
            self.attach_mesh(&geometry.normalized(self.config.target_size))
        };
        self.state.error = result.as_ref().err().cloned();
        result
    }

    /// Upload `mesh` and swap it in for the current one in a single step.
    fn attach_mesh(&mut self, mesh: &NormalizedMesh) -> Result<usize, LoadError> {
        if !self.bootstrapped {
            return Err(LoadError::Engine("viewer is not mounted".to_string()));
        }

        let handle = self
            .engine
            .upload_mesh(mesh, &self.config.material)
            .map_err(|e| LoadError::Engine(e.to_string()))?;

        let triangles = mesh.triangle_count();
        if let Some(previous) = self.mesh.take() {
            self.engine.detach(&previous);
            self.engine.dispose_mesh(previous);
        }
        self.state.rotation = RotationState::zero();
        self.engine.set_mesh_rotation(&handle, &self.state.rotation);
        self.engine.attach(&handle);
        self.mesh.replace(handle, triangles);
        Ok(triangles)
    }

    fn release_mesh(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            self.engine.detach(&mesh);
            self.engine.dispose_mesh(mesh);
        }
    }

    /// One render-loop tick: advance auto-rotation, render, reschedule.
    ///
    /// Safe with no mesh attached (renders the empty scene).
    pub fn frame(&mut self) {
        // The handle that scheduled this call has fired.
        self.frame = None;
        if !self.state.mounted {
            return;
        }

        if let Some(mesh) = self.mesh.get() {
            self.controls.advance_auto_rotate(&mut self.state);
            self.engine.set_mesh_rotation(mesh, &self.state.rotation);
        }

        if let Err(e) = self.engine.render(&self.camera) {
            log::warn!("render failed: {e}");
        }

        match self.host.request_frame() {
            Ok(frame) => self.frame = Some(frame),
            Err(e) => log::error!("render loop stopped: {e}"),
        }
    }

    /// Dispatch one raw input event. Ignored while unmounted.
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.state.mounted {
            return;
        }

        match event {
            InputEvent::PointerDown { x, y } => self.controls.begin_drag(&mut self.state, x, y),
            InputEvent::PointerMove { x, y } => {
                self.controls.drag_to(&mut self.state, x, y);
            }
            InputEvent::PointerUp => self.controls.end_drag(&mut self.state),
            InputEvent::Wheel { delta_y } => self.controls.wheel(&mut self.camera, delta_y),
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    pub fn zoom_in(&mut self) {
        self.controls.zoom_in(&mut self.camera);
    }

    pub fn zoom_out(&mut self) {
        self.controls.zoom_out(&mut self.camera);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.state.auto_rotate = enabled;
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.state.auto_rotate = !self.state.auto_rotate;
        self.state.auto_rotate
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.theme = self.state.theme.toggled();
        if self.bootstrapped {
            self.engine.set_background(self.state.theme.background(&self.config));
        }
        self.state.theme
    }

    /// Restore the initial camera distance and mesh orientation.
    pub fn reset_view(&mut self) {
        self.controls.reset(&mut self.camera, &mut self.state);
    }

    pub fn status(&self) -> ViewerStatus {
        ViewerStatus::new(&self.state, self.zoom_level(), self.mesh.triangles())
    }

    pub fn zoom_level(&self) -> f32 {
        self.controls.zoom_level(&self.camera)
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_occupied()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<E: Engine, H: Host> Drop for Viewer<E, H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

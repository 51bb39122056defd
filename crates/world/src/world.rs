use std::sync::{Arc, Weak};

use browserworld_assets::ModelLoader;
use browserworld_common::{ActivityRef, AssetManagerRef, PlatformSurface};
use browserworld_host::{HostRuntime, SurfaceCallback};
use browserworld_render::{CameraSimple, GraphicsContext, NodeId, SceneGraph, TextureSurface};

use crate::bridge::{SurfaceBridge, WorldShared};
use crate::config::WorldConfig;
use crate::frame::FrameScheduler;
use crate::heading::Heading;
use crate::inspect::WorldSummary;
use crate::lifecycle::{FrameGate, Lifecycle, LifecycleState, SceneSlot, configure_camera};
use crate::scene::{SceneAssembler, SceneHandles};

/// Render-loop orchestrator for a browser surface composited into a 3D scene.
///
/// All methods take `&mut self` and belong to the render thread. Surface
/// texture events reach the host through a [`SurfaceBridge`] registered with
/// the context's texture factory; the bridge only holds a weak reference to
/// this world's shared half, so dropping the world is the whole teardown.
pub struct BrowserWorld<C> {
    config: WorldConfig,
    context: C,
    loader: Box<dyn ModelLoader>,
    shared: Arc<WorldShared>,
    bridge: Arc<SurfaceBridge>,
    lifecycle: Lifecycle,
    scene: SceneGraph,
    root: NodeId,
    browser_surface: TextureSurface,
    assembler: SceneAssembler,
    slot: SceneSlot,
    camera: CameraSimple,
    frame: FrameScheduler,
}

impl<C: GraphicsContext> BrowserWorld<C> {
    pub fn new(context: C, loader: Box<dyn ModelLoader>) -> Self {
        Self::with_config(context, loader, WorldConfig::default())
    }

    pub fn with_config(context: C, loader: Box<dyn ModelLoader>, config: WorldConfig) -> Self {
        let shared = Arc::new(WorldShared::new(SurfaceCallback::new(
            config.surface_dimensions(),
        )));
        let bridge = Arc::new(SurfaceBridge::new(Arc::downgrade(&shared)));
        let factory = context.surface_texture_factory();
        let observer: Weak<SurfaceBridge> = Arc::downgrade(&bridge);
        factory.add_global_observer(observer);

        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        let browser_surface = TextureSurface::create(&factory, &config.browser_surface);

        tracing::info!(surface = %config.browser_surface, "browser world created");
        Self {
            config,
            context,
            loader,
            shared,
            bridge,
            lifecycle: Lifecycle::new(),
            scene,
            root,
            browser_surface,
            assembler: SceneAssembler::new(),
            slot: SceneSlot::Pending,
            camera: CameraSimple::new(),
            frame: FrameScheduler::new(),
        }
    }

    /// Hand asset access to the engine and resolve the host surface callback.
    ///
    /// Any missing piece leaves the world rendering without host
    /// notifications; the failure is logged, never returned.
    pub fn attach_host_environment(
        &mut self,
        runtime: Option<Arc<dyn HostRuntime>>,
        activity: Option<ActivityRef>,
        assets: Option<AssetManagerRef>,
    ) {
        self.context.initialize_platform(assets);
        self.lifecycle.mark_host_attached();
        match self.shared.callback().attach(runtime, activity) {
            Ok(()) => tracing::info!("host surface callback bound"),
            Err(e) => tracing::warn!("host callback unavailable, continuing without it: {e}"),
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        configure_camera(&mut self.camera, width, height, &self.config);
        tracing::debug!(width, height, "viewport set");
    }

    /// Build the static scene (once per lifetime) and bring up GL.
    pub fn initialize_graphics(&mut self) {
        let _span = tracing::info_span!("initialize_graphics").entered();
        self.ensure_scene();
        let ready = self.context.initialize_gl();
        self.lifecycle.record_gl(ready);
        if ready {
            tracing::info!("GL initialized");
        } else {
            tracing::warn!("GL initialization failed; will retry on next frame");
        }
    }

    pub fn pause(&mut self) {
        self.lifecycle.pause();
    }

    pub fn resume(&mut self) {
        self.lifecycle.resume();
    }

    /// Tear down GL and release the host callback.
    pub fn shutdown(&mut self) {
        self.context.shutdown();
        self.shared.callback().release();
        self.lifecycle.shut_down();
        tracing::info!("browser world shut down");
    }

    /// Draw one frame, or nothing if paused, shut down or GL is unavailable.
    pub fn draw_frame(&mut self) {
        match self.lifecycle.frame_gate() {
            FrameGate::Skip => return,
            FrameGate::NeedsGl => {
                self.ensure_scene();
                let ready = self.context.initialize_gl();
                self.lifecycle.record_gl(ready);
                if !ready {
                    tracing::debug!("GL not ready; frame skipped");
                    return;
                }
            }
            FrameGate::Draw => {}
        }
        let Some(handles) = self.slot.handles() else {
            return;
        };

        let _span = tracing::info_span!("draw_frame", frame = self.frame.frames()).entered();
        self.frame.run(
            &mut self.context,
            &mut self.scene,
            self.root,
            handles,
            &self.camera,
            &self.config,
        );
    }

    /// Forward a surface change to the host, as the bridge does.
    pub fn set_surface_texture(&self, name: &str, surface: Option<PlatformSurface>) -> bool {
        self.shared.set_surface_texture(name, surface)
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle.is_paused()
    }

    pub fn is_gl_ready(&self) -> bool {
        self.lifecycle.is_gl_ready()
    }

    pub fn heading(&self) -> Heading {
        self.frame.heading()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn camera(&self) -> &CameraSimple {
        &self.camera
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn browser_surface(&self) -> &TextureSurface {
        &self.browser_surface
    }

    pub fn handles(&self) -> Option<&SceneHandles> {
        self.slot.handles()
    }

    pub fn scene_builds(&self) -> u32 {
        self.assembler.builds()
    }

    pub fn bridge(&self) -> Arc<SurfaceBridge> {
        Arc::clone(&self.bridge)
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            state: self.state(),
            heading: self.heading().radians(),
            frames_drawn: self.frame.frames(),
            draw_errors: self.frame.draw_errors(),
            scene_builds: self.assembler.builds(),
            scene_nodes: self.scene.node_count(),
            host_bound: self.shared.callback().is_bound(),
            surface_events: self.shared.surface_events(),
            callbacks_dispatched: self.shared.dispatched(),
        }
    }

    fn ensure_scene(&mut self) {
        let Self {
            slot,
            assembler,
            scene,
            root,
            browser_surface,
            loader,
            config,
            ..
        } = self;
        slot.ensure(|| {
            assembler.build(scene, *root, browser_surface, &mut **loader, config)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browserworld_assets::ModelLibrary;
    use browserworld_common::BROWSER_SURFACE;
    use browserworld_host::RecordingHost;
    use browserworld_render::{
        FOV_DERIVE, HeadlessContext, SurfaceTextureFactory, SurfaceTextureObserver,
    };
    use std::f32::consts::PI;

    fn world() -> BrowserWorld<HeadlessContext> {
        BrowserWorld::new(
            HeadlessContext::new(),
            Box::new(ModelLibrary::with_builtin_models()),
        )
    }

    fn attached_world(host: &Arc<RecordingHost>) -> BrowserWorld<HeadlessContext> {
        let mut w = world();
        w.attach_host_environment(
            Some(host.clone()),
            Some(ActivityRef(1)),
            Some(AssetManagerRef(2)),
        );
        w
    }

    fn running_world(host: &Arc<RecordingHost>) -> BrowserWorld<HeadlessContext> {
        let mut w = attached_world(host);
        w.set_viewport(1920.0, 1080.0);
        w.initialize_graphics();
        w.resume();
        w
    }

    #[test]
    fn new_world_is_created_and_paused() {
        let w = world();
        assert_eq!(w.state(), LifecycleState::Created);
        assert!(w.is_paused());
        assert!(!w.is_gl_ready());
        assert_eq!(w.scene_builds(), 0);
    }

    #[test]
    fn bridge_is_registered_weakly() {
        let w = world();
        let factory = w.context().surface_texture_factory();
        assert_eq!(factory.observer_count(), 1);
        drop(w);
        assert_eq!(factory.observer_count(), 0);
    }

    #[test]
    fn attach_propagates_assets_and_binds_callback() {
        let host = Arc::new(RecordingHost::new());
        let w = attached_world(&host);
        assert_eq!(w.context().assets(), Some(AssetManagerRef(2)));
        assert_eq!(w.state(), LifecycleState::HostAttached);
        assert!(w.summary().host_bound);
    }

    #[test]
    fn attach_without_runtime_still_propagates_assets() {
        let mut w = world();
        w.attach_host_environment(None, Some(ActivityRef(1)), Some(AssetManagerRef(7)));
        assert_eq!(w.context().assets(), Some(AssetManagerRef(7)));
        assert!(!w.summary().host_bound);
    }

    #[test]
    fn wide_viewport_fixes_horizontal_fov() {
        let mut w = world();
        w.set_viewport(16.0, 9.0);
        assert_eq!(w.camera().field_of_view(), (60.0, FOV_DERIVE));
        assert_eq!(w.camera().position(), glam::Vec3::new(0.0, 0.0, 16.0));
    }

    #[test]
    fn tall_viewport_fixes_vertical_fov() {
        let mut w = world();
        w.set_viewport(9.0, 16.0);
        assert_eq!(w.camera().field_of_view(), (FOV_DERIVE, 60.0));
    }

    #[test]
    fn set_viewport_is_idempotent() {
        let mut w = world();
        w.set_viewport(16.0, 9.0);
        let first = w.camera().clone();
        w.set_viewport(16.0, 9.0);
        assert_eq!(*w.camera(), first);
    }

    #[test]
    fn initialize_graphics_builds_scene_once() {
        let mut w = world();
        w.initialize_graphics();
        let nodes = w.scene().node_count();
        w.initialize_graphics();

        assert_eq!(w.scene_builds(), 1);
        assert_eq!(w.scene().node_count(), nodes);
        assert!(w.is_gl_ready());
        assert_eq!(w.context().stats().gl_init_attempts, 2);
    }

    #[test]
    fn gl_init_creates_browser_surface_and_notifies_host() {
        let host = Arc::new(RecordingHost::new());
        let mut w = attached_world(&host);
        w.initialize_graphics();

        let calls = host.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, BROWSER_SURFACE);
        assert!(calls[0].surface.is_some());
        assert_eq!((calls[0].width, calls[0].height), (1024, 1024));
        assert_eq!(host.live_strings(), 0);
    }

    #[test]
    fn paused_frame_changes_nothing() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        w.draw_frame();
        w.pause();

        let revision = w.scene().revision();
        let handles = w.handles().cloned().unwrap();
        let controller = w.scene().transform(handles.controller);
        let browser = w.scene().transform(handles.browser);
        let heading = w.heading();
        let stats = w.context().stats().clone();

        for _ in 0..5 {
            w.draw_frame();
        }

        assert_eq!(w.scene().revision(), revision);
        assert_eq!(w.scene().transform(handles.controller), controller);
        assert_eq!(w.scene().transform(handles.browser), browser);
        assert_eq!(w.heading(), heading);
        assert_eq!(*w.context().stats(), stats);
    }

    #[test]
    fn resumed_frames_animate_and_draw() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        w.draw_frame();
        w.draw_frame();

        let stats = w.context().stats();
        assert_eq!(stats.executes, 2);
        assert_eq!(stats.updates, 2);
        // browser quad + controller model
        assert_eq!(stats.drawables_drawn, 4);
        assert_eq!(w.heading().radians(), PI / 120.0 + PI / 120.0);
        assert_eq!(w.state(), LifecycleState::GlReady);
    }

    #[test]
    fn draw_without_initialize_builds_lazily() {
        let mut w = world();
        w.resume();
        w.draw_frame();
        assert_eq!(w.scene_builds(), 1);
        assert!(w.is_gl_ready());
        assert_eq!(w.context().stats().executes, 1);
    }

    #[test]
    fn gl_failure_is_retried_on_next_frame() {
        let mut w = BrowserWorld::new(
            HeadlessContext::with_gl_failures(2),
            Box::new(ModelLibrary::with_builtin_models()),
        );
        w.initialize_graphics();
        w.resume();
        assert!(!w.is_gl_ready());

        w.draw_frame();
        assert_eq!(w.context().stats().executes, 0);
        assert_eq!(w.heading().radians(), 0.0);

        w.draw_frame();
        assert!(w.is_gl_ready());
        assert_eq!(w.context().stats().executes, 1);
        assert_eq!(w.scene_builds(), 1);
    }

    #[test]
    fn draw_errors_do_not_stall_heading() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        w.context_mut().set_draw_failure(true);
        w.draw_frame();
        assert_eq!(w.summary().draw_errors, 1);
        assert_eq!(w.heading().radians(), PI / 120.0);
    }

    #[test]
    fn heading_wraps_after_a_full_turn() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        let mut wrapped = false;
        for _ in 0..300 {
            w.draw_frame();
            let h = w.heading().radians();
            assert!(h < 2.0 * PI);
            wrapped |= h == 0.0;
        }
        assert!(wrapped);
    }

    #[test]
    fn negative_heading_step_keeps_heading_in_range() {
        let config = WorldConfig {
            heading_step: -0.1,
            ..WorldConfig::default()
        };
        let mut w = BrowserWorld::with_config(
            HeadlessContext::new(),
            Box::new(ModelLibrary::with_builtin_models()),
            config,
        );
        w.initialize_graphics();
        w.resume();
        for _ in 0..10 {
            w.draw_frame();
            assert!((0.0..2.0 * PI).contains(&w.heading().radians()));
        }
        assert_eq!(w.summary().frames_drawn, 10);
    }

    #[test]
    fn shutdown_then_draw_is_a_no_op() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        w.draw_frame();
        w.shutdown();
        // surface destroyed during shutdown still reached the host
        assert_eq!(host.calls().len(), 2);
        assert_eq!(host.calls()[1].surface, None);
        assert_eq!(host.live_global_refs(), 0);

        let executes = w.context().stats().executes;
        w.resume();
        w.draw_frame();
        assert_eq!(w.context().stats().executes, executes);
        assert_eq!(w.state(), LifecycleState::ShutDown);

        // a late engine event after shutdown reaches nobody
        let factory = w.context().surface_texture_factory();
        factory.register_surface("late");
        factory.create_pending();
        factory.destroy("late");
        assert_eq!(host.calls().len(), 2);
    }

    #[test]
    fn reinitialize_after_shutdown_resumes_drawing() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        w.shutdown();

        w.attach_host_environment(Some(host.clone()), Some(ActivityRef(1)), None);
        w.initialize_graphics();
        w.resume();
        w.draw_frame();

        assert_eq!(w.state(), LifecycleState::GlReady);
        assert_eq!(w.scene_builds(), 1);
        assert_eq!(w.context().stats().executes, 1);
        // recreated surface announced again
        assert!(host.calls().last().and_then(|c| c.surface).is_some());
    }

    #[test]
    fn surface_events_after_world_drop_are_absorbed() {
        let host = Arc::new(RecordingHost::new());
        let mut w = attached_world(&host);
        let factory: Arc<SurfaceTextureFactory> = w.context().surface_texture_factory();
        let bridge = w.bridge();

        w.initialize_graphics();
        assert_eq!(host.calls().len(), 1);
        drop(w);

        // an event already in flight holds the bridge, not the world
        bridge.surface_texture_destroyed(BROWSER_SURFACE);
        assert!(!bridge.is_connected());
        factory.destroy(BROWSER_SURFACE);
        assert_eq!(host.calls().len(), 1);
        assert_eq!(host.live_global_refs(), 0);
    }

    #[test]
    fn degraded_world_still_renders() {
        let host = Arc::new(RecordingHost::new().without_method());
        let mut w = attached_world(&host);
        w.initialize_graphics();
        w.resume();
        w.draw_frame();

        assert!(host.calls().is_empty());
        assert_eq!(host.strings_allocated(), 0);
        assert_eq!(w.context().stats().executes, 1);
        assert_eq!(w.summary().surface_events, 1);
        assert_eq!(w.summary().callbacks_dispatched, 0);
    }

    #[test]
    fn configured_surface_size_is_reported() {
        let host = Arc::new(RecordingHost::new());
        let config = WorldConfig {
            surface_width: 1920,
            surface_height: 1080,
            ..WorldConfig::default()
        };
        let mut w = BrowserWorld::with_config(
            HeadlessContext::new(),
            Box::new(ModelLibrary::with_builtin_models()),
            config,
        );
        w.attach_host_environment(Some(host.clone()), Some(ActivityRef(1)), None);
        w.initialize_graphics();
        assert_eq!((host.calls()[0].width, host.calls()[0].height), (1920, 1080));
    }

    #[test]
    fn events_from_another_thread_reach_the_host_while_drawing() {
        let host = Arc::new(RecordingHost::new());
        let mut w = running_world(&host);
        let factory = w.context().surface_texture_factory();

        let producer = std::thread::spawn(move || {
            factory.register_surface("tab");
            for _ in 0..50 {
                factory.create_pending();
                factory.destroy("tab");
            }
        });
        for _ in 0..100 {
            w.draw_frame();
        }
        producer.join().unwrap();

        // one browser creation plus a create/destroy pair per round
        assert_eq!(host.calls().len(), 1 + 100);
        assert_eq!(w.summary().frames_drawn, 100);
        assert_eq!(host.live_strings(), 0);
    }
}

//! Folio Runner entry point
//!
//! The browser build wires the canvas, input listeners and DOM events to the
//! engine and runs the animation-frame loop. The native build runs a short
//! scripted session headlessly, which is handy for checking logs and pacing.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent};

    use folio_runner::catalog;
    use folio_runner::leaderboard::{RunRecord, format_duration};
    use folio_runner::renderer::{RenderState, build_frame};
    use folio_runner::sim::{
        Game, GameConfig, GameEvent, InputEvent, Key, MouseButton, TouchControl,
    };
    use folio_runner::{DifficultyPreset, Leaderboard, QualityPreset, Settings};

    const DEFAULT_CATALOG_URL: &str = "projects.json";
    const DEFAULT_ATLAS_URL: &str = "assets/player.png";
    const TOUCH_CONTROLS: [&str; 8] = [
        "left", "right", "up", "down", "jump", "slide", "attack", "interact",
    ];

    /// Browser-side session: the engine plus everything the page owns
    struct Host {
        game: Game,
        render_state: Option<RenderState>,
        last_time: f64,
        preset: DifficultyPreset,
        leaderboard: Leaderboard,
    }

    impl Host {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            self.game.frame(dt);

            for event in self.game.drain_events() {
                if let GameEvent::SessionComplete { elapsed_secs, collected, .. } = &event {
                    self.record_run(*elapsed_secs, *collected);
                }
                dispatch(&event);
            }

            self.render();
        }

        fn record_run(&mut self, elapsed_secs: f64, collected: usize) {
            let record = RunRecord {
                elapsed_secs,
                collected,
                difficulty: self.preset,
                timestamp: js_sys::Date::now(),
            };
            match self.leaderboard.add_run(record) {
                Some(rank) => {
                    log::info!("New leaderboard entry #{rank}: {}", format_duration(elapsed_secs));
                    self.leaderboard.save();
                }
                None => log::info!("Run finished in {}", format_duration(elapsed_secs)),
            }
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let list = build_frame(&self.game);
            match render_state.render(&list) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.game.resize(width as f32, height as f32);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
            }
        }
    }

    /// Forward an engine event to the page as a `CustomEvent` on `window`
    fn dispatch(event: &GameEvent) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let init = web_sys::CustomEventInit::new();
        match serde_json::to_string(event) {
            Ok(json) => {
                if let Ok(detail) = js_sys::JSON::parse(&json) {
                    init.set_detail(&detail);
                }
            }
            Err(e) => log::warn!("Could not serialize {}: {e}", event.name()),
        }
        match web_sys::CustomEvent::new_with_event_init_dict(event.name(), &init) {
            Ok(custom) => {
                let _ = window.dispatch_event(&custom);
            }
            Err(e) => log::warn!("Could not create {} event: {:?}", event.name(), e),
        }
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Folio Runner starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element on the page");
            return;
        };

        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        // Page configuration lives in data attributes on the canvas
        let preset = canvas
            .get_attribute("data-difficulty")
            .and_then(|s| DifficultyPreset::from_str(&s))
            .unwrap_or_default();
        let debug = canvas.get_attribute("data-debug").is_some();
        let catalog_url = canvas
            .get_attribute("data-catalog-url")
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let atlas_url = canvas
            .get_attribute("data-atlas-url")
            .unwrap_or_else(|| DEFAULT_ATLAS_URL.to_string());

        let mut settings = Settings::load();
        if let Some(quality) = canvas
            .get_attribute("data-quality")
            .and_then(|s| QualityPreset::from_str(&s))
        {
            settings.apply_preset(quality);
        }

        let seed = js_sys::Date::now() as u64;
        let config = GameConfig {
            seed,
            difficulty: preset.difficulty(),
            settings,
            debug,
            screen_width: width as f32,
            screen_height: height as f32,
            ..GameConfig::default()
        };
        let mut game = match Game::new(config) {
            Ok(game) => game,
            Err(e) => {
                log::error!("Refusing to start: {e}");
                return;
            }
        };

        let (sender, receiver) = catalog::channel();
        game.attach_catalog(receiver);
        catalog::spawn_fetch(catalog_url, sender);

        let host = Rc::new(RefCell::new(Host {
            game,
            render_state: None,
            last_time: 0.0,
            preset,
            leaderboard: Leaderboard::load(),
        }));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        match init_renderer(&instance, &canvas, width, height).await {
            Ok(render_state) => host.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Rendering disabled: {e}"),
        }
        load_atlas(&document, &atlas_url, host.clone());

        setup_keyboard(host.clone());
        setup_pointer(&canvas, host.clone());
        setup_touch_controls(&document, host.clone());
        setup_page_events(host.clone());
        setup_auto_pause(host.clone());
        setup_resize(canvas.clone(), host.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(host);
        log::info!("Folio Runner running!");
    }

    async fn init_renderer(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<RenderState, String> {
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| e.to_string())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);
        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| e.to_string())
    }

    /// Decode the sprite atlas through a 2D canvas and hand the pixels to the GPU
    fn load_atlas(document: &web_sys::Document, url: &str, host: Rc<RefCell<Host>>) {
        let Ok(image) = HtmlImageElement::new() else {
            return;
        };
        let document = document.clone();
        let loaded = image.clone();
        let closure = Closure::once(move || {
            let (w, h) = (loaded.natural_width(), loaded.natural_height());
            let Some(context) = document
                .create_element("canvas")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
                .and_then(|scratch| {
                    scratch.set_width(w);
                    scratch.set_height(h);
                    scratch.get_context("2d").ok().flatten()
                })
                .and_then(|ctx| ctx.dyn_into::<web_sys::CanvasRenderingContext2d>().ok())
            else {
                log::warn!("No 2D context to decode the sprite atlas");
                return;
            };
            if context.draw_image_with_html_image_element(&loaded, 0.0, 0.0).is_err() {
                return;
            }
            let Ok(data) = context.get_image_data(0.0, 0.0, w as f64, h as f64) else {
                return;
            };
            let pixels = data.data();
            let mut host = host.borrow_mut();
            if let Some(render_state) = host.render_state.as_mut() {
                if let Err(e) = render_state.upload_atlas(w, h, &pixels.0) {
                    log::warn!("Sprite atlas rejected: {e}");
                }
            }
        });
        image.set_onload(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
        image.set_src(url);
    }

    fn setup_keyboard(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (name, down) in [("keydown", true), ("keyup", false)] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_code(&event.code()).or_else(|| Key::from_code(&event.key()));
                let Some(key) = key else {
                    return;
                };
                event.prevent_default();
                if down && event.repeat() {
                    return;
                }
                let input = if down {
                    InputEvent::KeyDown(key)
                } else {
                    InputEvent::KeyUp(key)
                };
                host.borrow_mut().game.apply_input(input);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        for (name, down) in [("mousedown", true), ("mouseup", false)] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let button = MouseButton::from_index(event.button());
                let input = if down {
                    InputEvent::MouseDown(button)
                } else {
                    InputEvent::MouseUp(button)
                };
                host.borrow_mut().game.apply_input(input);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right click slides instead of opening the menu
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            event.prevent_default();
        });
        let _ = canvas
            .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// On-screen buttons `#touch-left`, `#touch-jump`, ...
    fn setup_touch_controls(document: &web_sys::Document, host: Rc<RefCell<Host>>) {
        for name in TOUCH_CONTROLS {
            let (Some(element), Some(control)) = (
                document.get_element_by_id(&format!("touch-{name}")),
                TouchControl::from_name(name),
            ) else {
                continue;
            };
            for (event_name, start) in [("touchstart", true), ("touchend", false), ("touchcancel", false)] {
                let host = host.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    let input = if start {
                        InputEvent::TouchStart(control)
                    } else {
                        InputEvent::TouchEnd(control)
                    };
                    host.borrow_mut().game.apply_input(input);
                });
                let _ = element
                    .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Handler for a page command; receives the event's string detail, if any
    type PageHandler = fn(&mut Host, Option<String>);

    fn on_set_difficulty(host: &mut Host, detail: Option<String>) {
        if let Some(preset) = detail.as_deref().and_then(DifficultyPreset::from_str) {
            host.preset = preset;
            host.game.set_difficulty(preset.difficulty());
        }
    }

    fn on_set_quality(host: &mut Host, detail: Option<String>) {
        let Some(preset) = detail.as_deref().and_then(QualityPreset::from_str) else {
            return;
        };
        let mut settings = host.game.settings().clone();
        settings.apply_preset(preset);
        settings.save();
        host.game.set_settings(settings);
        log::info!("Quality set to {}", preset.as_str());
    }

    fn on_start_game(host: &mut Host, detail: Option<String>) {
        on_set_difficulty(host, detail);
        host.game.start();
    }

    /// Commands the page sends back as DOM events on `window`
    fn setup_page_events(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let handlers: [(&str, PageHandler); 7] = [
            ("startGame", on_start_game),
            ("setDifficulty", on_set_difficulty),
            ("setQuality", on_set_quality),
            ("openControlsModal", |h, _| h.game.open_controls_modal()),
            ("modalOpened", |h, _| h.game.set_modal_open(true)),
            ("modalClosed", |h, _| h.game.set_modal_open(false)),
            ("settingsChanged", |h, _| h.game.set_settings(Settings::load())),
        ];

        for (name, handler) in handlers {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let detail = event
                    .dyn_ref::<web_sys::CustomEvent>()
                    .and_then(|e| e.detail().as_string());
                handler(&mut host.borrow_mut(), detail);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page teardown: drop late catalog results and stop simulating
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            host.borrow_mut().game.shutdown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let host = host.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut h = host.borrow_mut();
                    h.game.pause();
                    // Avoid a huge dt when the tab comes back
                    h.last_time = 0.0;
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: keys released outside the page never send keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                host.borrow_mut().game.release_input();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = canvas_pixel_size(&window_clone, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            host.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        let running = {
            let mut h = host.borrow_mut();
            h.frame(time);
            !h.game.is_shut_down()
        };
        if running {
            request_animation_frame(host);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Folio Runner (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve`; simulating headlessly");

    if let Err(e) = native::run_demo() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use folio_runner::leaderboard::{RunRecord, format_duration};
    use folio_runner::sim::{Game, GameConfig, GameEvent, GamePhase, InputEvent, Key};
    use folio_runner::{ContentRecord, DifficultyPreset, EngineError, Leaderboard};

    const DT: f32 = 1.0 / 60.0;
    const DEMO_SECONDS: f32 = 180.0;

    /// Run right, hop regularly and collect whatever comes within reach
    pub fn run_demo() -> Result<(), EngineError> {
        let preset = DifficultyPreset::Easy;
        let mut game = Game::new(GameConfig {
            seed: 7,
            difficulty: preset.difficulty(),
            ..GameConfig::default()
        })?;
        game.load_catalog(
            (1..=6)
                .map(|i| ContentRecord::new(format!("demo-{i}"), format!("Demo project {i}")))
                .collect(),
        );
        game.start();
        game.apply_input(InputEvent::KeyDown(Key::Right));

        let frames = (DEMO_SECONDS / DT) as usize;
        for frame in 0..frames {
            if frame % 45 == 0 {
                game.apply_input(InputEvent::KeyDown(Key::Jump));
            } else if frame % 45 == 1 {
                game.apply_input(InputEvent::KeyUp(Key::Jump));
            }
            if game.portfolio().is_near() {
                game.apply_input(InputEvent::KeyDown(Key::Interact));
            } else {
                game.apply_input(InputEvent::KeyUp(Key::Interact));
            }

            game.frame(DT);

            for event in game.drain_events() {
                if matches!(event, GameEvent::ProjectProximity { .. }) {
                    continue;
                }
                log::info!("event: {}", serde_json::to_string(&event).unwrap_or_default());
            }
            if game.phase() == GamePhase::Complete {
                break;
            }
        }

        let summary = game.session_summary();
        log::info!(
            "Collected {}/{} (needed {}) in {}",
            summary.collected,
            summary.total,
            summary.projects_required,
            format_duration(summary.elapsed_secs)
        );
        if summary.complete {
            let mut board = Leaderboard::new();
            let rank = board.add_run(RunRecord {
                elapsed_secs: summary.elapsed_secs,
                collected: summary.collected,
                difficulty: preset,
                timestamp: 0.0,
            });
            log::info!("Leaderboard rank: {:?}", rank);
            if let Some(best) = board.best_time() {
                log::info!("Best time: {}", format_duration(best));
            }
        }
        game.shutdown();
        Ok(())
    }
}

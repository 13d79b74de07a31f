use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlAnchorElement, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GalaxyState;
use crate::galaxy::{FileNode, GalaxyConfig, GraphView, InteractionSink, Tooltip, VisualizationMode};

const FALLBACK_DT: f64 = 1.0 / 60.0;

/// Handles owned by one mounted galaxy. Everything here is released by
/// [`Runtime::teardown`].
#[derive(Clone, Default)]
struct Runtime {
	state: Rc<RefCell<Option<GalaxyState>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	frame: Rc<Cell<Option<i32>>>,
	last_frame: Rc<Cell<Option<f64>>>,
	resize: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Runtime {
	fn teardown(&self) {
		let window = web_sys::window();
		if let (Some(id), Some(window)) = (self.frame.take(), window.as_ref()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		self.last_frame.set(None);
		if let (Some(cb), Some(window)) = (self.resize.borrow_mut().take(), window.as_ref()) {
			let _ = window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some(mut state) = self.state.borrow_mut().take() {
			state.teardown();
			log::debug!("galaxy torn down");
		}
	}

	fn schedule(&self) {
		let animate = self.animate.borrow();
		let (Some(window), Some(cb)) = (web_sys::window(), animate.as_ref()) else {
			return;
		};
		self.frame
			.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
	}
}

struct PointerSink<'a> {
	tooltip: WriteSignal<Option<Tooltip>>,
	on_select: Option<Callback<FileNode>>,
	canvas: &'a HtmlCanvasElement,
}

impl InteractionSink for PointerSink<'_> {
	fn show_tooltip(&mut self, tooltip: Tooltip) {
		self.tooltip.set(Some(tooltip));
	}

	fn hide_tooltip(&mut self) {
		self.tooltip.set(None);
	}

	fn select(&mut self, node: &FileNode) {
		if let Some(cb) = self.on_select {
			cb.run(node.clone());
		}
	}

	fn set_pointer(&mut self, over_body: bool) {
		let cursor = if over_body { "pointer" } else { "grab" };
		let _ = web_sys::HtmlElement::style(self.canvas).set_property("cursor", cursor);
	}
}

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn scene_seed() -> u64 {
	(js_sys::Math::random() * 9_007_199_254_740_991.0) as u64
}

/// The interactive 3D galaxy. A new scene is built whenever `view` or
/// `mode` changes; the previous one is stopped and released first. The
/// scene seed is drawn once per mount, so rebuilds keep the same backdrop.
#[component]
pub fn CodeGalaxy(
	#[prop(into)] view: Signal<Option<GraphView>>,
	#[prop(into)] mode: Signal<VisualizationMode>,
	/// Every change after the first value restores the initial camera.
	#[prop(into)]
	reset_trigger: Signal<u32>,
	#[prop(optional)] on_node_click: Option<Callback<FileNode>>,
	#[prop(optional)] config: Option<GalaxyConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (tooltip, set_tooltip) = signal(None::<Tooltip>);
	let config = Rc::new(config.unwrap_or_default());
	let runtime = Runtime::default();
	let seed = scene_seed();

	let rt = runtime.clone();
	Effect::new(move |_| {
		let current = view.get();
		let mode = mode.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		rt.teardown();
		set_tooltip.set(None);

		let Some(current) = current.filter(|v| !v.is_empty()) else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx,
			_ => {
				log::warn!("2d canvas context unavailable");
				return;
			}
		};
		let Ok(ctx) = ctx.dyn_into::<web_sys::CanvasRenderingContext2d>() else {
			return;
		};
		let count = current.nodes.len();
		*rt.state.borrow_mut() = Some(GalaxyState::new(&current, mode, &config, w, h, seed));
		log::info!("galaxy mounted with {count} bodies in {mode:?} mode");

		let (state_resize, canvas_resize) = (rt.state.clone(), canvas.clone());
		*rt.resize.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *rt.resize.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let rt_anim = rt.clone();
		*rt.animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = rt_anim
				.last_frame
				.replace(Some(now))
				.map_or(FALLBACK_DT, |prev| ((now - prev) / 1000.0).max(0.0));
			if let Some(ref mut s) = *rt_anim.state.borrow_mut() {
				s.tick(dt);
				render::render(s, &ctx);
			}
			rt_anim.schedule();
		}));
		rt.schedule();
	});

	let rt_reset = runtime.clone();
	Effect::new(move |_| {
		if reset_trigger.get() == 0 {
			return;
		}
		if let Some(ref mut s) = *rt_reset.state.borrow_mut() {
			s.scene.reset_view();
		}
	});

	let stored = StoredValue::new_local(runtime.clone());
	on_cleanup(move || {
		stored.try_with_value(Runtime::teardown);
	});

	let rt_md = runtime.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *rt_md.state.borrow_mut() {
			s.begin_orbit(x, y);
		}
	};

	let rt_mm = runtime.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *rt_mm.state.borrow_mut() {
			if s.drag_orbit(x, y) {
				return;
			}
			let mut sink = PointerSink {
				tooltip: set_tooltip,
				on_select: on_node_click,
				canvas: &canvas,
			};
			s.scene.hover(x, y, &mut sink);
		}
	};

	let rt_mu = runtime.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *rt_mu.state.borrow_mut() {
			s.end_orbit();
		}
	};

	let rt_click = runtime.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref s) = *rt_click.state.borrow() {
			if s.orbit.moved {
				return;
			}
			let mut sink = PointerSink {
				tooltip: set_tooltip,
				on_select: on_node_click,
				canvas: &canvas,
			};
			s.scene.click(x, y, &mut sink);
		}
	};

	let rt_ml = runtime.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Some(ref mut s) = *rt_ml.state.borrow_mut() {
			s.end_orbit();
			let mut sink = PointerSink {
				tooltip: set_tooltip,
				on_select: on_node_click,
				canvas: &canvas,
			};
			s.scene.leave(&mut sink);
		}
	};

	let rt_wh = runtime;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *rt_wh.state.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 1.1 } else { 0.9 };
			s.scene.camera_mut().dolly(factor);
		}
	};

	let has_bodies = move || view.with(|v| v.as_ref().is_some_and(|v| !v.is_empty()));

	view! {
		<div class="code-galaxy" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="code-galaxy-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:click=on_click
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="cursor: grab;"
				style:display=move || if has_bodies() { "block" } else { "none" }
			/>
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<div
								class="galaxy-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; \
									 pointer-events: none;",
									t.x,
									t.y,
								)
							>
								<strong>{t.title}</strong>
								<div>{t.detail}</div>
							</div>
						}
					})
			}}
			{move || match view.with(|v| v.as_ref().map(GraphView::is_empty)) {
				None => {
					Some(
						view! {
							<div class="galaxy-welcome">
								<h2>"Explore a repository as a galaxy"</h2>
								<p>
									"Load a repository to see files orbit the most important one."
								</p>
							</div>
						}
							.into_any(),
					)
				}
				Some(true) => {
					Some(
						view! {
							<div class="galaxy-empty">
								<p>"No files match the current filter."</p>
							</div>
						}
							.into_any(),
					)
				}
				Some(false) => None,
			}}
		</div>
	}
}

/// PNG data URL of the mounted galaxy canvas.
pub fn export_galaxy_image() -> Option<String> {
	let canvas = web_sys::window()?
		.document()?
		.query_selector("canvas.code-galaxy-canvas")
		.ok()??;
	canvas
		.dyn_into::<HtmlCanvasElement>()
		.ok()?
		.to_data_url_with_type("image/png")
		.ok()
}

/// Triggers a browser download of `href` saved as `filename`.
pub fn download(filename: &str, href: &str) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
	Ok(())
}

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::GalaxyState;
use crate::galaxy::VisualizationMode;
use crate::galaxy::scene::{Body, Projected, css_rgba};

const BACKGROUND: &str = "#05050c";
const LINK_COLOR: u32 = 0x00F0FF;

pub fn render(state: &GalaxyState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_starfield(state, ctx);
	if state.mode == VisualizationMode::Dependency {
		draw_links(state, ctx);
	}
	draw_bodies(state, ctx);
}

fn draw_starfield(state: &GalaxyState, ctx: &CanvasRenderingContext2d) {
	let camera = state.scene.camera();
	for point in state.scene.background() {
		let Some(p) = camera.project(*point) else {
			continue;
		};
		let size = (p.scale * 2.0).clamp(0.5, 2.0);
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.25 + 0.5 * size / 2.0));
		ctx.fill_rect(p.x, p.y, size, size);
	}
}

fn draw_links(state: &GalaxyState, ctx: &CanvasRenderingContext2d) {
	let (camera, positions) = (state.scene.camera(), state.scene.positions());
	ctx.set_line_width(1.0);
	for &(source, target, strength) in state.scene.links() {
		let (Some(a), Some(b)) = (
			positions.get(source).and_then(|p| camera.project(*p)),
			positions.get(target).and_then(|p| camera.project(*p)),
		) else {
			continue;
		};
		ctx.set_stroke_style_str(&css_rgba(LINK_COLOR, 0.1 + 0.2 * strength.clamp(0.0, 1.0)));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_bodies(state: &GalaxyState, ctx: &CanvasRenderingContext2d) {
	let scene = &state.scene;
	for (body, p) in scene.draw_order() {
		let radius = (body.radius * p.scale).max(0.5);
		if let Some(halo) = scene.halo_radius(body) {
			let opacity = body.halo.map_or(0.0, |h| h.opacity);
			draw_glow(ctx, &p, radius, halo * p.scale, body.color, opacity);
		} else if body.emphasis > 0.0 {
			let halo = radius * (1.0 + body.emphasis);
			draw_glow(ctx, &p, radius, halo, body.color, 0.25 * body.emphasis);
		}
		draw_sphere(ctx, body, &p, radius, scene.nodes()[body.slot].brightness);

		if scene.hovered() == Some(body.slot) {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}
		if body.halo.is_some() {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_font("12px sans-serif");
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&scene.nodes()[body.slot].name, p.x, p.y + radius + 16.0);
			ctx.set_text_align("start");
		}
	}
}

fn draw_glow(
	ctx: &CanvasRenderingContext2d,
	p: &Projected,
	inner: f64,
	outer: f64,
	color: u32,
	opacity: f64,
) {
	if outer <= inner {
		return;
	}
	let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, inner * 0.5, p.x, p.y, outer) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &css_rgba(color, opacity));
	let _ = gradient.add_color_stop(1.0, &css_rgba(color, 0.0));
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, outer, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

// Lit from the upper left so bodies read as spheres.
fn draw_sphere(
	ctx: &CanvasRenderingContext2d,
	body: &Body,
	p: &Projected,
	radius: f64,
	brightness: f64,
) {
	let (hx, hy) = (p.x - radius * 0.35, p.y - radius * 0.35);
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
	match ctx.create_radial_gradient(hx, hy, radius * 0.1, p.x, p.y, radius) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &css_rgba(0xFFFFFF, 0.6 * brightness));
			let _ = gradient.add_color_stop(0.35, &css_rgba(body.color, brightness.max(0.5)));
			let _ = gradient.add_color_stop(1.0, &css_rgba(body.color, 0.35));
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&css_rgba(body.color, 1.0)),
	}
	ctx.fill();
}

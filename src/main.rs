mod app;
mod config;
mod countdown;
mod features;
mod gfx;
mod wayland;

use anyhow::{anyhow, Result};
use app::{App, ProgressDisplay};
use config::{Anchor, Config};
use gfx::draw::DrawContext;
use gfx::gl::load_shader_program;
use gfx::math::Rect;
use log::info;
use std::time::{Duration, Instant};
use wayland::egl::EglContext;
use wayland::WaylandState;
use wayland_client::{Connection, Proxy};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

/// Time left to sleep so a frame lands on its budget. Zero once the frame
/// has already overrun.
fn remaining_budget(frame_budget: Duration, elapsed: Duration) -> Duration {
    frame_budget.saturating_sub(elapsed)
}

fn wl_anchor(anchor: Anchor) -> zwlr_layer_surface_v1::Anchor {
    match anchor {
        Anchor::TopLeft => zwlr_layer_surface_v1::Anchor::Top | zwlr_layer_surface_v1::Anchor::Left,
        Anchor::TopRight => {
            zwlr_layer_surface_v1::Anchor::Top | zwlr_layer_surface_v1::Anchor::Right
        }
        Anchor::BottomLeft => {
            zwlr_layer_surface_v1::Anchor::Bottom | zwlr_layer_surface_v1::Anchor::Left
        }
        Anchor::BottomRight => {
            zwlr_layer_surface_v1::Anchor::Bottom | zwlr_layer_surface_v1::Anchor::Right
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().unwrap_or_default();
    let mut app = App::new(config);

    info!("Connecting to Wayland");
    let conn = Connection::connect_to_env()?;
    let display = conn.display();

    let mut event_queue = conn.new_event_queue();
    let qh = event_queue.handle();

    let _registry = display.get_registry(&qh, ());

    let mut state = WaylandState::new(&qh);

    // Initial roundtrip to get globals
    event_queue.roundtrip(&mut state)?;

    if let Some(size) = state.output_size {
        info!("Output size: {}x{}", size[0], size[1]);
    }

    let compositor = state
        .compositor
        .clone()
        .ok_or_else(|| anyhow!("Compositor does not advertise wl_compositor"))?;
    let layer_shell = state
        .layer_shell
        .clone()
        .ok_or_else(|| anyhow!("Compositor does not support zwlr_layer_shell_v1"))?;

    let surface = compositor.create_surface(&qh, ());
    let layer_surface = layer_shell.get_layer_surface(
        &surface,
        None,
        zwlr_layer_shell_v1::Layer::Overlay,
        "wane".to_string(),
        &qh,
        (),
    );

    let margins = app.config.margins.clone();
    layer_surface.set_anchor(wl_anchor(app.config.anchor));
    layer_surface.set_margin(
        margins.top as i32,
        margins.right as i32,
        margins.bottom as i32,
        margins.left as i32,
    );
    layer_surface.set_exclusive_zone(0);
    layer_surface.set_size(app.config.bar_size.width, app.config.bar_size.height);
    surface.commit();

    state.surface = Some(surface.clone());
    state.layer_surface = Some(layer_surface);

    // Wait for configure
    while !state.configured {
        event_queue.blocking_dispatch(&mut state)?;
    }
    info!("Surface configured");

    let display_ptr = display.id().as_ptr() as *mut _;
    let mut egl = EglContext::new(display_ptr)?;
    egl.create_surface(
        &surface,
        app.buffer_size[0] as i32,
        app.buffer_size[1] as i32,
    )?;
    egl.make_current()?;

    let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };

    let vert_src = std::fs::read_to_string("assets/shaders/ui.vert.glsl")?;
    let frag_src = std::fs::read_to_string("assets/shaders/ui.frag.glsl")?;
    let program = load_shader_program(&gl, &vert_src, &frag_src)?;

    let mut draw_context = DrawContext::new(gl, program)?;

    // The overlay is up; bind the progress display to it
    app.display = Some(ProgressDisplay::default());

    let frame_budget = Duration::from_millis(1000 / app.config.fps_cap.max(1) as u64);
    let mut last_frame = Instant::now();

    info!("Starting main loop");
    while state.running {
        event_queue.dispatch_pending(&mut state)?;

        for ev in state.pending_events.drain(..) {
            app.handle_event(ev);
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        // Frame callback: one wall-clock sample per frame
        app.update(dt);

        if app.quit {
            break;
        }

        egl.make_current()?;

        let size = app.buffer_size.map(|x| x as f32);
        draw_context.begin(size);
        draw_context.set_time(app.time);

        let viewport = Rect::new(0.0, 0.0, size[0], size[1]);
        app.render(&mut draw_context, viewport);

        draw_context.flush();
        egl.swap_buffers()?;

        surface.commit();

        // Sleep only what is left of this frame's budget
        let sleep = remaining_budget(frame_budget, last_frame.elapsed());
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sleep_accounts_for_work_done() {
        let budget = Duration::from_millis(16);
        assert_eq!(
            remaining_budget(budget, Duration::from_millis(6)),
            Duration::from_millis(10)
        );
        assert_eq!(remaining_budget(budget, Duration::ZERO), budget);
        // An overrun frame does not sleep at all
        assert_eq!(
            remaining_budget(budget, Duration::from_millis(40)),
            Duration::ZERO
        );
    }
}

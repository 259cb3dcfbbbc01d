mod actions;
mod app;
mod asset;
mod config;
mod dom;
mod error;
mod fortune;
mod host;
mod input;
mod render;
mod reveal;
mod session;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use app::{App, Command};
use asset::{AssetLocator, AssetSlot};
use config::AppConfig;
use fortune::FortuneStore;
use host::web::{ImageProbe, TelegramHost};
use host::HostAdapter;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use session::SessionController;
use time::FrameClock;

type WebApp = App<TelegramHost>;

/// Convert page pixel coordinates to a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let rect = dom::grid_bounds()?;
    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

/// RNG seed from `Math.random()` mixed with the page clock.
fn seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (hi << 32) ^ lo ^ dom::now_ms().to_bits()
}

fn run_command(app: &Rc<RefCell<WebApp>>, command: Command<TelegramHost>) {
    match command {
        Command::Share(task) => {
            let app = Rc::clone(app);
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = task.run().await;
                log::info!("share finished: {outcome:?}");
                app.borrow_mut().show_toast(outcome.message());
            });
        }
        Command::Ad(task) => {
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = task.run().await;
                log::debug!("ad finished: {outcome:?}");
            });
        }
    }
}

fn dispatch(app: &Rc<RefCell<WebApp>>, event: InputEvent) {
    let command = app.borrow_mut().handle_input(&event);
    if let Some(command) = command {
        run_command(app, command);
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    console_log::init_with_level(level).ok();

    let config = AppConfig::load_or_default(dom::config_text().as_deref());
    let store = FortuneStore::bundled().map_err(|e| {
        log::error!("cannot start: {e}");
        io::Error::other(e)
    })?;
    log::info!("loaded {} fortunes", store.len());

    let host = HostAdapter::new(TelegramHost::new(&config.audio));
    host.init();

    let mut session = SessionController::new(
        Rc::new(host),
        store,
        SmallRng::seed_from_u64(seed()),
        &config,
    );
    if let Some(url) = dom::page_url() {
        session.set_default_share_link(url);
    }

    // Probe image candidates in the background; the glyph is drawn meanwhile.
    let slot = Rc::new(RefCell::new(AssetSlot::new()));
    {
        let slot = Rc::clone(&slot);
        let candidates: Vec<AssetLocator> = config
            .image_candidates
            .iter()
            .map(|c| AssetLocator::from(c.as_str()))
            .collect();
        wasm_bindgen_futures::spawn_local(async move {
            let handle = asset::resolve(&ImageProbe, &candidates).await;
            slot.borrow_mut().settle(handle);
        });
    }

    let app = Rc::new(RefCell::new(App::new(
        session,
        Rc::clone(&slot),
        config.opening_indicator,
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    dom::on_page_transition("pagehide", {
        let app = Rc::clone(&app);
        move |_| match app.try_borrow_mut() {
            Ok(mut app) => app.session_mut().teardown(),
            Err(_) => log::warn!("app busy during pagehide; skipping teardown"),
        }
    });
    // Back-forward cache restores keep this instance alive.
    dom::on_page_transition("pageshow", {
        let app = Rc::clone(&app);
        move |persisted| {
            if !persisted {
                return;
            }
            match app.try_borrow_mut() {
                Ok(mut app) => {
                    app.session_mut().resume();
                }
                Err(_) => log::warn!("app busy during pageshow; session stays closed"),
            }
        }
    });

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let app = Rc::clone(&app);
        let click_state = Rc::clone(&click_state);
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let action = cs.hit_test(col, row);
            drop(cs);

            if let Some(action) = action {
                dispatch(&app, InputEvent::Click(action));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let app = Rc::clone(&app);
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c.to_ascii_lowercase()),
                KeyCode::Enter => InputEvent::Key('\n'),
                _ => return,
            };
            dispatch(&app, event);
        }
    });

    terminal.draw_web({
        let click_state = Rc::clone(&click_state);
        let clock = RefCell::new(FrameClock::default());
        let overlay = RefCell::new(dom::CookieOverlay::new(slot));
        move |f| {
            let ticks = clock.borrow_mut().update(dom::now_ms());
            app.borrow_mut().tick(ticks);

            let app = app.borrow();
            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            render::render(&app, f, size, &click_state);

            let cs = click_state.borrow();
            overlay.borrow_mut().sync(
                &app.asset_handle(),
                cs.cookie_area,
                cs.terminal_cols,
                cs.terminal_rows,
            );
        }
    });

    Ok(())
}

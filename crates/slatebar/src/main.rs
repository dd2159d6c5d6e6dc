//! slatebar entry point: one layer-shell panel window per monitor.

mod panel;
mod services;
mod styles;

use std::cell::RefCell;
use std::path::PathBuf;

use clap::Parser;
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{info, warn};

use slatebar_core::{Config, ConfigSource, DEFAULT_CONFIG_TOML, logging};

use panel::Panel;
use services::compositor::Rect;
use services::compositor::factory::{self, BackendKind};
use services::config_manager::ConfigManager;
use services::screen::{MonitorGeometry, ScreenService};
use services::windows::WindowService;

#[derive(Parser)]
#[command(
    name = "slatebar",
    version,
    about = "A three-region taskbar panel for wlroots compositors"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the built-in default configuration and exit.
    #[arg(long)]
    print_default_config: bool,
}

thread_local! {
    static PANELS: RefCell<Vec<Panel>> = const { RefCell::new(Vec::new()) };
}

fn main() -> glib::ExitCode {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{DEFAULT_CONFIG_TOML}");
        return glib::ExitCode::SUCCESS;
    }

    logging::init(cli.verbose);

    let (config, source) = match Config::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("slatebar: {e}");
            return glib::ExitCode::FAILURE;
        }
    };
    match &source {
        ConfigSource::File(path) => info!("loaded config from {}", path.display()),
        ConfigSource::Defaults => info!("no config file found, using defaults"),
    }

    let backend_kind = BackendKind::from_str(&config.compositor.backend);
    ConfigManager::global().install(config);

    let backend = factory::create_backend(backend_kind);
    ScreenService::global().init(backend.clone());
    WindowService::global().init(backend);

    let app = gtk4::Application::builder()
        .application_id("io.github.slatebar")
        .build();

    app.connect_startup(|_| load_css());
    app.connect_activate(build_panels);
    app.connect_shutdown(|_| {
        PANELS.with(|panels| {
            for panel in panels.borrow_mut().drain(..) {
                panel.disable();
            }
        });
    });

    // GTK must not see our CLI arguments.
    app.run_with_args::<&str>(&[])
}

fn load_css() {
    let Some(display) = gdk::Display::default() else {
        warn!("no display; skipping stylesheet");
        return;
    };
    let provider = gtk4::CssProvider::new();
    provider.load_from_string(&styles::css(ConfigManager::global().config().panel.height));
    gtk4::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

/// Geometry for a panel's monitor. The compositor's view wins (its
/// indices are the ones window queries report); GDK is the fallback when
/// no backend is reachable.
fn monitor_geometry(monitor: &gdk::Monitor, connector: &str, gdk_index: i32) -> MonitorGeometry {
    ScreenService::global()
        .monitor_for_connector(connector)
        .unwrap_or_else(|| {
            let g = monitor.geometry();
            MonitorGeometry {
                index: gdk_index,
                connector: connector.to_string(),
                rect: Rect {
                    x: g.x(),
                    y: g.y(),
                    width: g.width(),
                    height: g.height(),
                },
            }
        })
}

fn build_panels(app: &gtk4::Application) {
    let Some(display) = gdk::Display::default() else {
        warn!("no display; cannot create panels");
        return;
    };

    let monitors = display.monitors();
    for i in 0..monitors.n_items() {
        let Some(monitor) = monitors
            .item(i)
            .and_then(|obj| obj.downcast::<gdk::Monitor>().ok())
        else {
            continue;
        };
        let connector = monitor
            .connector()
            .map(|c| c.to_string())
            .unwrap_or_default();
        if !ConfigManager::global().monitor_allowed(&connector) {
            info!("skipping monitor {connector} (not in panel.monitors)");
            continue;
        }

        let panel = Panel::new(monitor_geometry(&monitor, &connector, i as i32));

        let window = gtk4::ApplicationWindow::builder()
            .application(app)
            .decorated(false)
            .build();
        window.add_css_class("panel-window");
        window.init_layer_shell();
        window.set_layer(Layer::Top);
        window.set_namespace("slatebar");
        for edge in [Edge::Top, Edge::Left, Edge::Right] {
            window.set_anchor(edge, true);
        }
        window.auto_exclusive_zone_enable();
        window.set_keyboard_mode(KeyboardMode::OnDemand);
        window.set_monitor(&monitor);
        window.set_child(Some(panel.strip()));
        window.present();

        PANELS.with(|panels| panels.borrow_mut().push(panel));
    }
}

use color_eyre::{eyre::eyre, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use retropad::dispatch::{CoreError, EmulationCore, FeedbackStream};
use retropad::input::{KeyAction, LogicalCode, MotionSource, PhysicalInput, VirtualSurface};
use retropad::layout::build_surfaces;
use retropad::router::{lifecycle_window, LoggingFeedback, RouterHandle, RouterParts};
use retropad::RouterSettings;

/// Stand-in core for running the router without an emulator attached
struct LoggingCore;

impl EmulationCore for LoggingCore {
    fn send_key_event(&self, action: KeyAction, code: LogicalCode) -> Result<(), CoreError> {
        info!("Core key {} {:?}", code, action);
        Ok(())
    }

    fn send_motion_event(
        &self,
        source: MotionSource,
        x: f32,
        y: f32,
        port: u32,
    ) -> Result<(), CoreError> {
        debug!("Core motion {:?} ({:.3}, {:.3}) port {}", source, x, y, port);
        Ok(())
    }

    fn set_frame_speed(&self, multiplier: u32) {
        info!("Core frame speed x{}", multiplier);
    }

    fn set_slow_speed(&self, factor: f32) {
        info!("Core slow speed {:.2}", factor);
    }

    fn produce_feedback(&self) -> FeedbackStream {
        stream::pending().boxed()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = setup().await?;

    let (left, right) =
        build_surfaces().map_err(|e| eyre!("Failed to build surface layouts: {}", e))?;
    let left = Arc::new(VirtualSurface::new(left, settings.surface_buffer));
    let right = Arc::new(VirtualSurface::new(right, settings.surface_buffer));
    let physical = Arc::new(PhysicalInput::new(settings.physical_buffer));

    let (lifecycle, window) = lifecycle_window(false);

    #[cfg(feature = "gamepad")]
    let gamepad_token = tokio_util::sync::CancellationToken::new();
    #[cfg(feature = "gamepad")]
    let _gamepad_task =
        retropad::input::gamepad::GamepadCollector::spawn(physical.sender(), gamepad_token.clone());

    let parts = RouterParts {
        left,
        right,
        physical,
        core: Arc::new(LoggingCore),
        lifecycle: window,
        feedback: Box::new(LoggingFeedback::default()),
    };
    let mut router = RouterHandle::spawn(parts, Some(settings.dispatcher.clone()));

    lifecycle.activate();
    info!("Routing input, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    lifecycle.deactivate();
    #[cfg(feature = "gamepad")]
    gamepad_token.cancel();

    let stats = router
        .shutdown()
        .await
        .map_err(|e| eyre!("Input router failed: {}", e))?;
    info!("Shut down after delivering {} events", stats.delivered);
    Ok(())
}

async fn setup() -> Result<RouterSettings> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let path = RouterSettings::default_path()?;
    let settings = RouterSettings::load(&path).await?;
    setup_logging_env(settings.log_level());
    info!("Settings loaded from {}", path.display());
    Ok(settings)
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

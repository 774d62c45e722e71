use colony::config;
use colony::gui::app::AppModel;
use colony::sys::runtime;
use relm4::prelude::*;

fn main() {
    env_logger::init();

    let map = config::load_or_default();
    log::info!(
        "Showing '{}' with {} sectors",
        map.settings.title,
        map.layout.sectors().len()
    );

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx);

    let app = RelmApp::new("org.colony.colony");

    app.run::<AppModel>((map, rx));
}

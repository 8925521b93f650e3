use parley_ratatui::{
    ai::GameAI, app::App, logging, save::TranscriptStore, scenario::Catalog, settings::Settings,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = Settings::load()?;
    logging::init(settings.debug_mode)?;
    log::info!("Using model {}", settings.model);

    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::load_from_file(path)?,
        None => Catalog::builtin()?,
    };
    log::info!("Loaded {} scenarios", catalog.len());

    let mut ai = GameAI::from_settings(&settings);
    let mut key_status = None;
    if let Some(api_key) = settings.api_key() {
        let (checked, status) = ai.verify_key(Settings::validate_api_key(&api_key)).await;
        ai = checked;
        key_status = Some(status);
    }
    let store = TranscriptStore::in_data_dir()
        .inspect_err(|e| log::warn!("Transcripts disabled: {e}"))
        .ok();

    let mut app = App::new(catalog, ai, store);
    if let Some(status) = key_status {
        app.report_key_status(status);
    }
    app.run().await
}

use std::sync::Arc;

use detect_api::adapters::{
    http::{router, state::HttpState},
    image::loader::FsImageLoader,
    onnx::{labels::LabelTable, model_catalog::OnnxModelCatalog, worker::InferenceWorker, yolo_engine::OnnxYoloEngine},
};
use detect_api::application::{ports::ModelCatalogPort, services::DetectionService};
use detect_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let infer = &config.inference;

    // 2. Validar y cargar el modelo una sola vez para todo el proceso
    OnnxModelCatalog::new().validate_model(&infer.model).await?;

    let labels = match &infer.labels_path {
        Some(path) => LabelTable::from_file(path)?,
        None => LabelTable::coco(),
    };

    tracing::info!(
        "🔧 Cargando modelo {} ({}) con umbral {} y {} clases...",
        infer.model.name,
        infer.model.onnx_path,
        infer.params.conf_threshold,
        labels.len()
    );
    let engine = OnnxYoloEngine::load(&infer.model.onnx_path, infer.params.clone())?;

    // 3. Adaptadores e inyección en el caso de uso
    let detector = Arc::new(InferenceWorker::spawn(engine, labels)?);
    let loader = Arc::new(FsImageLoader::new(config.image_root.clone()));
    let detection = Arc::new(DetectionService::new(loader, detector));

    let state = HttpState { detection };
    let app = router(state, config.body_limit);

    // 4. Lanzar el Servidor
    let addr = config.addr();
    tracing::info!("🚀 Servidor de detección iniciado en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Servidor detenido");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("No se pudo escuchar Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

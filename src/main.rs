use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use course_enrollment::{
    AppConfig, CourseCatalog, CustomerDirectory, Email, EnrollmentService, Gender,
    LoggingNotificationGateway, Metrics, PhoneNumber, Stores,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
        )
        .init();

    tracing::info!("🚀 Starting course enrollment service");
    tracing::debug!(?config, "Loaded configuration");

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    if config.metrics_enabled {
        let server_metrics = metrics.clone();
        let port = config.metrics_port;
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(course_enrollment::metrics::start_metrics_server(server_metrics, port)) {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 2. Stores and services ===
    let stores = Stores::in_memory();
    let directory = CustomerDirectory::new(stores.clone());
    let catalog = CourseCatalog::new(stores.clone());
    let enrollment = EnrollmentService::new(
        stores.clone(),
        Arc::new(LoggingNotificationGateway::new()),
        metrics.clone(),
    )
    .with_notification_timeout(config.notification_timeout());

    // === 3. Demonstrate the membership lifecycle ===
    for name in ["Miller", "Doe", "Smith"] {
        directory
            .register_customer("Jane", name, Gender::Female, Some(Email::new(format!("{}@dummy.org", name))), None)
            .await?;
    }
    directory
        .register_customer(
            "Stefan",
            "Sarstedt",
            Gender::Male,
            Some(Email::new("stefan.sarstedt@haw-hamburg.de")),
            Some(PhoneNumber::new("+49-40-428758434")),
        )
        .await?;

    let se1 = catalog.create_course("Software Engineering 1").await?;
    let se1 = enrollment.enroll("Sarstedt", se1).await?;
    let se1 = enrollment.enroll("Doe", se1).await?;
    tracing::info!(course = %se1.name, participants = se1.participant_count(), "Course filled");

    let doe = directory.find_customer_by_last_name("Doe").await?;
    let outcome = enrollment.cancel_membership(Some(doe.id), Some(se1.id)).await?;
    tracing::info!(?outcome, "Doe cancelled");

    let se2 = catalog.create_course("Software Engineering 2").await?;
    enrollment.enroll("Smith", se2).await?;
    let moved = enrollment.transfer_courses("Smith", "Miller").await?;
    tracing::info!(moved, "Smith's courses moved to Miller");

    for course in catalog.list_courses().await? {
        tracing::info!(
            course = %course.name,
            participants = course.participant_count(),
            consistent = course.is_consistent(),
            "📚 Course state"
        );
    }

    if config.metrics_enabled {
        tracing::info!("⏳ Serving metrics, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("🎉 Done");
    Ok(())
}

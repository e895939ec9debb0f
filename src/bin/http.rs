#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use timetable_tool::{AcademicConfig, Catalog, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("TIMETABLE_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let catalog = match std::env::var("TIMETABLE_CATALOG") {
        Ok(path) => Catalog::from_json_file(path)?,
        Err(_) => Catalog::default(),
    };
    let config = match std::env::var("TIMETABLE_CONFIG") {
        Ok(path) => AcademicConfig::from_json_file(path)?,
        Err(_) => AcademicConfig::default(),
    };

    println!("timetable-tool HTTP API listening on http://{addr}");
    http_api::serve(addr, catalog, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}

// Blog Server - HTTP front for the blog store

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_database::{
    app_state::AppState,
    blog_interface::create_blog_router,
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blog_database=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state (store handle, schema, seed)
    let app_state = AppState::new(config.clone()).await?;
    let database = app_state.database.clone();

    let app = create_blog_router(app_state);

    let addr = config.server_address();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            database.close().await;
            return Err(e.into());
        }
    };

    info!("Blog server listening on http://{}", addr);
    println!("📋 Routes:");
    println!("  GET    /                        - Posts and categories");
    println!("  GET    /posts                   - List posts");
    println!("  POST   /posts                   - Create post (title, content, category_id)");
    println!("  GET    /posts/{{id}}              - Post with category and comments");
    println!("  DELETE /posts/{{id}}              - Delete post");
    println!("  GET    /categories              - List categories");
    println!("  POST   /categories              - Create category (name, slug)");
    println!("  GET    /categories/{{id}}/posts   - Posts in category");
    println!("  POST   /comments                - Add comment (post_id, author, content)");
    println!("  POST   /likes                   - Add like (post_id)");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    database.close().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

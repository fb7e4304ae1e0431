//! Souk marketplace entry point.
//!
//! Wires the JSON-file collaborator into the session manager and catalog
//! store, then walks a short smoke-test flow so the binary is useful for
//! manual checks against a data file.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use souk_application::{CatalogStore, LoginOutcome, SessionManager};
use souk_domain::{NewAd, NewUser};
use souk_infrastructure::{JsonFileStore, SystemClock};

const DEFAULT_DATA_PATH: &str = "souk-data.json";

const DEMO_EMAIL: &str = "demo@souk.dev";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    let store = Arc::new(JsonFileStore::open(&path).await?);
    let clock = Arc::new(SystemClock::new());

    let session = SessionManager::new(Arc::clone(&store), Arc::clone(&clock));
    let catalog = CatalogStore::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&clock),
    );

    let watch = session.spawn_expiry_watch(Duration::from_secs(60));

    seed_demo_account(&session).await;

    catalog.load().await?;
    info!(
        ads = catalog.ads().await.len(),
        users = catalog.users().await.len(),
        categories = catalog.categories().await.len(),
        "catalog loaded"
    );

    match session.login(DEMO_EMAIL, DEMO_PASSWORD).await? {
        LoginOutcome::Authenticated(user) => {
            info!(user = %user.name, "signed in");
            if catalog.ads_by_seller(&user.id).await.is_empty() {
                let category = catalog.add_category("General").await?;
                let ad = catalog
                    .create_ad(
                        &user,
                        NewAd {
                            title: "Sample listing".to_string(),
                            description: "Posted by the smoke-test flow.".to_string(),
                            price: 25.0,
                            category_id: category.id,
                        },
                    )
                    .await?;
                info!(ad = %ad.id, "posted first listing");
            }
        }
        LoginOutcome::RequiresTwoFactor => {
            warn!("demo account unexpectedly requires a second factor");
        }
    }

    session.logout(None).await;
    watch.stop();

    info!(path = %path, "done");
    Ok(())
}

/// Registers the demo account on first run. Subsequent runs hit the
/// user-exists error, which is fine.
async fn seed_demo_account(session: &SessionManager<JsonFileStore, SystemClock>) {
    let outcome = session
        .register(NewUser {
            email: DEMO_EMAIL.to_string(),
            name: "Demo Seller".to_string(),
            password: DEMO_PASSWORD.to_string(),
            phone: None,
        })
        .await;
    match outcome {
        Ok(user) => {
            info!(user = %user.id, "registered demo account");
            // Registration signs the account in; the flow below wants a
            // clean login.
            session.logout(None).await;
        }
        Err(err) => info!(reason = err.reason_code(), "demo account not registered"),
    }
}

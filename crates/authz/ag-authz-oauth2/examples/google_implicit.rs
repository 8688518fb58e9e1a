//! Example showing how to drive the implicit grant against Google
//!
//! This example demonstrates:
//! 1. Configuring an adapter for Google's OAuth2 endpoints
//! 2. Building the authorization URL a real app would open in a popup
//! 3. Completing the flow from a captured redirect
//! 4. Spending the token on a protected service call

use ag_authz_oauth2::{
    AuthzError, AuthzResult, Browser, BrowserWindow, InMemoryKeyValueStore, OAuth2Adapter,
    OAuth2Config,
};
use std::sync::Arc;

/// This demo never opens a window; the redirect is fed in by hand below.
struct NoPopupBrowser;

impl Browser for NoPopupBrowser {
    fn open(&self, _url: &str) -> AuthzResult<Box<dyn BrowserWindow>> {
        Err(AuthzError::Window(
            "this demo drives the redirect variant, no popup available".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Google OAuth2 configuration
    let config = OAuth2Config::new(
        std::env::var("GOOGLE_CLIENT_ID")
            .unwrap_or_else(|_| "your-google-client-id.apps.googleusercontent.com".to_string()),
    )
    .with_auth_endpoint("https://accounts.google.com/o/oauth2/auth")
    .with_token_validation_endpoint("https://www.googleapis.com/oauth2/v1/tokeninfo")
    .with_revoke_endpoint("https://accounts.google.com/o/oauth2/revoke")
    .with_redirect_url("http://localhost:8000/redirector.html")
    .with_scopes(
        "https://www.googleapis.com/auth/userinfo.profile \
         https://www.googleapis.com/auth/calendar.readonly",
    )
    .with_prompt("force");

    let store = Arc::new(InMemoryKeyValueStore::new());
    let adapter = OAuth2Adapter::new(config, store, Arc::new(NoPopupBrowser));

    println!("OAuth2 Example - Google Implicit Grant");
    println!("======================================");

    // Step 1: Build the authorization URL
    println!("\n1. Building authorization URL...");

    let (auth_url, state) = adapter.authorization_url().await?;
    println!("Authorization URL: {}", auth_url);
    println!("State: {}", state);
    println!("\nIn a real application, you would:");
    println!("1. Open this URL in a popup or redirect the user to it");
    println!("2. Let the provider send the user back to the redirect URL");
    println!("3. Hand the redirect (fragment included) to validate()");

    // Step 2: Complete the flow from a simulated redirect
    simulate_redirect(&adapter, &state).await;

    Ok(())
}

async fn simulate_redirect(adapter: &OAuth2Adapter, state: &str) {
    println!("\n2. Simulating the provider redirect...");

    // In a real application this arrives in the popup's location; the
    // made-up token below cannot pass Google's introspection, so expect
    // the validation step to reject it.
    let redirect = format!(
        "http://localhost:8000/redirector.html#access_token=simulated_access_token&state={}",
        state
    );

    match adapter.validate(&redirect).await {
        Ok(grant) => {
            println!("✅ Authorization completed!");
            println!("Access token: {}", grant.access_token);

            // Step 3: Spend the token
            println!("\n3. Calling a protected service...");
            match adapter
                .call_service("https://www.googleapis.com/oauth2/v2/userinfo")
                .await
            {
                Ok(payload) => println!("Service payload: {}", payload),
                Err(e) => {
                    println!("Service call failed: {}", e);
                    println!("Note: a failed call reports the authorization URL to retry at");
                }
            }
        }
        Err(e) => {
            println!("Authorization failed: {}", e);
            println!("Note: This is expected in the simulation, the token is made up");
        }
    }
}

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

/// Supabase values the browser client needs. Only the anon key is exposed;
/// the service key never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SupabasePublic {
    url: String,
    anon_key: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PublicConfig {
    supabase: Option<SupabasePublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

pub(super) async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    let supabase = match (&state.config.supabase_url, &state.config.supabase_anon_key) {
        (Some(url), Some(anon_key)) => Some(SupabasePublic {
            url: url.clone(),
            anon_key: anon_key.clone(),
        }),
        _ => None,
    };

    let message = supabase.is_none().then_some("Supabase not configured");
    Json(PublicConfig { supabase, message })
}

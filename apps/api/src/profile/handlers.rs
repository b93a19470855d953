use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::cv::GeneratedCvRow;
use crate::models::user::Profile;
use crate::state::AppState;
use crate::store::{CvListFilter, CvStore};

const RECENT_CVS: i64 = 5;
const MAX_FULL_NAME_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Blank clears the name.
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub profile: Profile,
    pub recent_cvs: Vec<GeneratedCvRow>,
    pub total_cvs: i64,
    pub has_credits: bool,
}

async fn load_profile(store: &dyn CvStore, user_id: Uuid) -> Result<Profile, AppError> {
    store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(load_profile(state.store.as_ref(), user.id).await?))
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let full_name = req
        .full_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    if full_name
        .as_ref()
        .is_some_and(|name| name.chars().count() > MAX_FULL_NAME_CHARS)
    {
        return Err(AppError::Validation(format!(
            "full_name is limited to {MAX_FULL_NAME_CHARS} characters"
        )));
    }

    let profile = state
        .store
        .update_profile_name(user.id, full_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let store = state.store.as_ref();
    let profile = load_profile(store, user.id).await?;

    let recent = CvListFilter {
        limit: Some(RECENT_CVS),
        ..Default::default()
    };
    let recent_cvs = store.list_cvs(user.id, &recent).await?;
    let total_cvs = store.count_cvs(user.id).await?;
    let has_credits = profile.has_credits();

    Ok(Json(DashboardResponse {
        profile,
        recent_cvs,
        total_cvs,
        has_credits,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::fake::FakeGenerator;
    use crate::models::cv::CvStatus;
    use crate::models::user::SubscriptionTier;
    use crate::store::memory::MemoryCvStore;

    fn setup(tier: SubscriptionTier, credits: i32) -> (Arc<MemoryCvStore>, AppState, AuthUser) {
        let store = Arc::new(MemoryCvStore::new());
        let id = store.add_profile(tier, credits);
        let state = AppState::for_tests(store.clone(), Arc::new(FakeGenerator::with_text("{}")));
        (store, state, AuthUser { id })
    }

    #[tokio::test]
    async fn test_update_trims_and_clears_name() {
        let (_, state, user) = setup(SubscriptionTier::Free, 1);

        let req = UpdateProfileRequest {
            full_name: Some("  Ada Lovelace ".into()),
        };
        let Json(profile) = handle_update_profile(State(state.clone()), user.clone(), AppJson(req))
            .await
            .unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));

        let req = UpdateProfileRequest {
            full_name: Some("   ".into()),
        };
        let Json(profile) = handle_update_profile(State(state.clone()), user.clone(), AppJson(req))
            .await
            .unwrap();
        assert_eq!(profile.full_name, None);

        let Json(profile) = handle_get_profile(State(state), user).await.unwrap();
        assert_eq!(profile.full_name, None);
    }

    #[tokio::test]
    async fn test_update_rejects_overlong_name() {
        let (store, state, user) = setup(SubscriptionTier::Free, 1);
        let req = UpdateProfileRequest {
            full_name: Some("x".repeat(MAX_FULL_NAME_CHARS + 1)),
        };

        let err = handle_update_profile(State(state), user, AppJson(req)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let store = Arc::new(MemoryCvStore::new());
        let state = AppState::for_tests(store, Arc::new(FakeGenerator::with_text("{}")));
        let user = AuthUser { id: Uuid::new_v4() };

        let err = handle_dashboard(State(state), user).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dashboard_shows_five_newest_and_total() {
        let (store, state, user) = setup(SubscriptionTier::Free, 0);
        let ids: Vec<Uuid> = (0..7)
            .map(|i| {
                let title = format!("Role {i}");
                store.add_cv(user.id, CvStatus::Completed, Some(&title), None)
            })
            .collect();

        let Json(dashboard) = handle_dashboard(State(state), user).await.unwrap();

        assert_eq!(dashboard.total_cvs, 7);
        assert_eq!(
            dashboard.recent_cvs.iter().map(|cv| cv.id).collect::<Vec<_>>(),
            ids.iter().rev().take(5).copied().collect::<Vec<_>>()
        );
        assert!(!dashboard.has_credits);
    }

    #[tokio::test]
    async fn test_paid_tier_always_has_credits() {
        let (_, state, user) = setup(SubscriptionTier::Paid, 0);

        let Json(dashboard) = handle_dashboard(State(state), user).await.unwrap();

        assert!(dashboard.has_credits);
        assert!(dashboard.recent_cvs.is_empty());
    }

    #[test]
    fn test_dashboard_wire_names() {
        let profile = Profile {
            id: Uuid::nil(),
            email: "a@example.com".into(),
            full_name: None,
            subscription_tier: SubscriptionTier::Free,
            credits_remaining: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let body = serde_json::to_value(DashboardResponse {
            profile,
            recent_cvs: vec![],
            total_cvs: 0,
            has_credits: true,
        })
        .unwrap();

        assert_eq!(body["hasCredits"], true);
        assert_eq!(body["totalCvs"], 0);
        assert!(body["recentCvs"].is_array());
    }
}

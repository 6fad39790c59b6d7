//! Profile routes
//!
//! - GET    /api/profile/me                      (auth) current profile
//! - POST   /api/profile                         (auth) upsert profile fields
//! - GET    /api/profile/all-profiles            list all profiles
//! - GET    /api/profile/user/:user_id           one profile
//! - DELETE /api/profile/delete-account          (auth) delete profile + identity
//! - PUT    /api/profile/experience              (auth) prepend experience
//! - PUT    /api/profile/education               (auth) prepend education
//! - DELETE /api/profile/delete-experience/:id   (auth)
//! - DELETE /api/profile/delete-education/:id    (auth)
//! - GET    /api/profile/github-repos/:username  proxy to GitHub

use bson::{doc, oid::ObjectId};
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{authenticate, AuthUser};
use crate::db::schemas::{
    Education, Experience, ProfileDoc, SocialLinks, UserDoc, PROFILE_COLLECTION, USER_COLLECTION,
};
use crate::routes::validation::Validator;
use crate::routes::{
    json_response, method_not_allowed, normalize_path, not_found_response, parse_json_body,
    respond, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::ApiError;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProfileUpsertRequest {
    #[serde(default)]
    pub status: String,
    /// Comma-separated skill list, stored split and trimmed
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub fieldofstudy: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExperienceView {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EducationView {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<ExperienceView>,
    pub education: Vec<EducationView>,
}

impl ProfileView {
    pub fn from_doc(doc: &ProfileDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            user: doc.user.to_hex(),
            company: doc.company.clone(),
            website: doc.website.clone(),
            location: doc.location.clone(),
            bio: doc.bio.clone(),
            status: doc.status.clone(),
            skills: doc.skills.clone(),
            social: doc.social.clone(),
            experience: doc
                .experience
                .iter()
                .map(|e| ExperienceView {
                    id: e.id.to_hex(),
                    title: e.title.clone(),
                    company: e.company.clone(),
                    location: e.location.clone(),
                    from: e.from.clone(),
                    to: e.to.clone(),
                    current: e.current,
                    description: e.description.clone(),
                })
                .collect(),
            education: doc
                .education
                .iter()
                .map(|e| EducationView {
                    id: e.id.to_hex(),
                    school: e.school.clone(),
                    degree: e.degree.clone(),
                    fieldofstudy: e.fieldofstudy.clone(),
                    from: e.from.clone(),
                    to: e.to.clone(),
                    current: e.current,
                    description: e.description.clone(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Route /api/profile requests
pub async fn handle_profile_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = normalize_path(req.uri().path()).to_string();
    let method = req.method().clone();

    let result = match (&method, path.as_str()) {
        (&Method::POST, "/api/profile") => handle_upsert(req, state).await,
        (&Method::GET, "/api/profile/me") => handle_me(req, state).await,
        (&Method::GET, "/api/profile/all-profiles") => handle_all_profiles(state).await,
        (&Method::DELETE, "/api/profile/delete-account") => {
            handle_delete_account(req, state).await
        }
        (&Method::PUT, "/api/profile/experience") => handle_add_experience(req, state).await,
        (&Method::PUT, "/api/profile/education") => handle_add_education(req, state).await,
        (_, "/api/profile")
        | (_, "/api/profile/me")
        | (_, "/api/profile/all-profiles")
        | (_, "/api/profile/delete-account")
        | (_, "/api/profile/experience")
        | (_, "/api/profile/education") => return method_not_allowed(),
        _ => {
            if let Some(user_id) = path.strip_prefix("/api/profile/user/") {
                if method != Method::GET {
                    return method_not_allowed();
                }
                let user_id = user_id.to_string();
                handle_by_user(state, &user_id).await
            } else if let Some(entry_id) = path.strip_prefix("/api/profile/delete-experience/") {
                if method != Method::DELETE {
                    return method_not_allowed();
                }
                let entry_id = entry_id.to_string();
                handle_delete_experience(req, state, &entry_id).await
            } else if let Some(entry_id) = path.strip_prefix("/api/profile/delete-education/") {
                if method != Method::DELETE {
                    return method_not_allowed();
                }
                let entry_id = entry_id.to_string();
                handle_delete_education(req, state, &entry_id).await
            } else if let Some(username) = path.strip_prefix("/api/profile/github-repos/") {
                if method != Method::GET {
                    return method_not_allowed();
                }
                let username = username.to_string();
                handle_github_repos(state, &username).await
            } else {
                return not_found_response(&path);
            }
        }
    };

    respond(result)
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/profile/me
async fn handle_me(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;
    let profile = profiles
        .find_one(doc! { "user": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("There is not profile for this user".into()))?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// POST /api/profile
///
/// Creates or updates the caller's profile. Experience and education entries
/// are untouched by the upsert; only the scalar fields and social links are
/// replaced. Read-modify-write, last save wins.
async fn handle_upsert(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let body: ProfileUpsertRequest = parse_json_body(req).await?;

    Validator::new()
        .require("status", &body.status, "Status is required")
        .require("skills", &body.skills, "Skills is required")
        .finish()?;

    let skills: Vec<String> = body
        .skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;

    let mut profile = profiles
        .find_one(doc! { "user": auth.user_id })
        .await?
        .unwrap_or_else(|| ProfileDoc::new(auth.user_id, String::new(), Vec::new()));

    profile.status = body.status;
    profile.skills = skills;
    profile.company = non_empty(body.company);
    profile.website = non_empty(body.website);
    profile.location = non_empty(body.location);
    profile.bio = non_empty(body.bio);
    profile.social = SocialLinks {
        youtube: non_empty(body.youtube),
        facebook: non_empty(body.facebook),
        twitter: non_empty(body.twitter),
        instagram: non_empty(body.instagram),
        linkedin: non_empty(body.linkedin),
    };

    profiles
        .save(doc! { "user": auth.user_id }, profile, true)
        .await?;

    // Re-fetch so a fresh upsert carries its assigned id
    let saved = profiles
        .find_one(doc! { "user": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::Internal("Profile missing after upsert".into()))?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&saved)))
}

/// GET /api/profile/all-profiles
async fn handle_all_profiles(state: Arc<AppState>) -> Result<Response<BoxBody>, ApiError> {
    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;
    let all = profiles.find_many(doc! {}, None).await?;

    let views: Vec<ProfileView> = all.iter().map(ProfileView::from_doc).collect();
    Ok(json_response(StatusCode::OK, &views))
}

/// GET /api/profile/user/:user_id
async fn handle_by_user(
    state: Arc<AppState>,
    user_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    // An unparseable id is the same miss as an unknown one
    let user_id = ObjectId::parse_str(user_id)
        .map_err(|_| ApiError::NotFound("Profile not found".into()))?;

    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;
    let profile = profiles
        .find_one(doc! { "user": user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// DELETE /api/profile/delete-account
///
/// Removes the caller's profile and identity as two independent deletes.
/// No rollback: if the identity delete fails the profile is already gone
/// and the client sees a server fault.
async fn handle_delete_account(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;
    profiles.delete_one(doc! { "user": auth.user_id }).await?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    users.delete_one(doc! { "_id": auth.user_id }).await?;

    Ok(json_response(
        StatusCode::OK,
        &MessageResponse::new("User deleted"),
    ))
}

/// PUT /api/profile/experience
async fn handle_add_experience(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let body: ExperienceRequest = parse_json_body(req).await?;

    Validator::new()
        .require("title", &body.title, "Title is required")
        .require("company", &body.company, "Company is required")
        .require("from", &body.from, "From date is required")
        .finish()?;

    let entry = Experience {
        id: ObjectId::new(),
        title: body.title,
        company: body.company,
        location: non_empty(body.location),
        from: body.from,
        to: non_empty(body.to),
        current: body.current,
        description: non_empty(body.description),
    };

    let profile = mutate_own_profile(&state, &auth, move |profile| {
        profile.add_experience(entry);
        Ok(())
    })
    .await?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// PUT /api/profile/education
async fn handle_add_education(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let body: EducationRequest = parse_json_body(req).await?;

    Validator::new()
        .require("school", &body.school, "School is required")
        .require("degree", &body.degree, "Degree is required")
        .require("fieldofstudy", &body.fieldofstudy, "Field of study is required")
        .require("from", &body.from, "From date is required")
        .finish()?;

    let entry = Education {
        id: ObjectId::new(),
        school: body.school,
        degree: body.degree,
        fieldofstudy: body.fieldofstudy,
        from: body.from,
        to: non_empty(body.to),
        current: body.current,
        description: non_empty(body.description),
    };

    let profile = mutate_own_profile(&state, &auth, move |profile| {
        profile.add_education(entry);
        Ok(())
    })
    .await?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// DELETE /api/profile/delete-experience/:id
async fn handle_delete_experience(
    req: Request<Incoming>,
    state: Arc<AppState>,
    entry_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let entry_id = ObjectId::parse_str(entry_id)
        .map_err(|_| ApiError::NotFound("Experience not found".into()))?;

    let profile = mutate_own_profile(&state, &auth, move |profile| {
        profile.remove_experience(&entry_id)
    })
    .await?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// DELETE /api/profile/delete-education/:id
async fn handle_delete_education(
    req: Request<Incoming>,
    state: Arc<AppState>,
    entry_id: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;
    let entry_id = ObjectId::parse_str(entry_id)
        .map_err(|_| ApiError::NotFound("Education not found".into()))?;

    let profile = mutate_own_profile(&state, &auth, move |profile| {
        profile.remove_education(&entry_id)
    })
    .await?;

    Ok(json_response(StatusCode::OK, &ProfileView::from_doc(&profile)))
}

/// GET /api/profile/github-repos/:username
async fn handle_github_repos(
    state: Arc<AppState>,
    username: &str,
) -> Result<Response<BoxBody>, ApiError> {
    let repos = state.github.repos(username).await?;
    Ok(json_response(StatusCode::OK, &repos))
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch the caller's profile, apply a mutation, save it back.
///
/// The profile is keyed by the authenticated identity, so ownership holds by
/// construction. Read-modify-write; concurrent mutations of the same profile
/// race and the later save wins.
async fn mutate_own_profile<F>(
    state: &AppState,
    auth: &AuthUser,
    mutate: F,
) -> Result<ProfileDoc, ApiError>
where
    F: FnOnce(&mut ProfileDoc) -> Result<(), ApiError>,
{
    let profiles = state
        .mongo
        .collection::<ProfileDoc>(PROFILE_COLLECTION)
        .await?;

    let mut profile = profiles
        .find_one(doc! { "user": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    mutate(&mut profile)?;

    profiles
        .save(doc! { "user": auth.user_id }, profile.clone(), false)
        .await?;

    Ok(profile)
}

/// Drop empty or whitespace-only optional fields
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

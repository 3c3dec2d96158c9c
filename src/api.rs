use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::context::SessionContext;
use crate::database::RecordStore;
use crate::error::{ProgressError, Result};
use crate::gamification::{
    avatar_gallery_for, build_profile, progression_for, select_avatar, update_profile, ProfileUpdate,
};
use crate::units::{create_unit, NewUnit};

pub type SharedStore = RwLock<Box<dyn RecordStore>>;

#[derive(Deserialize)]
pub struct SelectAvatarRequest {
    pub avatar_id: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn poisoned() -> ProgressError {
    ProgressError::Store("record store lock poisoned".to_string())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_profile(user_id: web::Path<String>, store: web::Data<SharedStore>) -> Result<HttpResponse> {
    let ctx = SessionContext::new(user_id.into_inner());
    let store = store.read().map_err(|_| poisoned())?;
    let view = build_profile(&ctx, &**store)?;
    Ok(HttpResponse::Ok().json(view))
}

async fn put_profile(
    user_id: web::Path<String>,
    req: web::Json<ProfileUpdate>,
    store: web::Data<SharedStore>,
) -> Result<HttpResponse> {
    let ctx = SessionContext::new(user_id.into_inner());
    let mut store = store.write().map_err(|_| poisoned())?;
    let user = update_profile(&ctx, &mut **store, req.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}

async fn get_progression(user_id: web::Path<String>, store: web::Data<SharedStore>) -> Result<HttpResponse> {
    let ctx = SessionContext::new(user_id.into_inner());
    let store = store.read().map_err(|_| poisoned())?;
    let state = progression_for(&ctx, &**store)?;
    Ok(HttpResponse::Ok().json(state))
}

async fn get_avatars(user_id: web::Path<String>, store: web::Data<SharedStore>) -> Result<HttpResponse> {
    let ctx = SessionContext::new(user_id.into_inner());
    let store = store.read().map_err(|_| poisoned())?;
    let gallery = avatar_gallery_for(&ctx, &**store)?;
    Ok(HttpResponse::Ok().json(gallery))
}

async fn post_avatar(
    user_id: web::Path<String>,
    req: web::Json<SelectAvatarRequest>,
    store: web::Data<SharedStore>,
) -> Result<HttpResponse> {
    let ctx = SessionContext::new(user_id.into_inner());
    let mut store = store.write().map_err(|_| poisoned())?;
    let selection = select_avatar(&ctx, &mut **store, &req.avatar_id)?;
    Ok(HttpResponse::Ok().json(selection))
}

async fn post_unit(
    course_id: web::Path<String>,
    req: web::Json<NewUnit>,
    store: web::Data<SharedStore>,
) -> Result<HttpResponse> {
    let mut store = store.write().map_err(|_| poisoned())?;
    let unit = create_unit(&mut **store, &course_id, req.into_inner())?;
    Ok(HttpResponse::Created().json(unit))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/profile/{user_id}", web::get().to(get_profile))
        .route("/profile/{user_id}", web::put().to(put_profile))
        .route("/profile/{user_id}/progression", web::get().to(get_progression))
        .route("/profile/{user_id}/avatars", web::get().to(get_avatars))
        .route("/profile/{user_id}/avatar", web::post().to(post_avatar))
        .route("/courses/{course_id}/units", web::post().to(post_unit));
}

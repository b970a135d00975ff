use actix_web::{
    delete, error, get,
    http::header::ContentType,
    post, put,
    web::{self, Data, Json, Path},
    HttpRequest, HttpResponse, Responder,
};

use crate::{
    error::{error_body, PhonebookError},
    service::{NewPersonRequest, PhonebookService, UpdatePersonRequest},
};

#[get("/api/persons")]
async fn list_persons(service: Data<PhonebookService>) -> Result<impl Responder, PhonebookError> {
    Ok(Json(service.list().await?))
}

#[post("/api/persons")]
async fn create_person(
    service: Data<PhonebookService>,
    body: Json<NewPersonRequest>,
) -> Result<impl Responder, PhonebookError> {
    Ok(Json(service.create(body.into_inner()).await?))
}

#[get("/api/persons/{id}")]
async fn get_person(
    service: Data<PhonebookService>,
    id: Path<String>,
) -> Result<impl Responder, PhonebookError> {
    Ok(Json(service.get_by_id(&id).await?))
}

#[put("/api/persons/{id}")]
async fn update_person(
    service: Data<PhonebookService>,
    id: Path<String>,
    body: Json<UpdatePersonRequest>,
) -> Result<impl Responder, PhonebookError> {
    Ok(Json(service.update(&id, body.into_inner()).await?))
}

#[delete("/api/persons/{id}")]
async fn delete_person(
    service: Data<PhonebookService>,
    id: Path<String>,
) -> Result<HttpResponse, PhonebookError> {
    service.delete(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Summary page
#[get("/info")]
async fn info(service: Data<PhonebookService>) -> Result<HttpResponse, PhonebookError> {
    let info = service.info().await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(info.render_html()))
}

async fn unknown_endpoint() -> HttpResponse {
    HttpResponse::NotFound().json(error_body("unknown endpoint"))
}

// Unreadable bodies are answered in the same shape as every other error
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    log::warn!("Rejected request body: {}", err);

    let response = HttpResponse::BadRequest().json(error_body(err.to_string()));

    error::InternalError::from_response(err, response).into()
}

/// Registers every phonebook route, the service must already be in the app data
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(list_persons)
        .service(create_person)
        .service(get_person)
        .service(update_person)
        .service(delete_person)
        .service(info)
        .default_service(web::to(unknown_endpoint));
}

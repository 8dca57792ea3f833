use actix_web::{get, web, HttpResponse};

use crate::{
    api::error,
    modules::media::{model::MediaFolder, repository_fs::LocalBlobStore},
};

#[get("/{folder}/{file}")]
pub async fn serve_upload(
    store: web::Data<LocalBlobStore>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, error::Error> {
    let (folder, file) = path.into_inner();
    let folder: MediaFolder = folder.parse()?;

    let bytes = store.read(folder, &file).await?;
    let mime = mime_guess::from_path(&file).first_or_octet_stream();

    Ok(HttpResponse::Ok()
        .content_type(mime.to_string())
        .insert_header(("cache-control", "public, max-age=3600"))
        .body(bytes))
}

//! Static page handlers.

use actix_files::NamedFile;
use actix_web::{get, web};
use tracing::error;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::StaticRoot;

/// Serve the web client's entry page.
#[get("/")]
pub async fn index(root: web::Data<StaticRoot>) -> ApiResult<NamedFile> {
    let path = root.index_file();
    NamedFile::open_async(&path).await.map_err(|err| {
        error!(path = %path.display(), error = %err, "failed to open index page");
        Error::internal(format!("failed to open {}: {err}", path.display()))
    })
}

//! Helpers to push local files to a small app.
//!
//! Each helper issues exactly one request through the requester's
//! dispatcher, on a fixed route relative to its base. Only the requester's
//! credentials are forwarded; the rest of its option bag is left out.

use std::fs;
use std::path::Path;

use exn::ResultExt;
use serde_json::json;
use toucan_dispatch::{FilePart, RequestOptions, Response};
use toucan_route::Verb;
use tracing::info;

use crate::error::{ErrorKind, Result};
use crate::requester::SmallAppRequester;

const CSON: &str = "format=cson";

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn send(
    requester: &SmallAppRequester,
    verb: Verb,
    route: &str,
    query: &[&str],
    build: impl FnOnce(RequestOptions) -> RequestOptions,
) -> Result<Response> {
    let url = requester.relative(route, query);
    let options = build(requester.options().auth_only());
    info!(verb = %verb, url = %url, "Uploading");
    requester.dispatcher().dispatch(verb, &url, &options).or_raise(|| ErrorKind::Dispatch)
}

/// `PUT <route>?format=cson` with the raw file content as body.
pub fn upload_config_file(requester: &SmallAppRequester, path: impl AsRef<Path>, route: &str) -> Result<Response> {
    let content = read(path.as_ref())?;
    send(requester, Verb::Put, route, &[CSON], |options| options.with_body(content))
}

pub fn upload_front_config(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_config_file(requester, path, "config")
}

pub fn upload_etl_config(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_config_file(requester, path, "config/etl")
}

pub fn upload_preprocess_validation(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_config_file(requester, path, "config/preprocess_validation")
}

/// `PUT <route>` with the module as the multipart `file` part, reported to
/// the back end as `file_name` whatever the local name is.
pub fn upload_python_module(
    requester: &SmallAppRequester,
    path: impl AsRef<Path>,
    route: &str,
    file_name: &str,
) -> Result<Response> {
    let content = read(path.as_ref())?;
    send(requester, Verb::Put, route, &[], |options| options.with_file(FilePart::new("file", file_name, content)))
}

pub fn upload_augment_py(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_python_module(requester, path, "config/augment", "augment.py")
}

pub fn upload_permissions_py(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_python_module(requester, path, "config/permissions", "permissions.py")
}

pub fn upload_notifications_handler(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    upload_python_module(requester, path, "config/notifications_handlers", "notifications_handler.py")
}

/// `POST data/sources` with the file as the multipart `file` part and a
/// `data` field naming it.
pub fn upload_data_source(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    let path = path.as_ref();
    let content = read(path)?;
    let name = file_name(path);
    let data = json!({ "filename": name }).to_string();
    send(requester, Verb::Post, "data/sources", &[], |options| {
        options.with_file(FilePart::new("file", name, content)).with_form("data", data)
    })
}

/// `PUT templates/<type>/<name>?format=cson`, where the type is the name of
/// the directory holding the template and the name is the file name without
/// its `.cson` extension.
pub fn upload_template(requester: &SmallAppRequester, path: impl AsRef<Path>) -> Result<Response> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    let template_type = path.parent().map(file_name).unwrap_or_default();
    let full_name = file_name(path);
    let name = full_name.strip_suffix(".cson").unwrap_or(&full_name);
    let route = format!("templates/{template_type}/{name}");
    let body = json!({ "content": content, "type": template_type, "name": name });
    send(requester, Verb::Put, &route, &[CSON], |options| options.with_json(body))
}

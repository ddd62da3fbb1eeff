//! One `impl ApiClient` block per area of the contract.

mod auth;
mod clinical;
mod documents;
mod doctor;
mod medications;
mod org;
mod portal;

pub use documents::DOCUMENT_TOKEN_HEADER;

pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

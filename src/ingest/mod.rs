// Ingestion: turning captured platform payloads into Post records.
//
// Note cards are the per-post objects the platform's feed API returns. They
// reach us two ways: inside HAR captures (batch runs) and inside the
// browser extension's /analyze requests.

pub mod har;
pub mod note_card;

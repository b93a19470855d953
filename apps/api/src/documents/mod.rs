// Source document upload: object storage plus a `documents` row.

pub mod extract;
pub mod handlers;
pub mod storage;

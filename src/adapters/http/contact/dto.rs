//! Response envelope for contact search.

use serde::{Deserialize, Serialize};

use crate::application::models::ContactResponse;
use crate::domain::foundation::PageMetadata;

/// `{"data": [...], "paging": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPageResponse {
    pub data: Vec<ContactResponse>,
    pub paging: PageMetadata,
}

use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Liveness {
    pub ok: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Readiness {
    pub fn ready() -> Self {
        Self { ready: true, reason: None }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self { ready: false, reason: Some(reason.into()) }
    }
}

/// Query string of `GET /v1/claims/status/{claim_status}`.
#[derive(Deserialize, Debug)]
pub struct ListClaimsParams {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

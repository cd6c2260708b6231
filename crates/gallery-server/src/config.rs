use std::env;

use crate::error::ServiceError;

const SERVICE_ACCOUNT_VAR: &str = "GALLERY_SERVICE_ACCOUNT";
const PRIVATE_KEY_VAR: &str = "GALLERY_PRIVATE_KEY_PEM";
const PRIVATE_KEY_FILE_VAR: &str = "GALLERY_PRIVATE_KEY_FILE";
const FOLDER_ID_VAR: &str = "GALLERY_FOLDER_ID";

/// Deployment configuration, read once at startup. Absence of any value is a
/// hard configuration error: the service refuses to start rather than limp
/// along and fail on the first request.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service-account identity (the `iss` of the signed assertion).
    pub service_account: String,
    /// RSA private key in PEM form.
    pub private_key_pem: String,
    /// Folder whose image files the service lists.
    pub folder_id: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        let service_account = required(SERVICE_ACCOUNT_VAR)?;
        let folder_id = required(FOLDER_ID_VAR)?;
        let private_key_pem = match env::var(PRIVATE_KEY_VAR) {
            Ok(pem) if !pem.trim().is_empty() => pem,
            _ => {
                let path = required(PRIVATE_KEY_FILE_VAR).map_err(|_| {
                    ServiceError::Config(format!(
                        "set {PRIVATE_KEY_VAR} or {PRIVATE_KEY_FILE_VAR}"
                    ))
                })?;
                std::fs::read_to_string(&path).map_err(|err| {
                    ServiceError::Config(format!("reading private key from {path}: {err}"))
                })?
            }
        };
        Ok(Self {
            service_account,
            private_key_pem,
            folder_id,
        })
    }
}

fn required(name: &'static str) -> Result<String, ServiceError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ServiceError::Config(format!(
            "missing required environment variable {name}"
        ))),
    }
}

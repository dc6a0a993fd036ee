use std::collections::BTreeMap;

use dashboard_core::{Service, Target};
use url::Url;

use crate::{ApiError, FailureKind};

/// A named logical endpoint: a service plus a path below its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub service: Service,
    pub path: String,
}

impl Endpoint {
    pub fn new(service: Service, path: impl Into<String>) -> Self {
        Self {
            service,
            path: path.into(),
        }
    }

    /// Endpoint with one trailing path parameter, percent-encoded as a single segment.
    pub fn with_param(service: Service, prefix: &str, param: &str) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(param.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        Self::new(
            service,
            format!("{}/{}", prefix.trim_end_matches('/'), encoded),
        )
    }

    pub fn for_target(target: Target) -> Self {
        Self::new(target.service(), target.path())
    }
}

/// Base URL per backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    bases: BTreeMap<Service, Url>,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service base URL; a trailing slash is implied.
    pub fn with_base(mut self, service: Service, base: &str) -> Result<Self, ApiError> {
        let mut url = Url::parse(base)
            .map_err(|err| ApiError::new(FailureKind::UnknownEndpoint, format!("{base}: {err}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.bases.insert(service, url);
        Ok(self)
    }

    pub fn base(&self, service: Service) -> Option<&Url> {
        self.bases.get(&service)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, &Url)> {
        self.bases.iter().map(|(service, url)| (*service, url))
    }

    pub fn resolve(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        let base = self.bases.get(&endpoint.service).ok_or_else(|| {
            ApiError::new(
                FailureKind::UnknownEndpoint,
                format!("no base url for {} service", endpoint.service),
            )
        })?;
        let relative = endpoint.path.trim_start_matches('/');
        base.join(relative).map_err(|err| {
            ApiError::new(
                FailureKind::UnknownEndpoint,
                format!("{}{}: {err}", base, endpoint.path),
            )
        })
    }
}

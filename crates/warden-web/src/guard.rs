//! `BanGuard` bindings

use js_sys::Promise;
use serde::Serialize;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use warden_ban::{Admission, BanService};
use warden_core::{OriginLookup, WardenConfig};
use warden_effects::browser::{browser_channels, BrowserEnvironment, BrowserSession, DomSurface};
use warden_effects::{DisabledOriginLookup, HttpOriginLookup, RestDatabase, SystemClock};

use crate::error::{WebError, WebResult};

/// Ban checks bound to the current page
#[wasm_bindgen]
pub struct BanGuard {
    service: BanService,
}

#[wasm_bindgen]
impl BanGuard {
    /// Build a guard from an optional configuration object; missing
    /// fields take their defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BanGuard, JsValue> {
        Ok(Self::from_config(read_config(config)?)?)
    }

    /// Resolve to the ban record for this visitor, or `null`
    #[wasm_bindgen(js_name = checkBan)]
    pub fn check_ban(&self) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let record = service.check_ban().await;
            Ok(to_js(&record)?)
        })
    }

    /// Resolve to `true` after showing the block screen if banned
    #[wasm_bindgen(js_name = enforceBan)]
    pub fn enforce_ban(&self) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(service.enforce_ban().await)) })
    }

    /// Check and enforce; await before revealing the page body
    #[wasm_bindgen(js_name = guardPage)]
    pub fn guard_page(&self) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let verdict = service.guard_page().await;
            Ok(JsValue::from_bool(verdict.is_banned()))
        })
    }

    /// Ban `username` by its recorded signals; resolves to the record
    #[wasm_bindgen(js_name = banUser)]
    pub fn ban_user(&self, username: String, reason: String) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let record = service
                .ban_user(&username, &reason)
                .await
                .map_err(WebError::from)?;
            Ok(to_js(&record)?)
        })
    }

    /// Screen a new account; resolves to `{ allowed, reason? }`
    #[wasm_bindgen(js_name = admitSignup)]
    pub fn admit_signup(&self, username: String) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let admission = service
                .gate()
                .admit_signup(&username)
                .await
                .map_err(WebError::from)?;
            Ok(to_js(&AdmissionView::from(admission))?)
        })
    }

    /// Screen a sign-in; resolves to `{ allowed, reason? }`
    #[wasm_bindgen(js_name = admitLogin)]
    pub fn admit_login(&self, username: String) -> Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let admission = service
                .gate()
                .admit_login(&username)
                .await
                .map_err(WebError::from)?;
            Ok(to_js(&AdmissionView::from(admission))?)
        })
    }
}

impl BanGuard {
    /// Wire browser handlers according to `config`
    pub fn from_config(config: WardenConfig) -> WebResult<Self> {
        config.validate()?;
        let origin: Arc<dyn OriginLookup> = if config.origin_lookup_enabled() {
            Arc::new(HttpOriginLookup::from_config(&config)?)
        } else {
            Arc::new(DisabledOriginLookup)
        };
        let service = BanService::builder()
            .channels(browser_channels(&config.channels))
            .database(Arc::new(RestDatabase::from_config(&config)?))
            .origin(origin)
            .environment(Arc::new(BrowserEnvironment))
            .session(Arc::new(BrowserSession::new(&config.channels.session_key)))
            .surface(Arc::new(DomSurface))
            .clock(Arc::new(SystemClock))
            .config(config)
            .build()?;
        Ok(Self { service })
    }
}

#[derive(Serialize)]
struct AdmissionView {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl From<Admission> for AdmissionView {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Allowed => Self {
                allowed: true,
                reason: None,
                source: None,
            },
            Admission::Denied { reason, source } => Self {
                allowed: false,
                reason: Some(reason),
                source: Some(source.to_string()),
            },
        }
    }
}

fn read_config(value: JsValue) -> WebResult<WardenConfig> {
    if value.is_undefined() || value.is_null() {
        return Ok(WardenConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| WebError::Config(e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> WebResult<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

//! Delivery target resolution. Pure computation: given job details and the
//! configured templates, decide where (and whether) a payload can be sent.

use crate::domain::types::DeliveryMode;
use crate::error::DeliveryServiceError;

/// Configured defaults the resolver renders templates against.
#[derive(Debug, Clone, Default)]
pub struct DeliveryTargets {
    /// Base URL template with a `{slug}` placeholder, e.g.
    /// `https://{slug}.example.com`.
    pub base_url_template: Option<String>,
    /// Namespace substituted into the target path template.
    pub namespace: Option<String>,
    /// Target path template with a `{namespace}` placeholder.
    pub path_template: String,
    /// Prefill for `zapier` mode deliveries.
    pub zapier_webhook_url: Option<String>,
    /// Domain the delivered site is probed under, e.g. `example-sites.com`.
    pub preview_base_domain: Option<String>,
    /// Optional subdomain segment between the slug and the base domain.
    pub preview_namespace: Option<String>,
}

/// Job-level inputs to resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveInput<'a> {
    pub client_name: &'a str,
    /// Job-supplied base URL; overrides the template when present.
    pub base_url: Option<&'a str>,
    /// Job-specific namespace override for the target path.
    pub namespace: Option<&'a str>,
}

/// Outcome of resolution. `AwaitingUrl` means dispatch must not proceed
/// until a delivery URL is supplied through the admin boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Url(String),
    AwaitingUrl,
}

/// Lowercase, collapse runs of non-alphanumerics to `-`, trim dashes.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

fn clean(value: &str) -> &str {
    value.trim()
}

fn resolve_base_url(
    input: ResolveInput<'_>,
    targets: &DeliveryTargets,
) -> Result<String, DeliveryServiceError> {
    if let Some(base) = input.base_url.map(clean).filter(|s| !s.is_empty()) {
        return Ok(base.trim_end_matches('/').to_owned());
    }
    let template = targets
        .base_url_template
        .as_deref()
        .map(clean)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            DeliveryServiceError::Configuration(
                "DELIVERY_BASE_URL_TEMPLATE is required when the job supplies no base_url"
                    .to_owned(),
            )
        })?;
    let slug = slugify(input.client_name);
    if slug.is_empty() {
        return Err(DeliveryServiceError::Configuration(
            "client name missing for delivery base URL".to_owned(),
        ));
    }
    Ok(template
        .replace("{slug}", &slug)
        .trim_end_matches('/')
        .to_owned())
}

fn resolve_target_path(
    input: ResolveInput<'_>,
    targets: &DeliveryTargets,
) -> Result<String, DeliveryServiceError> {
    let template = clean(&targets.path_template);
    let namespace = input
        .namespace
        .map(clean)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            targets
                .namespace
                .as_deref()
                .map(clean)
                .filter(|s| !s.is_empty())
        });
    let path = if template.contains("{namespace}") {
        let namespace = namespace.ok_or_else(|| {
            DeliveryServiceError::Configuration(
                "DELIVERY_TARGET_NAMESPACE is required for the delivery target path".to_owned(),
            )
        })?;
        template.replace("{namespace}", namespace)
    } else {
        template.to_owned()
    };
    if path.starts_with('/') {
        Ok(path)
    } else {
        Ok(format!("/{path}"))
    }
}

/// Resolve the dispatch target for a job under the given delivery mode.
///
/// `manual` always awaits a human-entered URL. `zapier` prefills from the
/// configured webhook URL when one exists, otherwise falls through to manual
/// entry. `automatic` is reserved until a persisted mapping source exists.
/// `direct` composes `base_url + target_path`.
pub fn resolve(
    mode: DeliveryMode,
    input: ResolveInput<'_>,
    targets: &DeliveryTargets,
) -> Result<ResolvedTarget, DeliveryServiceError> {
    match mode {
        DeliveryMode::Manual => Ok(ResolvedTarget::AwaitingUrl),
        DeliveryMode::Zapier => Ok(targets
            .zapier_webhook_url
            .as_deref()
            .map(clean)
            .filter(|s| !s.is_empty())
            .map(|url| ResolvedTarget::Url(url.to_owned()))
            .unwrap_or(ResolvedTarget::AwaitingUrl)),
        DeliveryMode::Automatic => Err(DeliveryServiceError::NotImplemented("automatic")),
        DeliveryMode::Direct => {
            let base = resolve_base_url(input, targets)?;
            let path = resolve_target_path(input, targets)?;
            Ok(ResolvedTarget::Url(format!("{base}{path}")))
        }
    }
}

/// URL the site-check scheduler probes once delivery succeeds.
///
/// Prefers the preview domain (`https://{slug}.{preview_namespace}.{domain}`)
/// when configured; otherwise falls back to the job's resolvable base URL.
pub fn preview_url(input: ResolveInput<'_>, targets: &DeliveryTargets) -> Option<String> {
    if let Some(domain) = targets
        .preview_base_domain
        .as_deref()
        .map(clean)
        .filter(|s| !s.is_empty())
    {
        let slug = slugify(input.client_name);
        if slug.is_empty() {
            return None;
        }
        let host = match targets
            .preview_namespace
            .as_deref()
            .map(clean)
            .filter(|s| !s.is_empty())
        {
            Some(ns) => format!("{slug}.{ns}.{domain}"),
            None => format!("{slug}.{domain}"),
        };
        return Some(format!("https://{host}"));
    }
    resolve_base_url(input, targets).ok()
}

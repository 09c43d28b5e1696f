//! Link qualification and the current-page marker.

use spalite_types::input::AnchorSnapshot;

use crate::host::PageHost;
use crate::path::PathNormalizer;
use crate::url::Url;

/// Resolve an `href` for navigation purposes.
///
/// Fragment-only and opaque (`mailto:`, `tel:`...) references yield `None`,
/// as does anything on another origin.
pub fn resolve_same_origin(href: &str, location: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    location
        .resolve(href)
        .filter(|url| url.same_origin(location))
}

/// The page an anchor would be navigated to in place, or `None` when the
/// browser must handle it natively.
pub fn interceptable_target(
    anchor: &AnchorSnapshot,
    location: &Url,
    normalizer: &PathNormalizer,
) -> Option<Url> {
    if anchor.download || anchor.is_external() || !anchor.targets_current_frame() {
        return None;
    }
    let url = resolve_same_origin(anchor.href.as_deref()?, location)?;
    if normalizer.is_non_page_resource(&url.path) {
        return None;
    }
    Some(url)
}

/// For each anchor `href`, whether it points at the current page.
pub fn current_link_flags(
    hrefs: &[Option<String>],
    location: &Url,
    normalizer: &PathNormalizer,
) -> Vec<bool> {
    let current = normalizer.to_display_path(&location.path);
    hrefs
        .iter()
        .map(|href| {
            href.as_deref()
                .and_then(|h| resolve_same_origin(h, location))
                .is_some_and(|url| normalizer.to_display_path(&url.path) == current)
        })
        .collect()
}

/// Recompute the current-page marker on every anchor of `host`.
///
/// Returns the number of anchors marked current.
pub fn update_active_links(host: &dyn PageHost, normalizer: &PathNormalizer) -> usize {
    let Some(location) = Url::parse(&host.location()) else {
        log::warn!("Cannot mark active links: unparseable location");
        return 0;
    };
    let flags = current_link_flags(&host.anchor_hrefs(), &location, normalizer);
    for (index, current) in flags.iter().enumerate() {
        host.set_anchor_current(index, *current);
    }
    flags.iter().filter(|f| **f).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> Url {
        Url::parse("https://np.example/pricing").unwrap()
    }

    fn anchor(href: &str) -> AnchorSnapshot {
        AnchorSnapshot::with_href(href)
    }

    fn target(a: &AnchorSnapshot) -> Option<String> {
        interceptable_target(a, &here(), &PathNormalizer::default()).map(|u| u.to_string())
    }

    #[test]
    fn intercepts_clean_and_html_paths() {
        assert_eq!(target(&anchor("/services")).as_deref(), Some("https://np.example/services"));
        assert_eq!(
            target(&anchor("about.html?x=1")).as_deref(),
            Some("https://np.example/about.html?x=1")
        );
        assert_eq!(target(&anchor("/")).as_deref(), Some("https://np.example/"));
        assert!(target(&anchor("https://np.example/contact")).is_some());
    }

    #[test]
    fn skips_non_page_resources() {
        assert!(target(&anchor("/logo.svg")).is_none());
        assert!(target(&anchor("/files/brochure.pdf")).is_none());
    }

    #[test]
    fn skips_other_origins_and_opaque_schemes() {
        assert!(target(&anchor("https://elsewhere.example/")).is_none());
        assert!(target(&anchor("http://np.example/")).is_none());
        assert!(target(&anchor("mailto:hi@np.example")).is_none());
        assert!(target(&anchor("tel:+100")).is_none());
        assert!(target(&anchor("#pricing-table")).is_none());
        assert!(target(&anchor("")).is_none());
        assert!(target(&AnchorSnapshot::default()).is_none());
    }

    #[test]
    fn respects_opt_outs() {
        let mut a = anchor("/services");
        a.download = true;
        assert!(target(&a).is_none());

        let mut a = anchor("/services");
        a.rel = Some("external".into());
        assert!(target(&a).is_none());

        let mut a = anchor("/services");
        a.target = Some("_blank".into());
        assert!(target(&a).is_none());

        let mut a = anchor("/services");
        a.target = Some("_self".into());
        assert!(target(&a).is_some());
    }

    #[test]
    fn current_flags_compare_display_paths() {
        let hrefs = vec![
            Some("/".to_string()),
            Some("/pricing.html".to_string()),
            Some("pricing/".to_string()),
            Some("https://np.example/pricing?plan=pro".to_string()),
            Some("#faq".to_string()),
            Some("mailto:x@np.example".to_string()),
            Some("https://other.example/pricing".to_string()),
            None,
        ];
        let flags = current_link_flags(&hrefs, &here(), &PathNormalizer::default());
        assert_eq!(flags, vec![false, true, true, true, false, false, false, false]);
    }

    #[test]
    fn root_link_is_current_on_index() {
        let loc = Url::parse("https://np.example/index.html").unwrap();
        let flags = current_link_flags(
            &[Some("/".to_string()), Some("index.html".to_string())],
            &loc,
            &PathNormalizer::default(),
        );
        assert_eq!(flags, vec![true, true]);
    }

    #[test]
    fn encoded_and_raw_paths_match() {
        let normalizer = PathNormalizer::default();
        let loc = Url::parse("https://np.example/our%20team").unwrap();
        let flags = current_link_flags(
            &[Some("/our team".to_string()), Some("/our%20team.html".to_string())],
            &loc,
            &normalizer,
        );
        assert_eq!(flags, vec![true, true]);

        let loc = Url::parse("https://np.example/%D0%BE").unwrap();
        let flags = current_link_flags(&[Some("/о".to_string())], &loc, &normalizer);
        assert_eq!(flags, vec![true]);
    }
}

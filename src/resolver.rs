use std::collections::BTreeSet;

use tracing::warn;

use crate::catalog::{StoreCatalog, StoreKind, KNOWN_BROWSER_PACKAGES};
use crate::errors::ResolveError;

/// How a destination should be opened by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// Native store client intent.
    Native,
    /// Web listing URL.
    Web,
}

/// One candidate URI the host may attempt, with an optional handler-targeting hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// URI to open.
    pub uri: String,
    /// Whether this targets a native client or the web listing.
    pub kind: DestinationKind,
    /// Package the host should route the open to: the required client package for
    /// native destinations, the preferred browser for browser-preferring web ones.
    pub handler_package: Option<String>,
}

impl Destination {
    fn native(uri: String, client_package: &str) -> Self {
        Self {
            uri,
            kind: DestinationKind::Native,
            handler_package: Some(client_package.to_owned()),
        }
    }

    fn web(uri: String, browser_package: Option<&str>) -> Self {
        Self {
            uri,
            kind: DestinationKind::Web,
            handler_package: browser_package.map(str::to_owned),
        }
    }
}

/// Resolve the ordered list of destinations to attempt for `kind`.
///
/// Native destinations come first, one per installed client package in the
/// descriptor's declared preference order, followed by the web fallback when the
/// store has one. With no installed client, stores that require their client or
/// lack a web presence fail with [`ResolveError::NoDestinationAvailable`]; the rest
/// resolve to the single web destination. The caller attempts destinations strictly
/// in order and falls through on "no handler" failures; that retry policy lives
/// with the host, which can observe the environment's open-URI capabilities.
pub fn resolve_destinations(
    kind: StoreKind,
    target_param: &str,
    installed_packages: &BTreeSet<String>,
) -> Result<Vec<Destination>, ResolveError> {
    let descriptor = StoreCatalog::descriptor(kind);
    let matched: Vec<&str> = descriptor
        .client_packages
        .iter()
        .copied()
        .filter(|package| installed_packages.contains(*package))
        .collect();

    let mut destinations = Vec::new();
    if matched.is_empty() {
        if descriptor.requires_client_package {
            warn!(store = %kind, "no destination: required client package not installed");
            return Err(ResolveError::NoDestinationAvailable(kind));
        }
        let Some(web_template) = descriptor
            .web_uri_template
            .filter(|_| descriptor.has_web_fallback)
        else {
            warn!(store = %kind, "no destination: store has no web presence");
            return Err(ResolveError::NoDestinationAvailable(kind));
        };
        let browser = if descriptor.prefers_browser {
            preferred_browser(installed_packages)
        } else {
            None
        };
        destinations.push(Destination::web(
            format!("{web_template}{target_param}"),
            browser,
        ));
    } else {
        if let Some(native_template) = descriptor.native_uri_template {
            for package in &matched {
                destinations.push(Destination::native(
                    format!("{native_template}{target_param}"),
                    package,
                ));
            }
        }
        if descriptor.has_web_fallback {
            if let Some(web_template) = descriptor.web_uri_template {
                destinations.push(Destination::web(
                    format!("{web_template}{target_param}"),
                    None,
                ));
            }
        }
    }

    dedup(&mut destinations);
    if destinations.is_empty() {
        warn!(store = %kind, "resolution produced no destinations");
        return Err(ResolveError::NoDestinationAvailable(kind));
    }
    Ok(destinations)
}

/// First installed browser from the known-browsers list, in declared order.
fn preferred_browser(installed_packages: &BTreeSet<String>) -> Option<&'static str> {
    KNOWN_BROWSER_PACKAGES
        .iter()
        .copied()
        .find(|browser| installed_packages.contains(*browser))
}

// Destinations sharing a URI are distinct as long as they target different handler
// packages (the multi-client stores reuse one scheme); exact pairs collapse.
fn dedup(destinations: &mut Vec<Destination>) {
    let mut seen = BTreeSet::new();
    destinations.retain(|d| seen.insert((d.uri.clone(), d.handler_package.clone())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CHINESE_STORE_PACKAGES;

    fn installed(packages: &[&str]) -> BTreeSet<String> {
        packages.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn matched_client_yields_native_then_web() {
        let destinations = resolve_destinations(
            StoreKind::GooglePlay,
            "dev.example.app",
            &installed(&["com.android.vending"]),
        )
        .unwrap();
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].kind, DestinationKind::Native);
        assert_eq!(destinations[0].uri, "market://details?id=dev.example.app");
        assert_eq!(
            destinations[0].handler_package.as_deref(),
            Some("com.android.vending")
        );
        assert_eq!(destinations[1].kind, DestinationKind::Web);
        assert_eq!(
            destinations[1].uri,
            "https://play.google.com/store/apps/details?id=dev.example.app"
        );
        assert_ne!(destinations[0].uri, destinations[1].uri);
    }

    #[test]
    fn missing_client_falls_back_to_web_alone() {
        let destinations =
            resolve_destinations(StoreKind::Amazon, "dev.example.app", &BTreeSet::new()).unwrap();
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].kind, DestinationKind::Web);
        assert_eq!(
            destinations[0].uri,
            "https://www.amazon.com/gp/mas/dl/android?p=dev.example.app"
        );
        assert_eq!(destinations[0].handler_package, None);
    }

    #[test]
    fn client_requiring_stores_fail_without_their_client() {
        for kind in [StoreKind::Samsung, StoreKind::Yandex, StoreKind::ChineseStores] {
            assert_eq!(
                resolve_destinations(kind, "dev.example.app", &BTreeSet::new()),
                Err(ResolveError::NoDestinationAvailable(kind))
            );
        }
    }

    #[test]
    fn samsung_with_client_still_offers_the_web_listing() {
        let destinations = resolve_destinations(
            StoreKind::Samsung,
            "dev.example.app",
            &installed(&["com.sec.android.app.samsungapps"]),
        )
        .unwrap();
        assert_eq!(destinations.len(), 2);
        assert_eq!(
            destinations[0].uri,
            "samsungapps://ProductDetail/dev.example.app"
        );
        assert_eq!(destinations[1].kind, DestinationKind::Web);
    }

    #[test]
    fn chinese_stores_emit_one_native_per_installed_client_in_declared_order() {
        let installed = installed(&[
            "com.huawei.appmarket",
            "com.tencent.android.qqdownloader",
            "org.unrelated.app",
        ]);
        let destinations =
            resolve_destinations(StoreKind::ChineseStores, "dev.example.app", &installed).unwrap();
        // Declared order, not installed-set order: Tencent is declared first.
        assert_eq!(destinations.len(), 2);
        assert_eq!(
            destinations[0].handler_package.as_deref(),
            Some("com.tencent.android.qqdownloader")
        );
        assert_eq!(
            destinations[1].handler_package.as_deref(),
            Some("com.huawei.appmarket")
        );
        assert!(destinations
            .iter()
            .all(|d| d.uri == "market://details?id=dev.example.app"));
        assert!(destinations.iter().all(|d| d.kind == DestinationKind::Native));
    }

    #[test]
    fn chinese_store_declared_order_matches_the_regional_list() {
        assert_eq!(
            CHINESE_STORE_PACKAGES[0],
            "com.tencent.android.qqdownloader"
        );
    }

    #[test]
    fn apple_targets_the_first_installed_known_browser() {
        let destinations = resolve_destinations(
            StoreKind::Apple,
            "1234567890",
            &installed(&["org.mozilla.firefox", "com.android.chrome"]),
        )
        .unwrap();
        assert_eq!(destinations.len(), 1);
        assert_eq!(
            destinations[0].uri,
            "https://itunes.apple.com/app/id1234567890"
        );
        // Chrome precedes Firefox in the known-browsers list.
        assert_eq!(
            destinations[0].handler_package.as_deref(),
            Some("com.android.chrome")
        );
    }

    #[test]
    fn apple_without_a_known_browser_is_untargeted() {
        let destinations =
            resolve_destinations(StoreKind::Apple, "1234567890", &BTreeSet::new()).unwrap();
        assert_eq!(destinations[0].handler_package, None);
    }

    #[test]
    fn no_duplicate_destination_pairs() {
        let mut installed = installed(CHINESE_STORE_PACKAGES);
        installed.insert("com.android.vending".to_owned());
        for kind in StoreKind::ALL {
            let Ok(destinations) = resolve_destinations(kind, "dev.example.app", &installed) else {
                continue;
            };
            let mut pairs = BTreeSet::new();
            for destination in &destinations {
                assert!(
                    pairs.insert((destination.uri.clone(), destination.handler_package.clone())),
                    "{kind} produced a duplicate destination"
                );
            }
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported app-store destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Amazon Appstore.
    Amazon,
    /// Apple App Store. Web listing only; the target parameter is an application id.
    Apple,
    /// Cafe Bazaar.
    Bazaar,
    /// BlackBerry World. The target parameter is an application id.
    #[serde(rename = "blackberry")]
    BlackBerry,
    /// Regional Chinese storefronts sharing the `market://` scheme.
    ChineseStores,
    /// Google Play.
    GooglePlay,
    /// Mi Appstore (Xiaomi Market).
    Mi,
    /// Samsung Galaxy Apps.
    Samsung,
    /// SlideME Marketplace.
    #[serde(rename = "slideme")]
    SlideMe,
    /// Tencent App Store.
    Tencent,
    /// Yandex.Store.
    Yandex,
}

impl StoreKind {
    /// Every supported store, in catalog order.
    pub const ALL: [StoreKind; 11] = [
        StoreKind::Amazon,
        StoreKind::Apple,
        StoreKind::Bazaar,
        StoreKind::BlackBerry,
        StoreKind::ChineseStores,
        StoreKind::GooglePlay,
        StoreKind::Mi,
        StoreKind::Samsung,
        StoreKind::SlideMe,
        StoreKind::Tencent,
        StoreKind::Yandex,
    ];

    /// Stable identifier used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Amazon => "amazon",
            StoreKind::Apple => "apple",
            StoreKind::Bazaar => "bazaar",
            StoreKind::BlackBerry => "blackberry",
            StoreKind::ChineseStores => "chinese_stores",
            StoreKind::GooglePlay => "google_play",
            StoreKind::Mi => "mi",
            StoreKind::Samsung => "samsung",
            StoreKind::SlideMe => "slideme",
            StoreKind::Tencent => "tencent",
            StoreKind::Yandex => "yandex",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when an identifier names no supported store.
///
/// A configuration error: fail fast at setup time, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreKindError {
    /// The identifier is outside the supported enumeration.
    #[error("unknown store kind: {0}")]
    UnknownStoreKind(String),
}

impl FromStr for StoreKind {
    type Err = StoreKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StoreKindError::UnknownStoreKind(s.to_owned()))
    }
}

/// Static metadata describing one store destination and its fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDescriptor {
    /// URI prefix for the native client intent, if the store has one.
    pub native_uri_template: Option<&'static str>,
    /// URI prefix for the web listing, if the store has one.
    pub web_uri_template: Option<&'static str>,
    /// Known client packages able to handle the native URI, in preference order.
    /// The first-declared package wins when several are installed.
    pub client_packages: &'static [&'static str],
    /// Resolution must fail when none of the client packages is installed.
    pub requires_client_package: bool,
    /// A web destination may be appended after native ones or used as the sole
    /// fallback.
    pub has_web_fallback: bool,
    /// Web links should be routed to the device's default browser package rather
    /// than any arbitrary URI handler.
    pub prefers_browser: bool,
}

/// Scheme shared by Google Play and the stores that mirror its catalog protocol.
const MARKET_DETAILS: &str = "market://details?id=";

const AMAZON: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("amzn://apps/android?p="),
    web_uri_template: Some("https://www.amazon.com/gp/mas/dl/android?p="),
    client_packages: &["com.amazon.venezia"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const APPLE: StoreDescriptor = StoreDescriptor {
    native_uri_template: None,
    web_uri_template: Some("https://itunes.apple.com/app/id"),
    client_packages: &[],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: true,
};

const BAZAAR: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("bazaar://details?id="),
    web_uri_template: Some("https://cafebazaar.ir/app/"),
    client_packages: &["com.farsitel.bazaar"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const BLACKBERRY: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("appworld://content/"),
    web_uri_template: Some("https://appworld.blackberry.com/webstore/content/"),
    client_packages: &["net.rim.bb.appworld"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const CHINESE_STORES: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some(MARKET_DETAILS),
    web_uri_template: None,
    client_packages: CHINESE_STORE_PACKAGES,
    requires_client_package: true,
    has_web_fallback: false,
    prefers_browser: false,
};

const GOOGLE_PLAY: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some(MARKET_DETAILS),
    web_uri_template: Some("https://play.google.com/store/apps/details?id="),
    client_packages: &["com.android.vending"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const MI: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some(MARKET_DETAILS),
    web_uri_template: Some("http://app.xiaomi.com/details?id="),
    client_packages: &["com.xiaomi.market"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const SAMSUNG: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("samsungapps://ProductDetail/"),
    web_uri_template: Some("https://apps.samsung.com/appquery/appDetail.as?appId="),
    client_packages: &["com.sec.android.app.samsungapps"],
    requires_client_package: true,
    has_web_fallback: true,
    prefers_browser: false,
};

const SLIDEME: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("sam://details?id="),
    web_uri_template: Some("http://slideme.org/app/"),
    client_packages: &["com.slideme.sam.manager"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const TENCENT: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some(MARKET_DETAILS),
    web_uri_template: Some("http://a.app.qq.com/o/simple.jsp?pkgname="),
    client_packages: &["com.tencent.android.qqdownloader"],
    requires_client_package: false,
    has_web_fallback: true,
    prefers_browser: false,
};

const YANDEX: StoreDescriptor = StoreDescriptor {
    native_uri_template: Some("yastore://details?id="),
    web_uri_template: Some("https://store.yandex.com/apps/details?id="),
    client_packages: &["com.yandex.store"],
    requires_client_package: true,
    has_web_fallback: true,
    prefers_browser: false,
};

/// Client packages of the regional Chinese storefronts, in preference order.
pub const CHINESE_STORE_PACKAGES: &[&str] = &[
    "com.tencent.android.qqdownloader",
    "com.qihoo.appstore",
    "com.xiaomi.market",
    "com.huawei.appmarket",
    "com.baidu.appsearch",
    "com.oppo.market",
    "zte.com.market",
    "com.bbk.appstore",
    "com.wandoujia.phoenix2",
    "com.pp.assistant",
    "com.hiapk.marketpho",
    "com.dragon.android.pandaspace",
    "com.yingyonghui.market",
    "com.tencent.qqpimsecure",
    "com.mappn.gfan",
    "cn.goapk.market",
    "com.yulong.android.coolmart",
    "com.lenovo.leos.appstore",
    "com.coolapk.market",
];

/// Browser packages consulted when a store prefers opening its web listing in the
/// device's default browser, in preference order.
pub const KNOWN_BROWSER_PACKAGES: &[&str] = &[
    "com.android.chrome",
    "org.mozilla.firefox",
    "com.opera.browser",
    "com.opera.mini.native",
    "com.sec.android.app.sbrowser",
    "com.UCMobile.intl",
    "com.tencent.mtt",
    "com.android.browser",
];

/// Static lookup table mapping a store kind to its descriptor.
///
/// Adding a store means adding a descriptor row here; the resolver logic never
/// changes per store.
#[derive(Debug, Clone, Copy)]
pub struct StoreCatalog;

impl StoreCatalog {
    /// Descriptor for the given store. Total over the enumeration: every supported
    /// kind has a row.
    pub fn descriptor(kind: StoreKind) -> &'static StoreDescriptor {
        match kind {
            StoreKind::Amazon => &AMAZON,
            StoreKind::Apple => &APPLE,
            StoreKind::Bazaar => &BAZAAR,
            StoreKind::BlackBerry => &BLACKBERRY,
            StoreKind::ChineseStores => &CHINESE_STORES,
            StoreKind::GooglePlay => &GOOGLE_PLAY,
            StoreKind::Mi => &MI,
            StoreKind::Samsung => &SAMSUNG,
            StoreKind::SlideMe => &SLIDEME,
            StoreKind::Tencent => &TENCENT,
            StoreKind::Yandex => &YANDEX,
        }
    }
}

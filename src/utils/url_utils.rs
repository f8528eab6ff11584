// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 判断图片URL是否为占位图/图标
///
/// data:URI、加载动画、站点Logo和图标不作为商品图片收集。
pub fn is_placeholder_image(src: &str) -> bool {
    let lowered = src.to_lowercase();

    if lowered.starts_with("data:") {
        return true;
    }

    const PLACEHOLDER_MARKERS: &[&str] = &[
        "placeholder",
        "no-image",
        "noimage",
        "spacer",
        "loading",
        "spinner",
        "lazy.",
        "blank.",
        "logo",
        "favicon",
        "icon-",
        "/icons/",
        "avatar",
        "1x1",
        "pixel.",
    ];

    PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m))
}

/// 根据width/height属性判断是否为图标尺寸
pub fn is_icon_sized(width: Option<&str>, height: Option<&str>) -> bool {
    let parse = |v: Option<&str>| v.and_then(|s| s.trim_end_matches("px").parse::<u32>().ok());

    match (parse(width), parse(height)) {
        (Some(w), _) if w < 100 => true,
        (_, Some(h)) if h < 100 => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "http://t.co/c").unwrap().as_str(),
            "http://t.co/c"
        );
    }

    #[test]
    fn test_resolve_protocol_relative_url() {
        let base = Url::parse("https://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "//t.co/c").unwrap().as_str(),
            "https://t.co/c"
        );
    }

    #[test]
    fn test_resolve_root_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "/c").unwrap().as_str(),
            "http://example.com/c"
        );
    }

    #[test]
    fn test_resolve_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "c").unwrap().as_str(),
            "http://example.com/a/c"
        );
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder_image("data:image/gif;base64,R0lGOD"));
        assert!(is_placeholder_image("/assets/no-image.png"));
        assert!(is_placeholder_image("https://cdn.shop.ir/logo.svg"));
        assert!(!is_placeholder_image(
            "https://cdn.shop.ir/products/123/main.jpg"
        ));
    }

    #[test]
    fn test_icon_size_detection() {
        assert!(is_icon_sized(Some("48"), Some("48")));
        assert!(is_icon_sized(Some("32px"), None));
        assert!(!is_icon_sized(Some("800"), Some("600")));
        assert!(!is_icon_sized(None, None));
    }
}

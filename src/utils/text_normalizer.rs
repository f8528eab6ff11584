// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 波斯语/阿拉伯语文本归一化模块
//!
//! 电商页面上的波斯语文本混杂阿拉伯字形变体、
//! 零宽字符和本地数字，数值解析之前必须统一处理：
//! - 零宽与方向控制字符剔除
//! - 阿拉伯字形到波斯标准字形的映射
//! - 波斯/阿拉伯数字到ASCII数字的转写

/// 判定文本是否以波斯语/阿拉伯语为主
///
/// 统计阿拉伯语Unicode区段内的字符占全部字母字符的比例，
/// 超过30%即判定为波斯语/阿拉伯语文本。
pub fn is_persian_or_arabic(text: &str) -> bool {
    let mut arabic = 0usize;
    let mut alphabetic = 0usize;

    for c in text.chars() {
        if is_arabic_block(c) {
            arabic += 1;
            alphabetic += 1;
        } else if c.is_alphabetic() {
            alphabetic += 1;
        }
    }

    alphabetic > 0 && (arabic as f64 / alphabetic as f64) > 0.3
}

fn is_arabic_block(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

/// 归一化一段抽取出来的文本
///
/// 仅当文本被识别为波斯语/阿拉伯语时执行映射，
/// 其余文本只做空白压缩。结果用于展示与后续数值解析。
pub fn normalize(text: &str) -> String {
    let trimmed = collapse_whitespace(text);
    if !is_persian_or_arabic(&trimmed) {
        return trimmed;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !is_zero_width_or_directional(*c))
        .map(normalize_char)
        .collect();

    collapse_whitespace(&cleaned)
}

/// 将波斯/阿拉伯数字转写为ASCII数字
///
/// 与语言判定无关，总是安全执行；价格解析前必须调用。
pub fn transliterate_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            // Persian digits U+06F0..U+06F9
            '۰'..='۹' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            // Arabic-Indic digits U+0660..U+0669
            '٠'..='٩' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            // Arabic decimal/thousands separators
            '٫' => '.',
            '٬' => ',',
            _ => c,
        })
        .collect()
}

fn is_zero_width_or_directional(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{200E}' | '\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// 阿拉伯字形变体到波斯标准字形的映射
fn normalize_char(c: char) -> char {
    match c {
        // Arabic yeh variants to Persian yeh
        '\u{064A}' | '\u{0649}' | '\u{06D2}' => '\u{06CC}',
        // Arabic kaf to Persian kaf
        '\u{0643}' => '\u{06A9}',
        // Teh marbuta to heh
        '\u{0629}' => '\u{0647}',
        // Alef variants with hamza/madda preserved elsewhere; plain alef maksura handled above
        '\u{0671}' => '\u{0627}',
        // Heh goal to heh
        '\u{06C1}' => '\u{0647}',
        _ => c,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::text_normalizer::transliterate_digits;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// 价格解析错误类型
#[derive(Error, Debug, PartialEq)]
pub enum PriceParseError {
    /// 去除货币符号后没有剩下数字
    #[error("No numeric content in price string")]
    NotNumeric,
    /// 数值超出合理区间
    #[error("Price {0} outside sane bounds")]
    OutOfBounds(Decimal),
}

/// 去除货币词与符号时使用的词表
///
/// 包含波斯语货币单位及其常见拉丁转写。
const CURRENCY_TOKENS: &[&str] = &[
    "تومان",
    "ریال",
    "ميليون",
    "میلیون",
    "هزار",
    "قیمت",
    "قيمة",
    "toman",
    "tomans",
    "rial",
    "rials",
    "irr",
    "irt",
    "usd",
    "eur",
    "aed",
    "price",
];

/// 解析价格字符串为十进制数值
///
/// 流程：数字转写 → 货币词剔除 → 分隔符判定 → 解析 → 区间校验。
/// 逗号/点号按末尾分组长度区分千位分隔与小数点：
/// 末组恰为3位视作千位分隔，其余视作小数。
/// 对已经干净的数字串重复解析得到相同结果（幂等）。
pub fn parse_price(raw: &str, max_price: Decimal) -> Result<Decimal, PriceParseError> {
    let transliterated = transliterate_digits(raw);
    let lowered = transliterated.to_lowercase();

    let mut stripped = lowered;
    for token in CURRENCY_TOKENS {
        stripped = stripped.replace(token, " ");
    }

    // Keep digits and separator candidates only
    let numeric: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let numeric = numeric.trim_matches(|c| c == '.' || c == ',').to_string();

    if numeric.is_empty() || !numeric.chars().any(|c| c.is_ascii_digit()) {
        return Err(PriceParseError::NotNumeric);
    }

    let canonical = canonicalize_separators(&numeric);
    let value = Decimal::from_str(&canonical).map_err(|_| PriceParseError::NotNumeric)?;

    if value <= Decimal::ZERO || value >= max_price {
        return Err(PriceParseError::OutOfBounds(value));
    }

    Ok(value)
}

/// 将千位/小数分隔符归一化为标准小数点形式
fn canonicalize_separators(s: &str) -> String {
    let has_dot = s.contains('.');
    let has_comma = s.contains(',');

    match (has_dot, has_comma) {
        (true, true) => {
            // The separator that appears last is the decimal one
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_dot > last_comma {
                s.replace(',', "")
            } else {
                let without_thousands = s.replace('.', "");
                replace_last(&without_thousands, ',', '.')
            }
        }
        (false, true) => disambiguate_single_separator(s, ','),
        (true, false) => disambiguate_single_separator(s, '.'),
        (false, false) => s.to_string(),
    }
}

fn disambiguate_single_separator(s: &str, sep: char) -> String {
    let groups: Vec<&str> = s.split(sep).collect();
    if groups.len() > 2 {
        // More than one separator of the same kind: thousands grouping
        return groups.concat();
    }
    let trailing = groups.last().map(|g| g.len()).unwrap_or(0);
    if trailing == 3 {
        // "12,500" style grouping
        groups.concat()
    } else {
        replace_last(s, sep, '.')
    }
}

fn replace_last(s: &str, from: char, to: char) -> String {
    match s.rfind(from) {
        Some(idx) => {
            let mut out = String::with_capacity(s.len());
            out.push_str(&s[..idx]);
            out.push(to);
            out.push_str(&s[idx + from.len_utf8()..]);
            out
        }
        None => s.to_string(),
    }
}

//! otpauth:// 密钥 URI 编解码
//!
//! 格式参见 <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>：
//!
//! ```text
//! otpauth://{hotp|totp}/{issuer}:{account}?algorithm=SHA1&digits=6&issuer={issuer}&period=30&secret={base32}
//! ```
//!
//! 解析得到的 [`Key`] 是对原始 URI 的只读视图：字段按需从查询参数读取，
//! `to_string()` 原样返回解析时的 URI 表示，而不是根据字段重新拼装。

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::{Url, form_urlencoded};

use crate::error::{EncodingError, Error, Result};
use crate::otp::algorithm::Algorithm;

/// 未指定 period 时的默认时间步长（秒），见 RFC 6238
pub const DEFAULT_PERIOD: u64 = 30;

/// 标签路径中保留不编码的字符
const LABEL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// 解析后的 HOTP/TOTP 密钥
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    url: Url,
    params: Vec<(String, String)>,
}

impl Key {
    /// 解析 otpauth:// URI
    ///
    /// 只要求字符串是语法合法的 URI，缺失或无法解析的参数在读取时回退到默认值。
    ///
    /// # Example
    ///
    /// ```rust
    /// use otpauth::otp::key::Key;
    ///
    /// let uri = "otpauth://totp/Example:alice@bob.com?secret=JBSWY3DPEHPK3PXP&issuer=Example";
    /// let key = Key::parse(uri).unwrap();
    ///
    /// assert_eq!(key.otp_type(), "totp");
    /// assert_eq!(key.issuer(), "Example");
    /// assert_eq!(key.account(), "alice@bob.com");
    /// assert_eq!(key.period(), 30);
    /// assert_eq!(key.to_string(), uri);
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|e| EncodingError::UriInvalid(e.to_string()))?;
        let params = url.query_pairs().into_owned().collect();
        Ok(Self { url, params })
    }

    /// 类型："hotp" 或 "totp"（URI 的 host 部分）
    pub fn otp_type(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// 签发者
    ///
    /// 优先使用 `issuer` 查询参数，否则取路径中第一个 `:` 之前的部分。
    pub fn issuer(&self) -> String {
        match self.param("issuer") {
            Some(issuer) if !issuer.is_empty() => issuer.to_string(),
            _ => {
                let label = self.label();
                match label.split_once(':') {
                    Some((issuer, _)) => issuer.to_string(),
                    None => String::new(),
                }
            }
        }
    }

    /// 账户名：路径中第一个 `:` 之后的部分，没有 `:` 时为整个路径
    pub fn account(&self) -> String {
        let label = self.label();
        match label.split_once(':') {
            Some((_, account)) => account.to_string(),
            None => label,
        }
    }

    /// Base32 编码的密钥（原样返回查询参数）
    pub fn secret(&self) -> &str {
        self.param("secret").unwrap_or("")
    }

    /// 时间步长（秒），缺失或无法解析时为 30
    pub fn period(&self) -> u64 {
        self.param("period")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PERIOD)
    }

    /// 验证码位数，缺失或无法解析时为 0
    pub fn digits(&self) -> u32 {
        self.param("digits")
            .and_then(|d| d.parse().ok())
            .unwrap_or(0)
    }

    /// HOTP 计数器，缺失或无法解析时为 0
    pub fn counter(&self) -> u64 {
        self.param("counter")
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
    }

    /// 哈希算法，缺失或无法识别时为 `None`
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.param("algorithm").and_then(|a| a.parse().ok())
    }

    /// 读取查询参数（同名参数取第一个）
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// 底层 URL
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// URI 文本
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    // 去掉前导 `/` 并做百分号解码后的路径
    fn label(&self) -> String {
        let path = self.url.path();
        let path = path.strip_prefix('/').unwrap_or(path);
        percent_decode_str(path).decode_utf8_lossy().into_owned()
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Key::parse(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// 生成 otpauth:// URI，查询参数按键名字典序排列
pub(crate) fn build_uri(
    otp_type: &str,
    issuer: &str,
    account: &str,
    params: &[(&str, String)],
) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in sorted {
        query.append_pair(name, value);
    }

    let label = format!("{}:{}", issuer, account);
    format!(
        "otpauth://{}/{}?{}",
        otp_type,
        utf8_percent_encode(&label, LABEL_ENCODE_SET),
        query.finish()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_key(uri: &str, typ: &str, issuer: &str, account: &str, period: u64) {
        let key = Key::parse(uri).unwrap();
        assert_eq!(key.to_string(), uri);
        assert_eq!(key.otp_type(), typ);
        assert_eq!(key.issuer(), issuer);
        assert_eq!(key.account(), account);
        assert_eq!(key.secret(), "JBSWY3DPEHPK3PXP");
        assert_eq!(key.period(), period);
    }

    #[test]
    fn test_parse_totp_with_issuer() {
        check_key(
            "otpauth://totp/Example:alice@bob.com?secret=JBSWY3DPEHPK3PXP&issuer=Example",
            "totp",
            "Example",
            "alice@bob.com",
            30,
        );
    }

    #[test]
    fn test_parse_hotp_without_issuer() {
        check_key(
            "otpauth://hotp/alice@bob.com?secret=JBSWY3DPEHPK3PXP",
            "hotp",
            "",
            "alice@bob.com",
            30,
        );
    }

    #[test]
    fn test_parse_explicit_period() {
        check_key(
            "otpauth://totp/Example:alice@bob.com?secret=JBSWY3DPEHPK3PXP&period=42",
            "totp",
            "Example",
            "alice@bob.com",
            42,
        );
    }

    #[test]
    fn test_issuer_param_overrides_path() {
        let key = Key::parse("otpauth://totp/Path:alice?issuer=Query&secret=AAAA").unwrap();
        assert_eq!(key.issuer(), "Query");
        assert_eq!(key.account(), "alice");
    }

    #[test]
    fn test_percent_encoded_label() {
        let key = Key::parse("otpauth://totp/ACME%20Co:john%40example.com?secret=AAAA").unwrap();
        assert_eq!(key.issuer(), "ACME Co");
        assert_eq!(key.account(), "john@example.com");
    }

    #[test]
    fn test_defaults_when_absent() {
        let key = Key::parse("otpauth://totp/alice").unwrap();
        assert_eq!(key.secret(), "");
        assert_eq!(key.period(), DEFAULT_PERIOD);
        assert_eq!(key.digits(), 0);
        assert_eq!(key.counter(), 0);
        assert_eq!(key.algorithm(), None);
    }

    #[test]
    fn test_defaults_when_unparseable() {
        let key = Key::parse(
            "otpauth://hotp/alice?period=soon&digits=six&counter=-1&algorithm=MD5",
        )
        .unwrap();
        assert_eq!(key.period(), 30);
        assert_eq!(key.digits(), 0);
        assert_eq!(key.counter(), 0);
        assert_eq!(key.algorithm(), None);
        assert_eq!(key.param("algorithm"), Some("MD5"));
    }

    #[test]
    fn test_numeric_params() {
        let key = Key::parse(
            "otpauth://hotp/ACME:alice?algorithm=SHA512&digits=8&counter=42&secret=AAAA",
        )
        .unwrap();
        assert_eq!(key.algorithm(), Some(Algorithm::Sha512));
        assert_eq!(key.digits(), 8);
        assert_eq!(key.counter(), 42);
    }

    #[test]
    fn test_parse_invalid_uri() {
        let err = Key::parse("not a uri").unwrap_err();
        assert!(matches!(err, Error::Encoding(EncodingError::UriInvalid(_))));
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_build_uri_sorted() {
        let uri = build_uri(
            "totp",
            "cristalhq",
            "alice@bob.com",
            &[
                ("secret", "KNCUGUSFKRPVGVCSJFHEO".to_string()),
                ("period", "30".to_string()),
                ("algorithm", "SHA1".to_string()),
                ("issuer", "cristalhq".to_string()),
                ("digits", "8".to_string()),
            ],
        );
        assert_eq!(
            uri,
            "otpauth://totp/cristalhq:alice@bob.com?algorithm=SHA1&digits=8&issuer=cristalhq&period=30&secret=KNCUGUSFKRPVGVCSJFHEO"
        );
    }

    #[test]
    fn test_build_uri_escapes_label_and_query() {
        let uri = build_uri(
            "hotp",
            "ACME Co",
            "a/b?c",
            &[("issuer", "ACME Co".to_string())],
        );
        assert_eq!(uri, "otpauth://hotp/ACME%20Co:a%2Fb%3Fc?issuer=ACME+Co");

        let key = Key::parse(&uri).unwrap();
        assert_eq!(key.issuer(), "ACME Co");
        assert_eq!(key.account(), "a/b?c");
    }
}
